mod common;

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use intake_core::{
    is_valid_signature_date, CoreError, FixedClock, FormStore, StepDefinitions, ValidationEngine,
    ValidationRules, MAX_SIGNATURE_WINDOW_DAYS,
};
use intake_domain::{
    AgentRole, ClientFieldKey, FieldKey, FieldPath, FieldUpdate, PropertyField, Section,
    SignatureField, WarrantyField,
};
use uuid::Uuid;

use common::{complete_form, engine, today};

#[test]
fn complete_form_walks_every_step() {
    let mut store = FormStore::from_data(complete_form(), engine());
    assert_eq!(store.state().total_steps, 9);
    while !store.is_final_step() {
        store.next().expect("step validates");
    }
    assert_eq!(store.current_step_id(), Some(Section::Signature));
    assert!(store.errors().is_valid());
}

#[test]
fn forward_jump_is_blocked_by_current_step_errors() {
    let mut form = complete_form();
    form.property.city.clear();
    let mut store = FormStore::from_data(form, engine());
    store.next().expect("role step is valid");
    assert_eq!(store.current_step(), 2);

    let err = store.go_to_step(5).expect_err("property step has an error");
    match err {
        CoreError::StepBlocked { step, errors } => {
            assert_eq!(step, 2);
            assert!(errors.contains(&FieldPath::Field(FieldKey::City)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.current_step(), 2);
    assert!(!store.errors().is_valid());
}

#[test]
fn backward_moves_skip_validation() {
    let mut store = FormStore::from_data(complete_form(), engine());
    store.go_to_step(2).unwrap();
    store.go_to_step(3).unwrap();
    store.set_field(FieldUpdate::Property(PropertyField::MlsNumber(String::new())));

    store.previous().expect("backward move is ungated");
    assert_eq!(store.current_step(), 2);
    store.go_to_step(1).unwrap();
    assert_eq!(store.current_step(), 1);
}

#[test]
fn forward_jump_only_checks_the_current_step() {
    let mut form = complete_form();
    form.title.company_name.clear();
    let mut store = FormStore::from_data(form, engine());
    store.go_to_step(9).expect("role step is valid");
    assert_eq!(store.current_step(), 9);
}

#[test]
fn jump_to_resolves_role_dependent_indices() {
    let mut form = complete_form();
    form.selected_role = Some(AgentRole::BuyersAgent);
    let mut store = FormStore::from_data(form, engine());
    store.jump_to(Section::Signature).unwrap();
    assert_eq!(store.current_step(), 8);
    assert!(store.is_final_step());
}

#[test]
fn role_change_clamps_the_current_step() {
    let mut store = FormStore::from_data(complete_form(), engine());
    store.go_to_step(9).unwrap();
    store.set_field(FieldUpdate::Role(AgentRole::BuyersAgent));
    assert_eq!(store.state().total_steps, 8);
    assert_eq!(store.current_step(), 8);
}

#[test]
fn remove_client_never_empties_the_list() {
    let mut store = FormStore::new(engine());
    let first = store.data().clients[0].id;

    assert!(!store.remove_client(first));
    assert!(!store.remove_client(Uuid::new_v4()));
    assert_eq!(store.data().clients.len(), 1);

    let second = store.add_client();
    let third = store.add_client();
    assert!(store.remove_client(second));
    assert!(!store.remove_client(second));
    assert!(store.remove_client(first));
    assert!(!store.remove_client(third));
    assert_eq!(store.data().clients.len(), 1);
    assert_eq!(store.data().clients[0].id, third);
}

#[test]
fn removing_a_client_drops_its_retained_errors() {
    let mut store = FormStore::from_data(complete_form(), engine());
    let extra = store.add_client();
    store.go_to_step(3).unwrap();
    assert!(store.next().is_err());
    assert!(store.errors().contains(&FieldPath::client(1, ClientFieldKey::Name)));

    assert!(store.remove_client(extra));
    assert!(store.errors().is_valid());
    store.next().expect("remaining client is complete");
}

#[test]
fn commission_requirements_track_role() {
    let listing = FieldPath::Field(FieldKey::ListingAgentCommission);
    for role in AgentRole::ALL {
        let mut form = complete_form();
        form.selected_role = Some(role);
        let step = StepDefinitions::index_of(Section::Commission, Some(role)).unwrap();
        let required = StepDefinitions::get_required_fields(step, &form);
        assert_eq!(
            required.contains(&listing),
            role == AgentRole::ListingAgent || role == AgentRole::DualAgent
        );
    }
}

#[test]
fn validation_is_pure() {
    let mut form = complete_form();
    form.clients[0].phone = "555".into();
    form.commission.referral_fee = "abc".into();
    let engine = engine();
    let before = form.clone();
    for step in 1..=9 {
        let first = engine.validate(step, &form);
        let second = engine.validate(step, &form);
        assert_eq!(first, second);
    }
    assert_eq!(form, before);
}

#[test]
fn mls_number_format() {
    let engine = engine();
    let mut form = complete_form();
    let step = StepDefinitions::index_of(Section::Property, form.selected_role).unwrap();

    form.property.mls_number = "PM-12345".into();
    assert!(engine.validate(step, &form).is_valid());

    form.property.mls_number = "PM-1234567".into();
    let errors = engine.validate(step, &form);
    assert!(errors.contains(&FieldPath::Field(FieldKey::MlsNumber)));
}

#[test]
fn warranty_details_are_ignored_without_warranty() {
    let mut store = FormStore::from_data(complete_form(), engine());
    store.set_field(FieldUpdate::Warranty(WarrantyField::HasWarranty(false)));
    store.set_field(FieldUpdate::Warranty(WarrantyField::Provider(String::new())));
    store.set_field(FieldUpdate::Warranty(WarrantyField::Cost("not a number".into())));

    let step = StepDefinitions::index_of(Section::Warranty, store.data().selected_role).unwrap();
    let required = StepDefinitions::get_required_fields(step, store.data());
    assert!(!required.contains(&FieldPath::Field(FieldKey::WarrantyProvider)));
    assert!(!required.contains(&FieldPath::Field(FieldKey::WarrantyCost)));
    assert!(store.engine().validate(step, store.data()).is_valid());
}

#[test]
fn signature_date_window() {
    let rules = ValidationRules::default();
    let window = rules.signature_window_days;
    assert!(!is_valid_signature_date(today() - Duration::days(1), today(), window));
    assert!(is_valid_signature_date(today(), today(), window));
    assert!(!is_valid_signature_date(today() + Duration::days(91), today(), window));

    let engine = engine();
    let mut form = complete_form();
    let step = StepDefinitions::index_of(Section::Signature, form.selected_role).unwrap();
    let date = FieldPath::Field(FieldKey::SignatureDate);
    for (offset, valid) in [(-1, false), (0, true), (90, true), (91, false)] {
        form.apply(FieldUpdate::Signature(SignatureField::Date(
            (today() + Duration::days(offset)).format("%Y-%m-%d").to_string(),
        )));
        assert_eq!(!engine.validate(step, &form).contains(&date), valid, "offset {offset}");
    }
}

#[test]
fn validation_survives_extreme_rules_and_dates() {
    let windows = [0, 1, 90, MAX_SIGNATURE_WINDOW_DAYS, u32::MAX];
    let clocks = [NaiveDate::MIN, today(), NaiveDate::MAX];
    let dates = [
        "",
        "not-a-date",
        "2025-13-45",
        "0000-01-01",
        "9999-12-31",
        "+262143-12-31",
        "-262144-01-01",
    ];

    for window in windows {
        for clock in clocks {
            let engine = ValidationEngine::new(
                ValidationRules {
                    signature_window_days: window,
                },
                Arc::new(FixedClock::new(clock)),
            );
            for date in dates {
                let mut form = complete_form();
                form.signature.date = date.into();
                form.property.sale_price = "1e308".into();
                form.commission.listing_agent_commission = "-0".into();
                form.commission.coordinator_fee = "NaN".into();

                let all = engine.validate_all(&form);
                let first = engine.first_invalid_step(&form);
                assert_eq!(all.is_valid(), first.is_none(), "{window} {clock} {date:?}");
                for step in 0..=10 {
                    let _ = engine.validate(step, &form);
                }
            }
        }
    }
}

#[test]
fn inactive_referral_fields_are_never_flagged() {
    let engine = engine();
    let mut form = complete_form();
    form.commission.broker_ein = "bogus".into();
    let step = StepDefinitions::index_of(Section::Commission, form.selected_role).unwrap();
    assert!(engine.validate(step, &form).is_valid());

    form.commission.is_referral = true;
    let errors = engine.validate(step, &form);
    assert!(errors.contains(&FieldPath::Field(FieldKey::BrokerEin)));
    assert!(errors.contains(&FieldPath::Field(FieldKey::ReferralParty)));
}
