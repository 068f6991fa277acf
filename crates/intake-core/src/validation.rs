use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use intake_domain::{FieldFormat, FieldKey, FieldPath, FieldValue, TransactionFormData};

use crate::format::{digits_only, parse_amount, parse_percentage};
use crate::steps::{StepDefinitions, StepId};
use crate::time::{Clock, SystemClock};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static MLS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(PM-)?\d{1,6}$").expect("valid MLS pattern"));
static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid ZIP pattern"));
static EIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-?\d{7}$").expect("valid EIN pattern"));

pub const DEFAULT_SIGNATURE_WINDOW_DAYS: u32 = 90;
/// Largest window accepted from configuration (ten years).
pub const MAX_SIGNATURE_WINDOW_DAYS: u32 = 3650;

/// Field-keyed error messages; an empty result means the checked fields are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<FieldPath, Vec<String>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields carrying at least one error.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&[String]> {
        self.errors.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.errors.contains_key(path)
    }

    pub fn push(&mut self, path: FieldPath, message: impl Into<String>) {
        self.errors.entry(path).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (path, messages) in other.errors {
            self.errors.entry(path).or_default().extend(messages);
        }
    }

    pub fn remove(&mut self, path: &FieldPath) -> bool {
        self.errors.remove(path).is_some()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&FieldPath) -> bool) {
        self.errors.retain(|path, _| keep(path));
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &[String])> {
        self.errors
            .iter()
            .map(|(path, messages)| (path, messages.as_slice()))
    }

    /// Errors keyed by their wire path (`clients[0].email`).
    pub fn to_key_map(&self) -> BTreeMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(path, messages)| (path.to_string(), messages.clone()))
            .collect()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, messages) in &self.errors {
            writeln!(f, "{}: {}", path, messages.join("; "))?;
        }
        Ok(())
    }
}

/// Tunable validation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    /// How many days ahead of today a signature may be dated.
    pub signature_window_days: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            signature_window_days: DEFAULT_SIGNATURE_WINDOW_DAYS,
        }
    }
}

/// Evaluates presence and format rules for the fields of a step.
///
/// The engine never fails: every check produces a (possibly empty)
/// [`ValidationResult`]. The current date comes from the injected [`Clock`];
/// [`ValidationEngine::validate_on`] takes it explicitly.
#[derive(Clone)]
pub struct ValidationEngine {
    rules: ValidationRules,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(ValidationRules::default(), Arc::new(SystemClock))
    }
}

impl ValidationEngine {
    pub fn new(rules: ValidationRules, clock: Arc<dyn Clock>) -> Self {
        Self { rules, clock }
    }

    pub fn rules(&self) -> ValidationRules {
        self.rules
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Validates the step at `step_index` (1-based, role-dependent numbering).
    pub fn validate(&self, step_index: usize, data: &TransactionFormData) -> ValidationResult {
        self.validate_on(step_index, data, self.clock.today())
    }

    pub fn validate_on(
        &self,
        step_index: usize,
        data: &TransactionFormData,
        today: NaiveDate,
    ) -> ValidationResult {
        match StepDefinitions::step_at(step_index, data.selected_role) {
            Some(step) => self.validate_step(step, data, today),
            None => ValidationResult::new(),
        }
    }

    pub fn validate_step(
        &self,
        step: StepId,
        data: &TransactionFormData,
        today: NaiveDate,
    ) -> ValidationResult {
        let required = StepDefinitions::required_fields(step, data);
        let mut result = ValidationResult::new();
        for path in StepDefinitions::active_fields(step, data) {
            let Some(value) = data.value(path) else {
                continue;
            };
            if required.contains(&path) && !value.is_filled() {
                result.push(path, missing_message(path));
                continue;
            }
            if let FieldValue::Text(text) = value {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if let Some(message) = self.format_error(path, text, today) {
                    result.push(path, message);
                }
            }
        }
        result
    }

    /// Folds every visible step into one result.
    pub fn validate_all(&self, data: &TransactionFormData) -> ValidationResult {
        let today = self.clock.today();
        let mut result = ValidationResult::new();
        for step in StepDefinitions::visible_steps(data.selected_role) {
            result.merge(self.validate_step(step, data, today));
        }
        result
    }

    /// First visible step (1-based) that does not validate, with its errors.
    pub fn first_invalid_step(
        &self,
        data: &TransactionFormData,
    ) -> Option<(usize, ValidationResult)> {
        let today = self.clock.today();
        StepDefinitions::visible_steps(data.selected_role)
            .into_iter()
            .enumerate()
            .map(|(position, step)| (position + 1, self.validate_step(step, data, today)))
            .find(|(_, result)| !result.is_valid())
    }

    fn format_error(&self, path: FieldPath, text: &str, today: NaiveDate) -> Option<String> {
        let label = path.label();
        match path.format() {
            FieldFormat::Email if !is_valid_email(text) => {
                Some("Enter a valid email address".to_string())
            }
            FieldFormat::Phone if !is_valid_phone(text) => {
                Some("Phone number must contain exactly 10 digits".to_string())
            }
            FieldFormat::Percentage => match parse_percentage(text) {
                None => Some(format!("{} must be a number", label)),
                Some(value) if !(0.0..=100.0).contains(&value) => {
                    Some(format!("{} must be between 0 and 100", label))
                }
                Some(_) => None,
            },
            FieldFormat::Money => match parse_amount(text) {
                None => Some(format!("{} must be a valid amount", label)),
                Some(value) if value < 0.0 => Some(format!("{} cannot be negative", label)),
                Some(_) => None,
            },
            FieldFormat::MlsNumber if !is_valid_mls_number(text) => {
                Some("MLS number must be 1-6 digits, optionally prefixed with PM-".to_string())
            }
            FieldFormat::ZipCode if !ZIP_PATTERN.is_match(text) => {
                Some("ZIP code must be 5 digits (or ZIP+4)".to_string())
            }
            FieldFormat::StateCode if !is_state_code(text) => {
                Some("Use the two-letter state code".to_string())
            }
            FieldFormat::Ein if !EIN_PATTERN.is_match(text) => {
                Some("Broker EIN must look like 12-3456789".to_string())
            }
            FieldFormat::Date => self.date_error(text, today),
            _ => None,
        }
    }

    fn date_error(&self, text: &str, today: NaiveDate) -> Option<String> {
        let Some(date) = parse_date(text) else {
            return Some("Use the YYYY-MM-DD date format".to_string());
        };
        if date < today {
            return Some("Date cannot be in the past".to_string());
        }
        if !is_valid_signature_date(date, today, self.rules.signature_window_days) {
            return Some(format!(
                "Date must be within {} days of today",
                self.rules.signature_window_days
            ));
        }
        None
    }
}

fn missing_message(path: FieldPath) -> String {
    match path {
        FieldPath::Clients => "At least one client is required".to_string(),
        FieldPath::Field(FieldKey::TermsAccepted) => "You must accept the terms".to_string(),
        FieldPath::Field(FieldKey::SelectedRole) => "Select your role in this transaction".to_string(),
        other => format!("{} is required", other.label()),
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    digits_only(value).len() == 10
}

pub fn is_valid_mls_number(value: &str) -> bool {
    MLS_PATTERN.is_match(value.trim())
}

fn is_state_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|ch| ch.is_ascii_alphabetic())
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// True when `date` is today or later, and no more than `window_days` ahead.
/// A window reaching past the calendar's end has no upper bound.
pub fn is_valid_signature_date(date: NaiveDate, today: NaiveDate, window_days: u32) -> bool {
    if date < today {
        return false;
    }
    match today.checked_add_signed(Duration::days(i64::from(window_days))) {
        Some(last) => date <= last,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use intake_domain::{AgentRole, ClientFieldKey, Section};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn engine() -> ValidationEngine {
        ValidationEngine::new(ValidationRules::default(), Arc::new(FixedClock::new(today())))
    }

    #[test]
    fn mls_numbers_allow_optional_prefix() {
        assert!(is_valid_mls_number("PM-12345"));
        assert!(is_valid_mls_number("123456"));
        assert!(!is_valid_mls_number("PM-1234567"));
        assert!(!is_valid_mls_number("pm-123"));
        assert!(!is_valid_mls_number("PM-"));
    }

    #[test]
    fn phones_need_ten_digits() {
        assert!(is_valid_phone("(215) 555-1234"));
        assert!(!is_valid_phone("555-1234"));
        assert!(!is_valid_phone("1-215-555-1234"));
    }

    #[test]
    fn emails_need_domain_with_dot() {
        assert!(is_valid_email("jane@x.com"));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("jane doe@x.com"));
    }

    #[test]
    fn signature_window_bounds() {
        let today = today();
        assert!(!is_valid_signature_date(today - Duration::days(1), today, 90));
        assert!(is_valid_signature_date(today, today, 90));
        assert!(is_valid_signature_date(today + Duration::days(90), today, 90));
        assert!(!is_valid_signature_date(today + Duration::days(91), today, 90));
    }

    #[test]
    fn oversized_window_does_not_overflow() {
        let today = today();
        assert!(is_valid_signature_date(today, today, u32::MAX));
        assert!(is_valid_signature_date(NaiveDate::MAX, today, u32::MAX));
        assert!(!is_valid_signature_date(today - Duration::days(1), today, u32::MAX));
        assert!(is_valid_signature_date(NaiveDate::MAX, NaiveDate::MAX, 1));

        let engine = ValidationEngine::new(
            ValidationRules {
                signature_window_days: u32::MAX,
            },
            Arc::new(FixedClock::new(today)),
        );
        let mut form = TransactionFormData::new();
        form.signature.date = "2025-03-10".into();
        let result = engine.validate_step(Section::Signature, &form, today);
        assert!(!result.contains(&FieldPath::Field(FieldKey::SignatureDate)));
    }

    #[test]
    fn empty_required_field_reports_presence_only() {
        let mut form = TransactionFormData::new();
        form.selected_role = Some(AgentRole::ListingAgent);
        let result = engine().validate_step(Section::Property, &form, today());
        assert_eq!(
            result.get(&FieldPath::Field(FieldKey::MlsNumber)),
            Some(&["MLS number is required".to_string()][..])
        );
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn percentages_must_stay_within_bounds() {
        let mut form = TransactionFormData::new();
        form.selected_role = Some(AgentRole::DualAgent);
        form.commission.listing_agent_commission = "120".into();
        form.commission.buyers_agent_commission = "2.5%".into();
        let result = engine().validate_step(Section::Commission, &form, today());
        assert!(result.contains(&FieldPath::Field(FieldKey::ListingAgentCommission)));
        assert!(!result.contains(&FieldPath::Field(FieldKey::BuyersAgentCommission)));
    }

    #[test]
    fn percentages_need_not_sum_to_hundred() {
        let mut form = TransactionFormData::new();
        form.selected_role = Some(AgentRole::DualAgent);
        form.commission.listing_agent_commission = "3".into();
        form.commission.buyers_agent_commission = "2.5".into();
        assert!(engine().validate_step(Section::Commission, &form, today()).is_valid());
    }

    #[test]
    fn optional_values_are_format_checked_when_present() {
        let mut form = TransactionFormData::new();
        form.selected_role = Some(AgentRole::ListingAgent);
        form.title.company_name = "Keystone Title".into();
        form.title.email = "not-an-email".into();
        let result = engine().validate_step(Section::Title, &form, today());
        assert_eq!(result.len(), 1);
        assert!(result.contains(&FieldPath::Field(FieldKey::TitleEmail)));
    }

    #[test]
    fn client_errors_use_indexed_paths() {
        let mut form = TransactionFormData::new();
        form.clients[0].email = "bad".into();
        let result = engine().validate_step(Section::Clients, &form, today());
        assert!(result.contains(&FieldPath::client(0, ClientFieldKey::Email)));
        assert!(result.contains(&FieldPath::client(0, ClientFieldKey::Name)));
        assert_eq!(
            result.to_key_map().get("clients[0].email").map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn unknown_step_index_is_valid() {
        let form = TransactionFormData::new();
        assert!(engine().validate(0, &form).is_valid());
        assert!(engine().validate(42, &form).is_valid());
    }

    #[test]
    fn terms_must_be_accepted() {
        let mut form = TransactionFormData::new();
        form.signature.agent_name = "Alex Agent".into();
        form.signature.signature = "Alex Agent".into();
        form.signature.date = today().format("%Y-%m-%d").to_string();
        let result = engine().validate_step(Section::Signature, &form, today());
        assert_eq!(
            result.get(&FieldPath::Field(FieldKey::TermsAccepted)),
            Some(&["You must accept the terms".to_string()][..])
        );
        assert_eq!(result.len(), 1);
    }
}
