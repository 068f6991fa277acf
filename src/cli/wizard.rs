//! Interactive walkthrough of the intake steps on top of [`FormStore`].
//!
//! Each step prompts for its active fields, then asks the store to advance.
//! A blocked transition prints the field errors and re-prompts only the
//! offending fields. On the final step every visible step is re-checked; the
//! wizard jumps back to the first incomplete one.

use intake_core::{AddressBook, CoreError, FormStore, StepDefinitions, StepId, ValidationResult};
use intake_domain::{
    AgentRole, ClientFieldKey, ClientUpdate, CommissionField, Displayable, FeePayer, FieldFormat,
    FieldKey, FieldPath, FieldUpdate, FieldValue, MaritalStatus, Section, WarrantyField,
    WarrantyPayer,
};
use tracing::warn;

use super::output;
use super::prompts::Prompter;
use super::render;
use crate::errors::CliError;

pub struct Wizard<'a, P: Prompter> {
    prompter: &'a mut P,
    addresses: Option<&'a AddressBook>,
}

impl<'a, P: Prompter> Wizard<'a, P> {
    pub fn new(prompter: &'a mut P) -> Self {
        Self {
            prompter,
            addresses: None,
        }
    }

    /// Caches parsed client addresses as they are entered.
    pub fn with_address_book(mut self, addresses: &'a AddressBook) -> Self {
        self.addresses = Some(addresses);
        self
    }

    /// Drives the store until every visible step validates.
    pub fn run(&mut self, store: &mut FormStore) -> Result<(), CliError> {
        let mut retry: Option<ValidationResult> = None;
        loop {
            let step = store
                .current_step_id()
                .ok_or_else(|| CliError::InvalidArguments("wizard lost its position".into()))?;
            if retry.is_none() {
                announce(store, step.title());
            }
            self.prompt_step(store, step, retry.as_ref())?;

            if store.is_final_step() {
                match store.engine().first_invalid_step(store.data()) {
                    None => return Ok(()),
                    Some((index, errors)) => {
                        let title = StepDefinitions::step_at(index, store.data().selected_role)
                            .map(|step| step.title())
                            .unwrap_or("?");
                        output::warning(format!("Step {} ({}) still needs attention:", index, title));
                        render::print_field_errors(&errors);
                        if index != store.current_step() {
                            store.go_to_step(index)?;
                            announce(store, title);
                        }
                        retry = Some(errors);
                    }
                }
                continue;
            }

            match store.next() {
                Ok(()) => retry = None,
                Err(CoreError::StepBlocked { errors, .. }) => {
                    output::warning("Please fix the following before continuing:");
                    render::print_field_errors(&errors);
                    retry = Some(errors);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn prompt_step(
        &mut self,
        store: &mut FormStore,
        step: StepId,
        only: Option<&ValidationResult>,
    ) -> Result<(), CliError> {
        if step == Section::Clients {
            return self.prompt_clients(store, only);
        }
        // Fields can appear while prompting (e.g. referral details), so the
        // active list is re-read after every answer.
        let mut position = 0;
        loop {
            let fields = StepDefinitions::active_fields(step, store.data());
            let Some(path) = fields.get(position).copied() else {
                return Ok(());
            };
            position += 1;
            if only.map_or(false, |errors| !errors.contains(&path)) {
                continue;
            }
            let required = StepDefinitions::is_required(step, path, store.data());
            self.prompt_field(store, path, required)?;
        }
    }

    fn prompt_clients(
        &mut self,
        store: &mut FormStore,
        only: Option<&ValidationResult>,
    ) -> Result<(), CliError> {
        for index in 0..store.data().clients.len() {
            self.prompt_client(store, index, only)?;
        }
        if only.is_some() {
            return Ok(());
        }

        while self.prompter.confirm("Add another client?", false)? {
            store.add_client();
            let index = store.data().clients.len() - 1;
            self.prompt_client(store, index, None)?;
        }

        if store.data().clients.len() > 1 && self.prompter.confirm("Remove a client?", false)? {
            let names: Vec<String> = store
                .data()
                .clients
                .iter()
                .enumerate()
                .map(|(index, client)| format!("{}. {}", index + 1, client.display_label()))
                .collect();
            let options: Vec<&str> = names.iter().map(String::as_str).collect();
            let choice = self.prompter.select("Client to remove", &options, None)?;
            let id = store.data().clients[choice].id;
            if store.remove_client(id) {
                if let Some(addresses) = self.addresses {
                    if let Err(err) = addresses.forget(id) {
                        warn!("could not clear cached address for {}: {}", id, err);
                    }
                }
            }
        }
        Ok(())
    }

    fn prompt_client(
        &mut self,
        store: &mut FormStore,
        index: usize,
        only: Option<&ValidationResult>,
    ) -> Result<(), CliError> {
        if only.is_none() {
            output::info(format!("Client {}", index + 1));
        }
        let fields: Vec<FieldPath> = StepDefinitions::active_fields(Section::Clients, store.data())
            .into_iter()
            .filter(|path| matches!(path, FieldPath::Client { index: at, .. } if *at == index))
            .collect();
        for path in fields {
            if only.map_or(false, |errors| !errors.contains(&path)) {
                continue;
            }
            self.prompt_field(store, path, true)?;
            if matches!(path, FieldPath::Client { field: ClientFieldKey::Address, .. }) {
                self.cache_address(store, index);
            }
        }
        Ok(())
    }

    fn cache_address(&self, store: &FormStore, index: usize) {
        let (Some(addresses), Some(client)) = (self.addresses, store.data().clients.get(index))
        else {
            return;
        };
        match addresses.remember(client) {
            Ok(Some(parts)) => output::info(format!(
                "  parsed as {} / {} / {} {}",
                parts.street_address, parts.city, parts.state, parts.zip_code
            )),
            Ok(None) => {}
            Err(err) => warn!("could not cache address for {}: {}", client.id, err),
        }
    }

    fn prompt_field(
        &mut self,
        store: &mut FormStore,
        path: FieldPath,
        required: bool,
    ) -> Result<(), CliError> {
        let label = if required {
            format!("{} *", path.label())
        } else {
            path.label()
        };
        let update = match path {
            FieldPath::Clients => None,
            FieldPath::Field(key) => self.prompt_key(store, key, &label)?,
            FieldPath::Client { index, field } => {
                let Some(client) = store.data().clients.get(index) else {
                    return Ok(());
                };
                let id = client.id;
                match field {
                    ClientFieldKey::MaritalStatus => {
                        let options: Vec<&str> =
                            MaritalStatus::ALL.iter().map(|status| status.label()).collect();
                        let current = client
                            .marital_status
                            .and_then(|status| MaritalStatus::ALL.iter().position(|s| *s == status));
                        let choice = self.prompter.select(&label, &options, current)?;
                        Some(FieldUpdate::Client {
                            id,
                            update: ClientUpdate::MaritalStatus(Some(MaritalStatus::ALL[choice])),
                        })
                    }
                    ClientFieldKey::ClientType => None,
                    _ => {
                        let current = match store.data().value(path) {
                            Some(FieldValue::Text(text)) => text.to_string(),
                            _ => String::new(),
                        };
                        let answer = self.prompter.text(&label, &current)?;
                        field.text_update(id, answer)
                    }
                }
            }
        };
        if let Some(update) = update {
            store.set_field(update);
        }
        Ok(())
    }

    fn prompt_key(
        &mut self,
        store: &FormStore,
        key: FieldKey,
        label: &str,
    ) -> Result<Option<FieldUpdate>, CliError> {
        let data = store.data();
        let update = match key.format() {
            FieldFormat::Flag => {
                let current = matches!(data.value(key.into()), Some(FieldValue::Flag(true)));
                key.flag_update(self.prompter.confirm(label, current)?)
            }
            FieldFormat::Choice => match key {
                FieldKey::SelectedRole => {
                    let options: Vec<&str> =
                        AgentRole::ALL.iter().map(|role| role.display_label()).collect();
                    let current = data
                        .selected_role
                        .and_then(|role| AgentRole::ALL.iter().position(|r| *r == role));
                    let choice = self.prompter.select(label, &options, current)?;
                    Some(FieldUpdate::Role(AgentRole::ALL[choice]))
                }
                FieldKey::CoordinatorFeePaidBy => {
                    let mut options = vec!["Not specified"];
                    options.extend(FeePayer::ALL.iter().map(|payer| payer.label()));
                    let current = data
                        .commission
                        .coordinator_fee_paid_by
                        .and_then(|payer| FeePayer::ALL.iter().position(|p| *p == payer))
                        .map_or(0, |position| position + 1);
                    let choice = self.prompter.select(label, &options, Some(current))?;
                    let payer = choice.checked_sub(1).map(|position| FeePayer::ALL[position]);
                    Some(FieldUpdate::Commission(CommissionField::CoordinatorFeePaidBy(payer)))
                }
                FieldKey::WarrantyPaidBy => {
                    let options: Vec<&str> =
                        WarrantyPayer::ALL.iter().map(|payer| payer.label()).collect();
                    let current = data
                        .warranty
                        .paid_by
                        .and_then(|payer| WarrantyPayer::ALL.iter().position(|p| *p == payer));
                    let choice = self.prompter.select(label, &options, current)?;
                    Some(FieldUpdate::Warranty(WarrantyField::PaidBy(Some(
                        WarrantyPayer::ALL[choice],
                    ))))
                }
                _ => None,
            },
            _ => {
                let mut current = match data.value(key.into()) {
                    Some(FieldValue::Text(text)) => text.to_string(),
                    _ => String::new(),
                };
                if key == FieldKey::SignatureDate && current.trim().is_empty() {
                    current = store.engine().today().format("%Y-%m-%d").to_string();
                }
                key.text_update(self.prompter.text(label, &current)?)
            }
        };
        Ok(update)
    }
}

fn announce(store: &FormStore, title: &str) {
    output::section(format!(
        "Step {}/{}: {}",
        store.current_step(),
        store.state().total_steps,
        title
    ));
}
