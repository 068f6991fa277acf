//! Single source of truth for an in-progress intake: field values, wizard
//! position, retained field errors and the submission latch.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use intake_domain::{Client, FieldPath, FieldUpdate, TransactionFormData};

use crate::error::{CoreError, GatewayError};
use crate::gateway::TransactionGateway;
use crate::steps::{StepDefinitions, StepId};
use crate::submission::{SubmissionAdapter, SubmissionBundle, SubmissionReceipt, SubmissionSettings};
use crate::validation::{ValidationEngine, ValidationResult};

/// Wizard position and submission latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepState {
    /// 1-based index into the steps visible for the current role.
    pub current_step: usize,
    pub total_steps: usize,
    pub is_submitting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    /// Terminal: the intake was delivered. Only `reset` leaves this phase.
    Submitted,
}

#[derive(Debug, Clone)]
pub struct FormStore {
    data: TransactionFormData,
    state: StepState,
    errors: ValidationResult,
    phase: FormPhase,
    engine: ValidationEngine,
}

impl FormStore {
    pub fn new(engine: ValidationEngine) -> Self {
        Self::from_data(TransactionFormData::new(), engine)
    }

    /// Resumes from a saved draft, positioned on the first step.
    pub fn from_data(mut data: TransactionFormData, engine: ValidationEngine) -> Self {
        if data.clients.is_empty() {
            data.clients.push(Client::empty(data.default_client_type()));
        }
        // Client updates and removal address clients by id.
        let mut seen = HashSet::new();
        for client in &mut data.clients {
            if !seen.insert(client.id) {
                let fresh = Uuid::new_v4();
                warn!("draft repeats client id {}; reassigned as {}", client.id, fresh);
                client.id = fresh;
                seen.insert(fresh);
            }
        }
        let total_steps = StepDefinitions::total_steps(data.selected_role);
        Self {
            data,
            state: StepState {
                current_step: 1,
                total_steps,
                is_submitting: false,
            },
            errors: ValidationResult::new(),
            phase: FormPhase::Editing,
            engine,
        }
    }

    pub fn data(&self) -> &TransactionFormData {
        &self.data
    }

    pub fn into_data(self) -> TransactionFormData {
        self.data
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn current_step_id(&self) -> Option<StepId> {
        StepDefinitions::step_at(self.state.current_step, self.data.selected_role)
    }

    pub fn is_final_step(&self) -> bool {
        self.state.current_step == self.state.total_steps
    }

    /// Errors retained from the last blocked transition or submission attempt.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Validates the current step without moving.
    pub fn validate_current(&self) -> ValidationResult {
        self.engine.validate(self.state.current_step, &self.data)
    }

    /// Merges a typed value into its section. No validation runs here; a
    /// stale error for the touched field is dropped.
    ///
    /// Returns the touched path, or `None` when the update names an unknown client.
    pub fn set_field(&mut self, update: FieldUpdate) -> Option<FieldPath> {
        let role_changed = matches!(update, FieldUpdate::Role(role) if self.data.selected_role != Some(role));
        let path = self.data.apply(update)?;
        self.errors.remove(&path);
        if role_changed {
            self.sync_step_count();
        }
        Some(path)
    }

    fn sync_step_count(&mut self) {
        let total = StepDefinitions::total_steps(self.data.selected_role);
        self.state.total_steps = total;
        if self.state.current_step > total {
            self.state.current_step = total;
        }
        debug!(
            "role changed to {:?}; wizard now has {} steps",
            self.data.selected_role, total
        );
    }

    /// Appends a blank client and returns its id.
    pub fn add_client(&mut self) -> Uuid {
        let client = Client::empty(self.data.default_client_type());
        let id = client.id;
        self.data.clients.push(client);
        self.errors.remove(&FieldPath::Clients);
        id
    }

    /// Removes a client by id. Refuses (returns `false`) when the id is
    /// unknown or the client is the last one.
    pub fn remove_client(&mut self, id: Uuid) -> bool {
        if self.data.clients.len() <= 1 {
            return false;
        }
        let Some(index) = self.data.client_index(id) else {
            return false;
        };
        self.data.clients.remove(index);
        // Positions shift after removal; retained client errors no longer line up.
        self.errors
            .retain(|path| !matches!(path, FieldPath::Client { .. }));
        true
    }

    /// Moves to step `target`. Backward moves are never gated; forward moves
    /// require the current step to validate cleanly.
    pub fn go_to_step(&mut self, target: usize) -> Result<(), CoreError> {
        let current = self.state.current_step;
        let total = self.state.total_steps;
        if target == 0 || target > total {
            return Err(CoreError::StepOutOfRange {
                requested: target,
                total,
            });
        }
        if target == current {
            return Ok(());
        }
        if target > current {
            let errors = self.engine.validate(current, &self.data);
            if !errors.is_valid() {
                warn!(
                    "blocked move from step {} to {}: {} field error(s)",
                    current,
                    target,
                    errors.len()
                );
                self.errors = errors.clone();
                return Err(CoreError::StepBlocked {
                    step: current,
                    errors,
                });
            }
            self.errors.clear();
        }
        debug!("step {} -> {}", current, target);
        self.state.current_step = target;
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), CoreError> {
        self.go_to_step(self.state.current_step + 1)
    }

    pub fn previous(&mut self) -> Result<(), CoreError> {
        self.go_to_step(self.state.current_step.saturating_sub(1))
    }

    /// Step-indicator navigation by step id, with the same gating as `go_to_step`.
    pub fn jump_to(&mut self, step: StepId) -> Result<(), CoreError> {
        let index = StepDefinitions::index_of(step, self.data.selected_role)
            .ok_or(CoreError::StepHidden(step))?;
        self.go_to_step(index)
    }

    /// Checks the final gate, prepares payloads and takes the submission latch.
    pub fn begin_submission(
        &mut self,
        settings: &SubmissionSettings,
        submitted_on: NaiveDate,
    ) -> Result<SubmissionBundle, CoreError> {
        if self.phase == FormPhase::Submitted {
            return Err(CoreError::AlreadySubmitted);
        }
        if self.state.is_submitting {
            return Err(CoreError::SubmissionInProgress);
        }
        if !self.is_final_step() {
            return Err(CoreError::NotOnFinalStep);
        }
        if let Some((step, _)) = self.engine.first_invalid_step(&self.data) {
            let errors = self.engine.validate_all(&self.data);
            warn!(
                "submission blocked: {} field error(s), first on step {}",
                errors.len(),
                step
            );
            self.errors = errors.clone();
            return Err(CoreError::IncompleteForm { step, errors });
        }

        let bundle = SubmissionAdapter::prepare(&self.data, settings, submitted_on)?;
        self.errors.clear();
        self.state.is_submitting = true;
        info!("submission started for {}", self.data.property.full_address());
        Ok(bundle)
    }

    /// Releases the latch. Success makes the store terminal; failure keeps
    /// every field so the submission can be retried.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, GatewayError>,
    ) -> Result<SubmissionReceipt, CoreError> {
        self.state.is_submitting = false;
        match outcome {
            Ok(receipt) => {
                self.phase = FormPhase::Submitted;
                info!("submission completed as record {}", receipt.record_id);
                Ok(receipt)
            }
            Err(err) => {
                warn!("submission failed: {}", err);
                Err(err.into())
            }
        }
    }

    pub fn submit(
        &mut self,
        gateway: &dyn TransactionGateway,
        settings: &SubmissionSettings,
        submitted_on: NaiveDate,
    ) -> Result<SubmissionReceipt, CoreError> {
        let bundle = self.begin_submission(settings, submitted_on)?;
        let outcome = SubmissionAdapter::deliver(gateway, &bundle);
        self.finish_submission(outcome)
    }

    /// Discards the aggregate and starts a fresh intake.
    pub fn reset(&mut self) {
        let engine = self.engine.clone();
        *self = Self::new(engine);
        debug!("form reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_domain::{AgentRole, FieldKey, PropertyField, Section};

    fn store() -> FormStore {
        FormStore::new(ValidationEngine::default())
    }

    #[test]
    fn starts_on_first_step_with_one_client() {
        let store = store();
        assert_eq!(store.current_step(), 1);
        assert_eq!(store.state().total_steps, 9);
        assert_eq!(store.data().clients.len(), 1);
        assert_eq!(store.current_step_id(), Some(Section::Role));
    }

    #[test]
    fn role_is_required_before_leaving_first_step() {
        let mut store = store();
        let err = store.next().unwrap_err();
        assert!(matches!(err, CoreError::StepBlocked { step: 1, .. }));
        assert!(store.errors().contains(&FieldPath::Field(FieldKey::SelectedRole)));

        store.set_field(FieldUpdate::Role(AgentRole::ListingAgent));
        assert!(store.errors().is_valid());
        store.next().unwrap();
        assert_eq!(store.current_step(), 2);
    }

    #[test]
    fn buyers_agent_role_shrinks_the_wizard() {
        let mut store = store();
        store.set_field(FieldUpdate::Role(AgentRole::BuyersAgent));
        assert_eq!(store.state().total_steps, 8);
        store.set_field(FieldUpdate::Role(AgentRole::DualAgent));
        assert_eq!(store.state().total_steps, 9);
    }

    #[test]
    fn setting_a_field_clears_its_error_only() {
        let mut store = store();
        store.set_field(FieldUpdate::Role(AgentRole::DualAgent));
        store.next().unwrap();
        assert!(store.next().is_err());
        assert!(store.errors().contains(&FieldPath::Field(FieldKey::MlsNumber)));

        store.set_field(FieldUpdate::Property(PropertyField::MlsNumber("PM-1".into())));
        assert!(!store.errors().contains(&FieldPath::Field(FieldKey::MlsNumber)));
        assert!(store.errors().contains(&FieldPath::Field(FieldKey::City)));
    }

    #[test]
    fn previous_from_first_step_is_out_of_range() {
        let mut store = store();
        assert!(matches!(
            store.previous(),
            Err(CoreError::StepOutOfRange { requested: 0, .. })
        ));
        assert!(matches!(
            store.go_to_step(10),
            Err(CoreError::StepOutOfRange { requested: 10, total: 9 })
        ));
    }

    #[test]
    fn jump_to_hidden_step_is_rejected() {
        let mut store = store();
        store.set_field(FieldUpdate::Role(AgentRole::BuyersAgent));
        assert!(matches!(
            store.jump_to(Section::Title),
            Err(CoreError::StepHidden(Section::Title))
        ));
    }

    #[test]
    fn add_client_uses_role_default_type() {
        let mut store = store();
        store.set_field(FieldUpdate::Role(AgentRole::ListingAgent));
        let id = store.add_client();
        let client = store.data().client(id).unwrap();
        assert_eq!(client.client_type, intake_domain::ClientType::Seller);
        assert_eq!(store.data().clients.len(), 2);
    }

    #[test]
    fn duplicate_client_ids_are_reassigned_on_load() {
        let mut data = TransactionFormData::new();
        let mut twin = data.clients[0].clone();
        twin.name = "Second".into();
        let original = data.clients[0].id;
        data.clients.push(twin);

        let mut store = FormStore::from_data(data, ValidationEngine::default());
        let ids: Vec<Uuid> = store.data().clients.iter().map(|client| client.id).collect();
        assert_eq!(ids[0], original);
        assert_ne!(ids[1], original);

        store.set_field(FieldUpdate::Client {
            id: ids[1],
            update: intake_domain::ClientUpdate::Name("Renamed".into()),
        });
        assert_eq!(store.data().clients[0].name, "");
        assert_eq!(store.data().clients[1].name, "Renamed");

        assert!(store.remove_client(ids[1]));
        assert_eq!(store.data().clients[0].id, original);
    }

    #[test]
    fn submission_requires_final_step() {
        let mut store = store();
        let err = store
            .begin_submission(&SubmissionSettings::default(), NaiveDate::MIN)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotOnFinalStep));
        assert!(!store.state().is_submitting);
    }
}
