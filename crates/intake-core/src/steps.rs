//! Declarative step table for the intake wizard.
//!
//! Each step owns a fixed set of fields, a statically required subset and a
//! data-dependent set of fields that are only shown (and then required) for
//! certain form states. Requirement sets are pure functions of a form
//! snapshot; nothing here holds state.

use intake_domain::{AgentRole, ClientFieldKey, FieldKey, FieldPath, Section, TransactionFormData};

/// Steps map one-to-one onto form sections.
pub type StepId = Section;

/// Static description of one wizard step.
pub struct StepDefinition {
    pub id: StepId,
    /// Fields shown regardless of the form state.
    pub fields: &'static [FieldKey],
    /// Subset of `fields` that must be filled.
    pub required: &'static [FieldKey],
    /// Fields shown only for some form states; every one of them is required.
    conditional: fn(&TransactionFormData) -> Vec<FieldPath>,
    visible: fn(Option<AgentRole>) -> bool,
}

impl StepDefinition {
    pub fn title(&self) -> &'static str {
        self.id.title()
    }

    pub fn is_visible(&self, role: Option<AgentRole>) -> bool {
        (self.visible)(role)
    }

    pub fn conditional_fields(&self, data: &TransactionFormData) -> Vec<FieldPath> {
        (self.conditional)(data)
    }
}

static STEPS: [StepDefinition; 9] = [
    StepDefinition {
        id: Section::Role,
        fields: &[FieldKey::SelectedRole],
        required: &[FieldKey::SelectedRole],
        conditional: no_conditional_fields,
        visible: always_visible,
    },
    StepDefinition {
        id: Section::Property,
        fields: &[
            FieldKey::MlsNumber,
            FieldKey::StreetAddress,
            FieldKey::City,
            FieldKey::State,
            FieldKey::ZipCode,
            FieldKey::SalePrice,
        ],
        required: &[
            FieldKey::MlsNumber,
            FieldKey::StreetAddress,
            FieldKey::City,
            FieldKey::State,
            FieldKey::ZipCode,
            FieldKey::SalePrice,
        ],
        conditional: no_conditional_fields,
        visible: always_visible,
    },
    StepDefinition {
        id: Section::Clients,
        fields: &[],
        required: &[],
        conditional: client_fields,
        visible: always_visible,
    },
    StepDefinition {
        id: Section::Commission,
        fields: &[
            FieldKey::IsReferral,
            FieldKey::CoordinatorFee,
            FieldKey::CoordinatorFeePaidBy,
        ],
        required: &[],
        conditional: commission_fields,
        visible: always_visible,
    },
    StepDefinition {
        id: Section::PropertyDetails,
        fields: &[
            FieldKey::Municipality,
            FieldKey::ResaleCertRequired,
            FieldKey::CoRequired,
            FieldKey::HasAttorney,
        ],
        required: &[FieldKey::Municipality],
        conditional: property_detail_fields,
        visible: always_visible,
    },
    StepDefinition {
        id: Section::Warranty,
        fields: &[FieldKey::HasWarranty],
        required: &[],
        conditional: warranty_fields,
        visible: always_visible,
    },
    StepDefinition {
        id: Section::Title,
        fields: &[
            FieldKey::TitleCompanyName,
            FieldKey::TitleContactName,
            FieldKey::TitleEmail,
            FieldKey::TitlePhone,
        ],
        required: &[FieldKey::TitleCompanyName],
        conditional: no_conditional_fields,
        visible: title_visible,
    },
    StepDefinition {
        id: Section::AdditionalInfo,
        fields: &[
            FieldKey::SpecialInstructions,
            FieldKey::UrgentIssues,
            FieldKey::Notes,
        ],
        required: &[],
        conditional: no_conditional_fields,
        visible: always_visible,
    },
    StepDefinition {
        id: Section::Signature,
        fields: &[
            FieldKey::AgentName,
            FieldKey::Signature,
            FieldKey::SignatureDate,
            FieldKey::TermsAccepted,
        ],
        required: &[
            FieldKey::AgentName,
            FieldKey::Signature,
            FieldKey::SignatureDate,
            FieldKey::TermsAccepted,
        ],
        conditional: no_conditional_fields,
        visible: always_visible,
    },
];

fn always_visible(_: Option<AgentRole>) -> bool {
    true
}

// Title is ordered by the seller side, so only buyer's agents skip it.
// Listing and dual agents both see all nine steps.
fn title_visible(role: Option<AgentRole>) -> bool {
    role != Some(AgentRole::BuyersAgent)
}

fn no_conditional_fields(_: &TransactionFormData) -> Vec<FieldPath> {
    Vec::new()
}

const REQUIRED_CLIENT_FIELDS: [ClientFieldKey; 5] = [
    ClientFieldKey::Name,
    ClientFieldKey::Email,
    ClientFieldKey::Phone,
    ClientFieldKey::Address,
    ClientFieldKey::MaritalStatus,
];

fn client_fields(data: &TransactionFormData) -> Vec<FieldPath> {
    if data.clients.is_empty() {
        return vec![FieldPath::Clients];
    }
    (0..data.clients.len())
        .flat_map(|index| {
            REQUIRED_CLIENT_FIELDS
                .iter()
                .map(move |field| FieldPath::client(index, *field))
        })
        .collect()
}

fn commission_fields(data: &TransactionFormData) -> Vec<FieldPath> {
    let mut fields = Vec::new();
    if let Some(role) = data.selected_role {
        if role.represents_seller() {
            fields.push(FieldKey::ListingAgentCommission.into());
        }
        if role.represents_buyer() {
            fields.push(FieldKey::BuyersAgentCommission.into());
        }
    }
    if data.commission.is_referral {
        fields.extend([
            FieldPath::from(FieldKey::ReferralParty),
            FieldKey::BrokerEin.into(),
            FieldKey::ReferralFee.into(),
        ]);
    }
    fields
}

fn property_detail_fields(data: &TransactionFormData) -> Vec<FieldPath> {
    let details = &data.property_details;
    let mut fields = Vec::new();
    if details.resale_cert_required {
        fields.push(FieldKey::HoaName.into());
    }
    if details.has_attorney {
        fields.push(FieldKey::AttorneyName.into());
    }
    fields
}

fn warranty_fields(data: &TransactionFormData) -> Vec<FieldPath> {
    if !data.warranty.has_warranty {
        return Vec::new();
    }
    vec![
        FieldKey::WarrantyProvider.into(),
        FieldKey::WarrantyCost.into(),
        FieldKey::WarrantyPaidBy.into(),
    ]
}

/// Lookup and resolution over the step table. Step indices are 1-based and
/// count only the steps visible for the given role.
pub struct StepDefinitions;

impl StepDefinitions {
    pub fn all() -> &'static [StepDefinition] {
        &STEPS
    }

    pub fn definition(id: StepId) -> &'static StepDefinition {
        // The table lists every section exactly once, in declaration order.
        &STEPS[id as usize]
    }

    pub fn visible_steps(role: Option<AgentRole>) -> Vec<StepId> {
        STEPS
            .iter()
            .filter(|step| step.is_visible(role))
            .map(|step| step.id)
            .collect()
    }

    pub fn total_steps(role: Option<AgentRole>) -> usize {
        STEPS.iter().filter(|step| step.is_visible(role)).count()
    }

    pub fn step_at(index: usize, role: Option<AgentRole>) -> Option<StepId> {
        if index == 0 {
            return None;
        }
        Self::visible_steps(role).get(index - 1).copied()
    }

    pub fn index_of(id: StepId, role: Option<AgentRole>) -> Option<usize> {
        Self::visible_steps(role)
            .iter()
            .position(|step| *step == id)
            .map(|position| position + 1)
    }

    /// Resolved required fields for the step at `step_index`, given the
    /// current data. Unknown indices resolve to an empty list.
    pub fn get_required_fields(step_index: usize, data: &TransactionFormData) -> Vec<FieldPath> {
        Self::step_at(step_index, data.selected_role)
            .map(|step| Self::required_fields(step, data))
            .unwrap_or_default()
    }

    pub fn required_fields(step: StepId, data: &TransactionFormData) -> Vec<FieldPath> {
        let definition = Self::definition(step);
        let mut fields: Vec<FieldPath> =
            definition.required.iter().map(|key| FieldPath::Field(*key)).collect();
        fields.extend(definition.conditional_fields(data));
        fields
    }

    /// Every field currently shown on the step, required or not.
    pub fn active_fields(step: StepId, data: &TransactionFormData) -> Vec<FieldPath> {
        let definition = Self::definition(step);
        let mut fields: Vec<FieldPath> =
            definition.fields.iter().map(|key| FieldPath::Field(*key)).collect();
        fields.extend(definition.conditional_fields(data));
        fields
    }

    pub fn is_required(step: StepId, path: FieldPath, data: &TransactionFormData) -> bool {
        Self::required_fields(step, data).contains(&path)
    }
}
