//! Field keys, field paths and typed field updates.
//!
//! Every scalar input of the intake form has a [`FieldKey`]; client inputs are
//! addressed through [`ClientFieldKey`] plus the client's position. Mutations
//! travel as [`FieldUpdate`] values so that each (section, field, value type)
//! triple is checked at compile time.

use std::fmt;

use uuid::Uuid;

use crate::client::{ClientType, MaritalStatus};
use crate::role::AgentRole;
use crate::sections::{FeePayer, WarrantyPayer};

/// Form sections in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Role,
    Property,
    Clients,
    Commission,
    PropertyDetails,
    Warranty,
    Title,
    AdditionalInfo,
    Signature,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Role => "Agent Role",
            Section::Property => "Property Information",
            Section::Clients => "Clients",
            Section::Commission => "Commission",
            Section::PropertyDetails => "Property Details",
            Section::Warranty => "Home Warranty",
            Section::Title => "Title Company",
            Section::AdditionalInfo => "Additional Information",
            Section::Signature => "Signature",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Input shape and format rule attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldFormat {
    Text,
    Choice,
    Flag,
    Email,
    Phone,
    Percentage,
    Money,
    MlsNumber,
    ZipCode,
    StateCode,
    Ein,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    SelectedRole,
    MlsNumber,
    StreetAddress,
    City,
    State,
    ZipCode,
    SalePrice,
    ListingAgentCommission,
    BuyersAgentCommission,
    IsReferral,
    ReferralParty,
    BrokerEin,
    ReferralFee,
    CoordinatorFee,
    CoordinatorFeePaidBy,
    Municipality,
    ResaleCertRequired,
    HoaName,
    CoRequired,
    HasAttorney,
    AttorneyName,
    HasWarranty,
    WarrantyProvider,
    WarrantyCost,
    WarrantyPaidBy,
    TitleCompanyName,
    TitleContactName,
    TitleEmail,
    TitlePhone,
    SpecialInstructions,
    UrgentIssues,
    Notes,
    AgentName,
    Signature,
    SignatureDate,
    TermsAccepted,
}

impl FieldKey {
    /// Stable key used in error maps and serialized drafts.
    pub fn key(self) -> &'static str {
        match self {
            FieldKey::SelectedRole => "selectedRole",
            FieldKey::MlsNumber => "mlsNumber",
            FieldKey::StreetAddress => "streetAddress",
            FieldKey::City => "city",
            FieldKey::State => "state",
            FieldKey::ZipCode => "zipCode",
            FieldKey::SalePrice => "salePrice",
            FieldKey::ListingAgentCommission => "listingAgentCommission",
            FieldKey::BuyersAgentCommission => "buyersAgentCommission",
            FieldKey::IsReferral => "isReferral",
            FieldKey::ReferralParty => "referralParty",
            FieldKey::BrokerEin => "brokerEin",
            FieldKey::ReferralFee => "referralFee",
            FieldKey::CoordinatorFee => "coordinatorFee",
            FieldKey::CoordinatorFeePaidBy => "coordinatorFeePaidBy",
            FieldKey::Municipality => "municipality",
            FieldKey::ResaleCertRequired => "resaleCertRequired",
            FieldKey::HoaName => "hoaName",
            FieldKey::CoRequired => "coRequired",
            FieldKey::HasAttorney => "hasAttorney",
            FieldKey::AttorneyName => "attorneyName",
            FieldKey::HasWarranty => "hasWarranty",
            FieldKey::WarrantyProvider => "provider",
            FieldKey::WarrantyCost => "cost",
            FieldKey::WarrantyPaidBy => "warrantyPaidBy",
            FieldKey::TitleCompanyName => "titleCompanyName",
            FieldKey::TitleContactName => "titleContactName",
            FieldKey::TitleEmail => "titleEmail",
            FieldKey::TitlePhone => "titlePhone",
            FieldKey::SpecialInstructions => "specialInstructions",
            FieldKey::UrgentIssues => "urgentIssues",
            FieldKey::Notes => "notes",
            FieldKey::AgentName => "agentName",
            FieldKey::Signature => "signature",
            FieldKey::SignatureDate => "signatureDate",
            FieldKey::TermsAccepted => "termsAccepted",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKey::SelectedRole => "Agent role",
            FieldKey::MlsNumber => "MLS number",
            FieldKey::StreetAddress => "Street address",
            FieldKey::City => "City",
            FieldKey::State => "State",
            FieldKey::ZipCode => "ZIP code",
            FieldKey::SalePrice => "Sale price",
            FieldKey::ListingAgentCommission => "Listing agent commission (%)",
            FieldKey::BuyersAgentCommission => "Buyer's agent commission (%)",
            FieldKey::IsReferral => "Referral involved",
            FieldKey::ReferralParty => "Referral party",
            FieldKey::BrokerEin => "Broker EIN",
            FieldKey::ReferralFee => "Referral fee (%)",
            FieldKey::CoordinatorFee => "Coordinator fee",
            FieldKey::CoordinatorFeePaidBy => "Coordinator fee paid by",
            FieldKey::Municipality => "Municipality",
            FieldKey::ResaleCertRequired => "Resale certificate required",
            FieldKey::HoaName => "HOA name",
            FieldKey::CoRequired => "Certificate of occupancy required",
            FieldKey::HasAttorney => "Attorney involved",
            FieldKey::AttorneyName => "Attorney name",
            FieldKey::HasWarranty => "Home warranty included",
            FieldKey::WarrantyProvider => "Warranty provider",
            FieldKey::WarrantyCost => "Warranty cost",
            FieldKey::WarrantyPaidBy => "Warranty paid by",
            FieldKey::TitleCompanyName => "Title company",
            FieldKey::TitleContactName => "Title contact",
            FieldKey::TitleEmail => "Title email",
            FieldKey::TitlePhone => "Title phone",
            FieldKey::SpecialInstructions => "Special instructions",
            FieldKey::UrgentIssues => "Urgent issues",
            FieldKey::Notes => "Notes",
            FieldKey::AgentName => "Agent name",
            FieldKey::Signature => "Signature",
            FieldKey::SignatureDate => "Signature date",
            FieldKey::TermsAccepted => "Terms accepted",
        }
    }

    pub fn section(self) -> Section {
        match self {
            FieldKey::SelectedRole => Section::Role,
            FieldKey::MlsNumber
            | FieldKey::StreetAddress
            | FieldKey::City
            | FieldKey::State
            | FieldKey::ZipCode
            | FieldKey::SalePrice => Section::Property,
            FieldKey::ListingAgentCommission
            | FieldKey::BuyersAgentCommission
            | FieldKey::IsReferral
            | FieldKey::ReferralParty
            | FieldKey::BrokerEin
            | FieldKey::ReferralFee
            | FieldKey::CoordinatorFee
            | FieldKey::CoordinatorFeePaidBy => Section::Commission,
            FieldKey::Municipality
            | FieldKey::ResaleCertRequired
            | FieldKey::HoaName
            | FieldKey::CoRequired
            | FieldKey::HasAttorney
            | FieldKey::AttorneyName => Section::PropertyDetails,
            FieldKey::HasWarranty
            | FieldKey::WarrantyProvider
            | FieldKey::WarrantyCost
            | FieldKey::WarrantyPaidBy => Section::Warranty,
            FieldKey::TitleCompanyName
            | FieldKey::TitleContactName
            | FieldKey::TitleEmail
            | FieldKey::TitlePhone => Section::Title,
            FieldKey::SpecialInstructions | FieldKey::UrgentIssues | FieldKey::Notes => {
                Section::AdditionalInfo
            }
            FieldKey::AgentName
            | FieldKey::Signature
            | FieldKey::SignatureDate
            | FieldKey::TermsAccepted => Section::Signature,
        }
    }

    pub fn format(self) -> FieldFormat {
        match self {
            FieldKey::SelectedRole | FieldKey::CoordinatorFeePaidBy | FieldKey::WarrantyPaidBy => {
                FieldFormat::Choice
            }
            FieldKey::IsReferral
            | FieldKey::ResaleCertRequired
            | FieldKey::CoRequired
            | FieldKey::HasAttorney
            | FieldKey::HasWarranty
            | FieldKey::TermsAccepted => FieldFormat::Flag,
            FieldKey::MlsNumber => FieldFormat::MlsNumber,
            FieldKey::State => FieldFormat::StateCode,
            FieldKey::ZipCode => FieldFormat::ZipCode,
            FieldKey::SalePrice | FieldKey::CoordinatorFee | FieldKey::WarrantyCost => {
                FieldFormat::Money
            }
            FieldKey::ListingAgentCommission
            | FieldKey::BuyersAgentCommission
            | FieldKey::ReferralFee => FieldFormat::Percentage,
            FieldKey::BrokerEin => FieldFormat::Ein,
            FieldKey::TitleEmail => FieldFormat::Email,
            FieldKey::TitlePhone => FieldFormat::Phone,
            FieldKey::SignatureDate => FieldFormat::Date,
            _ => FieldFormat::Text,
        }
    }

    /// Builds a text update for this key; `None` for flag and choice keys.
    pub fn text_update(self, value: impl Into<String>) -> Option<FieldUpdate> {
        let value = value.into();
        let update = match self {
            FieldKey::MlsNumber => FieldUpdate::Property(PropertyField::MlsNumber(value)),
            FieldKey::StreetAddress => FieldUpdate::Property(PropertyField::StreetAddress(value)),
            FieldKey::City => FieldUpdate::Property(PropertyField::City(value)),
            FieldKey::State => FieldUpdate::Property(PropertyField::State(value)),
            FieldKey::ZipCode => FieldUpdate::Property(PropertyField::ZipCode(value)),
            FieldKey::SalePrice => FieldUpdate::Property(PropertyField::SalePrice(value)),
            FieldKey::ListingAgentCommission => {
                FieldUpdate::Commission(CommissionField::ListingAgentCommission(value))
            }
            FieldKey::BuyersAgentCommission => {
                FieldUpdate::Commission(CommissionField::BuyersAgentCommission(value))
            }
            FieldKey::ReferralParty => {
                FieldUpdate::Commission(CommissionField::ReferralParty(value))
            }
            FieldKey::BrokerEin => FieldUpdate::Commission(CommissionField::BrokerEin(value)),
            FieldKey::ReferralFee => FieldUpdate::Commission(CommissionField::ReferralFee(value)),
            FieldKey::CoordinatorFee => {
                FieldUpdate::Commission(CommissionField::CoordinatorFee(value))
            }
            FieldKey::Municipality => {
                FieldUpdate::PropertyDetails(PropertyDetailsField::Municipality(value))
            }
            FieldKey::HoaName => FieldUpdate::PropertyDetails(PropertyDetailsField::HoaName(value)),
            FieldKey::AttorneyName => {
                FieldUpdate::PropertyDetails(PropertyDetailsField::AttorneyName(value))
            }
            FieldKey::WarrantyProvider => FieldUpdate::Warranty(WarrantyField::Provider(value)),
            FieldKey::WarrantyCost => FieldUpdate::Warranty(WarrantyField::Cost(value)),
            FieldKey::TitleCompanyName => FieldUpdate::Title(TitleField::CompanyName(value)),
            FieldKey::TitleContactName => FieldUpdate::Title(TitleField::ContactName(value)),
            FieldKey::TitleEmail => FieldUpdate::Title(TitleField::Email(value)),
            FieldKey::TitlePhone => FieldUpdate::Title(TitleField::Phone(value)),
            FieldKey::SpecialInstructions => {
                FieldUpdate::AdditionalInfo(AdditionalInfoField::SpecialInstructions(value))
            }
            FieldKey::UrgentIssues => {
                FieldUpdate::AdditionalInfo(AdditionalInfoField::UrgentIssues(value))
            }
            FieldKey::Notes => FieldUpdate::AdditionalInfo(AdditionalInfoField::Notes(value)),
            FieldKey::AgentName => FieldUpdate::Signature(SignatureField::AgentName(value)),
            FieldKey::Signature => FieldUpdate::Signature(SignatureField::Signature(value)),
            FieldKey::SignatureDate => FieldUpdate::Signature(SignatureField::Date(value)),
            _ => return None,
        };
        Some(update)
    }

    /// Builds a flag update for this key; `None` for non-flag keys.
    pub fn flag_update(self, value: bool) -> Option<FieldUpdate> {
        let update = match self {
            FieldKey::IsReferral => FieldUpdate::Commission(CommissionField::IsReferral(value)),
            FieldKey::ResaleCertRequired => {
                FieldUpdate::PropertyDetails(PropertyDetailsField::ResaleCertRequired(value))
            }
            FieldKey::CoRequired => {
                FieldUpdate::PropertyDetails(PropertyDetailsField::CoRequired(value))
            }
            FieldKey::HasAttorney => {
                FieldUpdate::PropertyDetails(PropertyDetailsField::HasAttorney(value))
            }
            FieldKey::HasWarranty => FieldUpdate::Warranty(WarrantyField::HasWarranty(value)),
            FieldKey::TermsAccepted => {
                FieldUpdate::Signature(SignatureField::TermsAccepted(value))
            }
            _ => return None,
        };
        Some(update)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClientFieldKey {
    Name,
    Email,
    Phone,
    Address,
    MaritalStatus,
    ClientType,
}

impl ClientFieldKey {
    pub const ALL: [ClientFieldKey; 6] = [
        ClientFieldKey::Name,
        ClientFieldKey::Email,
        ClientFieldKey::Phone,
        ClientFieldKey::Address,
        ClientFieldKey::MaritalStatus,
        ClientFieldKey::ClientType,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ClientFieldKey::Name => "name",
            ClientFieldKey::Email => "email",
            ClientFieldKey::Phone => "phone",
            ClientFieldKey::Address => "address",
            ClientFieldKey::MaritalStatus => "maritalStatus",
            ClientFieldKey::ClientType => "type",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClientFieldKey::Name => "Full name",
            ClientFieldKey::Email => "Email",
            ClientFieldKey::Phone => "Phone",
            ClientFieldKey::Address => "Current address",
            ClientFieldKey::MaritalStatus => "Marital status",
            ClientFieldKey::ClientType => "Client type",
        }
    }

    pub fn format(self) -> FieldFormat {
        match self {
            ClientFieldKey::Email => FieldFormat::Email,
            ClientFieldKey::Phone => FieldFormat::Phone,
            ClientFieldKey::MaritalStatus | ClientFieldKey::ClientType => FieldFormat::Choice,
            ClientFieldKey::Name | ClientFieldKey::Address => FieldFormat::Text,
        }
    }

    /// Builds a text update for the given client; `None` for choice keys.
    pub fn text_update(self, id: Uuid, value: impl Into<String>) -> Option<FieldUpdate> {
        let value = value.into();
        let update = match self {
            ClientFieldKey::Name => ClientUpdate::Name(value),
            ClientFieldKey::Email => ClientUpdate::Email(value),
            ClientFieldKey::Phone => ClientUpdate::Phone(value),
            ClientFieldKey::Address => ClientUpdate::Address(value),
            ClientFieldKey::MaritalStatus | ClientFieldKey::ClientType => return None,
        };
        Some(FieldUpdate::Client { id, update })
    }
}

/// Addresses a single input of the form, including per-client inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    Field(FieldKey),
    /// The client list as a whole (e.g. "at least one client").
    Clients,
    Client { index: usize, field: ClientFieldKey },
}

impl FieldPath {
    pub fn client(index: usize, field: ClientFieldKey) -> Self {
        FieldPath::Client { index, field }
    }

    pub fn label(&self) -> String {
        match self {
            FieldPath::Field(key) => key.label().to_string(),
            FieldPath::Clients => "Clients".to_string(),
            FieldPath::Client { index, field } => {
                format!("Client {} {}", index + 1, field.label().to_ascii_lowercase())
            }
        }
    }

    pub fn format(&self) -> FieldFormat {
        match self {
            FieldPath::Field(key) => key.format(),
            FieldPath::Clients => FieldFormat::Text,
            FieldPath::Client { field, .. } => field.format(),
        }
    }
}

impl From<FieldKey> for FieldPath {
    fn from(key: FieldKey) -> Self {
        FieldPath::Field(key)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Field(key) => f.write_str(key.key()),
            FieldPath::Clients => f.write_str("clients"),
            FieldPath::Client { index, field } => write!(f, "clients[{}].{}", index, field.key()),
        }
    }
}

/// Borrowed view of a field's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Flag(bool),
    Choice(Option<&'static str>),
}

impl FieldValue<'_> {
    /// Presence check used by required-field validation.
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.trim().is_empty(),
            FieldValue::Flag(value) => *value,
            FieldValue::Choice(choice) => choice.is_some(),
        }
    }
}

/// Typed mutation of a single form input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Role(AgentRole),
    Property(PropertyField),
    Client { id: Uuid, update: ClientUpdate },
    Commission(CommissionField),
    PropertyDetails(PropertyDetailsField),
    Warranty(WarrantyField),
    Title(TitleField),
    AdditionalInfo(AdditionalInfoField),
    Signature(SignatureField),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyField {
    MlsNumber(String),
    StreetAddress(String),
    City(String),
    State(String),
    ZipCode(String),
    SalePrice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientUpdate {
    Name(String),
    Email(String),
    Phone(String),
    Address(String),
    MaritalStatus(Option<MaritalStatus>),
    ClientType(ClientType),
}

impl ClientUpdate {
    pub fn field(&self) -> ClientFieldKey {
        match self {
            ClientUpdate::Name(_) => ClientFieldKey::Name,
            ClientUpdate::Email(_) => ClientFieldKey::Email,
            ClientUpdate::Phone(_) => ClientFieldKey::Phone,
            ClientUpdate::Address(_) => ClientFieldKey::Address,
            ClientUpdate::MaritalStatus(_) => ClientFieldKey::MaritalStatus,
            ClientUpdate::ClientType(_) => ClientFieldKey::ClientType,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommissionField {
    ListingAgentCommission(String),
    BuyersAgentCommission(String),
    IsReferral(bool),
    ReferralParty(String),
    BrokerEin(String),
    ReferralFee(String),
    CoordinatorFee(String),
    CoordinatorFeePaidBy(Option<FeePayer>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDetailsField {
    Municipality(String),
    ResaleCertRequired(bool),
    HoaName(String),
    CoRequired(bool),
    HasAttorney(bool),
    AttorneyName(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarrantyField {
    HasWarranty(bool),
    Provider(String),
    Cost(String),
    PaidBy(Option<WarrantyPayer>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TitleField {
    CompanyName(String),
    ContactName(String),
    Email(String),
    Phone(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalInfoField {
    SpecialInstructions(String),
    UrgentIssues(String),
    Notes(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignatureField {
    AgentName(String),
    Signature(String),
    Date(String),
    TermsAccepted(bool),
}
