//! Aggregate holding every section of an in-progress transaction intake.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{Client, ClientType};
use crate::fields::*;
use crate::role::AgentRole;
use crate::sections::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionFormData {
    pub selected_role: Option<AgentRole>,
    pub property: PropertyData,
    pub clients: Vec<Client>,
    pub commission: CommissionData,
    pub property_details: PropertyDetailsData,
    pub warranty: WarrantyData,
    pub title: TitleCompanyData,
    pub additional_info: AdditionalInfoData,
    pub signature: SignatureData,
}

impl TransactionFormData {
    /// Creates an empty aggregate holding a single blank client.
    pub fn new() -> Self {
        Self {
            clients: vec![Client::empty(ClientType::Buyer)],
            ..Self::default()
        }
    }

    /// Client type assigned to newly added clients for the current role.
    pub fn default_client_type(&self) -> ClientType {
        match self.selected_role {
            Some(AgentRole::ListingAgent) => ClientType::Seller,
            _ => ClientType::Buyer,
        }
    }

    pub fn client_index(&self, id: Uuid) -> Option<usize> {
        self.clients.iter().position(|client| client.id == id)
    }

    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == id)
    }

    /// Comma-separated client names, skipping blanks.
    pub fn client_names(&self) -> String {
        join_non_empty(self.clients.iter().map(|client| client.name.as_str()))
    }

    /// Merges the update into its section and returns the touched path.
    ///
    /// Returns `None` when the update targets an unknown client.
    pub fn apply(&mut self, update: FieldUpdate) -> Option<FieldPath> {
        let key = match update {
            FieldUpdate::Role(role) => {
                self.selected_role = Some(role);
                FieldKey::SelectedRole
            }
            FieldUpdate::Property(field) => self.apply_property(field),
            FieldUpdate::Client { id, update } => {
                let index = self.client_index(id)?;
                let field = update.field();
                let client = &mut self.clients[index];
                match update {
                    ClientUpdate::Name(value) => client.name = value,
                    ClientUpdate::Email(value) => client.email = value,
                    ClientUpdate::Phone(value) => client.phone = value,
                    ClientUpdate::Address(value) => client.address = value,
                    ClientUpdate::MaritalStatus(value) => client.marital_status = value,
                    ClientUpdate::ClientType(value) => client.client_type = value,
                }
                return Some(FieldPath::client(index, field));
            }
            FieldUpdate::Commission(field) => self.apply_commission(field),
            FieldUpdate::PropertyDetails(field) => self.apply_property_details(field),
            FieldUpdate::Warranty(field) => match field {
                WarrantyField::HasWarranty(value) => {
                    self.warranty.has_warranty = value;
                    FieldKey::HasWarranty
                }
                WarrantyField::Provider(value) => {
                    self.warranty.provider = value;
                    FieldKey::WarrantyProvider
                }
                WarrantyField::Cost(value) => {
                    self.warranty.cost = value;
                    FieldKey::WarrantyCost
                }
                WarrantyField::PaidBy(value) => {
                    self.warranty.paid_by = value;
                    FieldKey::WarrantyPaidBy
                }
            },
            FieldUpdate::Title(field) => match field {
                TitleField::CompanyName(value) => {
                    self.title.company_name = value;
                    FieldKey::TitleCompanyName
                }
                TitleField::ContactName(value) => {
                    self.title.contact_name = value;
                    FieldKey::TitleContactName
                }
                TitleField::Email(value) => {
                    self.title.email = value;
                    FieldKey::TitleEmail
                }
                TitleField::Phone(value) => {
                    self.title.phone = value;
                    FieldKey::TitlePhone
                }
            },
            FieldUpdate::AdditionalInfo(field) => match field {
                AdditionalInfoField::SpecialInstructions(value) => {
                    self.additional_info.special_instructions = value;
                    FieldKey::SpecialInstructions
                }
                AdditionalInfoField::UrgentIssues(value) => {
                    self.additional_info.urgent_issues = value;
                    FieldKey::UrgentIssues
                }
                AdditionalInfoField::Notes(value) => {
                    self.additional_info.notes = value;
                    FieldKey::Notes
                }
            },
            FieldUpdate::Signature(field) => match field {
                SignatureField::AgentName(value) => {
                    self.signature.agent_name = value;
                    FieldKey::AgentName
                }
                SignatureField::Signature(value) => {
                    self.signature.signature = value;
                    FieldKey::Signature
                }
                SignatureField::Date(value) => {
                    self.signature.date = value;
                    FieldKey::SignatureDate
                }
                SignatureField::TermsAccepted(value) => {
                    self.signature.terms_accepted = value;
                    FieldKey::TermsAccepted
                }
            },
        };
        Some(FieldPath::Field(key))
    }

    fn apply_property(&mut self, field: PropertyField) -> FieldKey {
        let property = &mut self.property;
        match field {
            PropertyField::MlsNumber(value) => {
                property.mls_number = value;
                FieldKey::MlsNumber
            }
            PropertyField::StreetAddress(value) => {
                property.street_address = value;
                FieldKey::StreetAddress
            }
            PropertyField::City(value) => {
                property.city = value;
                FieldKey::City
            }
            PropertyField::State(value) => {
                property.state = value;
                FieldKey::State
            }
            PropertyField::ZipCode(value) => {
                property.zip_code = value;
                FieldKey::ZipCode
            }
            PropertyField::SalePrice(value) => {
                property.sale_price = value;
                FieldKey::SalePrice
            }
        }
    }

    fn apply_commission(&mut self, field: CommissionField) -> FieldKey {
        let commission = &mut self.commission;
        match field {
            CommissionField::ListingAgentCommission(value) => {
                commission.listing_agent_commission = value;
                FieldKey::ListingAgentCommission
            }
            CommissionField::BuyersAgentCommission(value) => {
                commission.buyers_agent_commission = value;
                FieldKey::BuyersAgentCommission
            }
            CommissionField::IsReferral(value) => {
                commission.is_referral = value;
                FieldKey::IsReferral
            }
            CommissionField::ReferralParty(value) => {
                commission.referral_party = value;
                FieldKey::ReferralParty
            }
            CommissionField::BrokerEin(value) => {
                commission.broker_ein = value;
                FieldKey::BrokerEin
            }
            CommissionField::ReferralFee(value) => {
                commission.referral_fee = value;
                FieldKey::ReferralFee
            }
            CommissionField::CoordinatorFee(value) => {
                commission.coordinator_fee = value;
                FieldKey::CoordinatorFee
            }
            CommissionField::CoordinatorFeePaidBy(value) => {
                commission.coordinator_fee_paid_by = value;
                FieldKey::CoordinatorFeePaidBy
            }
        }
    }

    fn apply_property_details(&mut self, field: PropertyDetailsField) -> FieldKey {
        let details = &mut self.property_details;
        match field {
            PropertyDetailsField::Municipality(value) => {
                details.municipality = value;
                FieldKey::Municipality
            }
            PropertyDetailsField::ResaleCertRequired(value) => {
                details.resale_cert_required = value;
                FieldKey::ResaleCertRequired
            }
            PropertyDetailsField::HoaName(value) => {
                details.hoa_name = value;
                FieldKey::HoaName
            }
            PropertyDetailsField::CoRequired(value) => {
                details.co_required = value;
                FieldKey::CoRequired
            }
            PropertyDetailsField::HasAttorney(value) => {
                details.has_attorney = value;
                FieldKey::HasAttorney
            }
            PropertyDetailsField::AttorneyName(value) => {
                details.attorney_name = value;
                FieldKey::AttorneyName
            }
        }
    }

    /// Reads the current value at `path`; `None` for out-of-range clients.
    pub fn value(&self, path: FieldPath) -> Option<FieldValue<'_>> {
        match path {
            FieldPath::Field(key) => Some(self.field_value(key)),
            FieldPath::Clients => Some(FieldValue::Flag(!self.clients.is_empty())),
            FieldPath::Client { index, field } => {
                let client = self.clients.get(index)?;
                let value = match field {
                    ClientFieldKey::Name => FieldValue::Text(&client.name),
                    ClientFieldKey::Email => FieldValue::Text(&client.email),
                    ClientFieldKey::Phone => FieldValue::Text(&client.phone),
                    ClientFieldKey::Address => FieldValue::Text(&client.address),
                    ClientFieldKey::MaritalStatus => {
                        FieldValue::Choice(client.marital_status.map(|status| status.label()))
                    }
                    ClientFieldKey::ClientType => FieldValue::Choice(Some(match client.client_type {
                        ClientType::Buyer => "Buyer",
                        ClientType::Seller => "Seller",
                    })),
                };
                Some(value)
            }
        }
    }

    fn field_value(&self, key: FieldKey) -> FieldValue<'_> {
        use FieldValue::{Choice, Flag, Text};
        match key {
            FieldKey::SelectedRole => Choice(self.selected_role.map(AgentRole::slug)),
            FieldKey::MlsNumber => Text(&self.property.mls_number),
            FieldKey::StreetAddress => Text(&self.property.street_address),
            FieldKey::City => Text(&self.property.city),
            FieldKey::State => Text(&self.property.state),
            FieldKey::ZipCode => Text(&self.property.zip_code),
            FieldKey::SalePrice => Text(&self.property.sale_price),
            FieldKey::ListingAgentCommission => Text(&self.commission.listing_agent_commission),
            FieldKey::BuyersAgentCommission => Text(&self.commission.buyers_agent_commission),
            FieldKey::IsReferral => Flag(self.commission.is_referral),
            FieldKey::ReferralParty => Text(&self.commission.referral_party),
            FieldKey::BrokerEin => Text(&self.commission.broker_ein),
            FieldKey::ReferralFee => Text(&self.commission.referral_fee),
            FieldKey::CoordinatorFee => Text(&self.commission.coordinator_fee),
            FieldKey::CoordinatorFeePaidBy => {
                Choice(self.commission.coordinator_fee_paid_by.map(FeePayer::label))
            }
            FieldKey::Municipality => Text(&self.property_details.municipality),
            FieldKey::ResaleCertRequired => Flag(self.property_details.resale_cert_required),
            FieldKey::HoaName => Text(&self.property_details.hoa_name),
            FieldKey::CoRequired => Flag(self.property_details.co_required),
            FieldKey::HasAttorney => Flag(self.property_details.has_attorney),
            FieldKey::AttorneyName => Text(&self.property_details.attorney_name),
            FieldKey::HasWarranty => Flag(self.warranty.has_warranty),
            FieldKey::WarrantyProvider => Text(&self.warranty.provider),
            FieldKey::WarrantyCost => Text(&self.warranty.cost),
            FieldKey::WarrantyPaidBy => Choice(self.warranty.paid_by.map(WarrantyPayer::label)),
            FieldKey::TitleCompanyName => Text(&self.title.company_name),
            FieldKey::TitleContactName => Text(&self.title.contact_name),
            FieldKey::TitleEmail => Text(&self.title.email),
            FieldKey::TitlePhone => Text(&self.title.phone),
            FieldKey::SpecialInstructions => Text(&self.additional_info.special_instructions),
            FieldKey::UrgentIssues => Text(&self.additional_info.urgent_issues),
            FieldKey::Notes => Text(&self.additional_info.notes),
            FieldKey::AgentName => Text(&self.signature.agent_name),
            FieldKey::Signature => Text(&self.signature.signature),
            FieldKey::SignatureDate => Text(&self.signature.date),
            FieldKey::TermsAccepted => Flag(self.signature.terms_accepted),
        }
    }
}

fn join_non_empty<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MaritalStatus;

    #[test]
    fn new_form_has_one_blank_client() {
        let form = TransactionFormData::new();
        assert_eq!(form.clients.len(), 1);
        assert!(form.selected_role.is_none());
    }

    #[test]
    fn apply_reports_touched_paths() {
        let mut form = TransactionFormData::new();
        let id = form.clients[0].id;

        let path = form.apply(FieldUpdate::Property(PropertyField::MlsNumber("PM-1".into())));
        assert_eq!(path, Some(FieldPath::Field(FieldKey::MlsNumber)));
        assert_eq!(form.property.mls_number, "PM-1");

        let path = form.apply(FieldUpdate::Client {
            id,
            update: ClientUpdate::MaritalStatus(Some(MaritalStatus::Married)),
        });
        assert_eq!(
            path,
            Some(FieldPath::client(0, ClientFieldKey::MaritalStatus))
        );
        assert_eq!(form.clients[0].marital_status, Some(MaritalStatus::Married));
    }

    #[test]
    fn apply_ignores_unknown_clients() {
        let mut form = TransactionFormData::new();
        let before = form.clone();
        let path = form.apply(FieldUpdate::Client {
            id: Uuid::new_v4(),
            update: ClientUpdate::Name("Ghost".into()),
        });
        assert!(path.is_none());
        assert_eq!(form, before);
    }

    #[test]
    fn client_names_skip_blanks() {
        let mut form = TransactionFormData::new();
        form.clients[0].name = "Jane Doe".into();
        form.clients.push(Client::empty(ClientType::Buyer));
        let mut third = Client::empty(ClientType::Buyer);
        third.name = " John Doe ".into();
        form.clients.push(third);
        assert_eq!(form.client_names(), "Jane Doe, John Doe");
    }

    #[test]
    fn deserializes_partial_drafts() {
        let json = r#"{"selectedRole":"dualAgent","property":{"mlsNumber":"PM-12345"}}"#;
        let form: TransactionFormData = serde_json::from_str(json).unwrap();
        assert_eq!(form.selected_role, Some(AgentRole::DualAgent));
        assert_eq!(form.property.mls_number, "PM-12345");
        assert!(form.clients.is_empty());
    }
}
