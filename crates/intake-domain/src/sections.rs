//! Per-section records that make up a transaction intake.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::format_address;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyData {
    pub mls_number: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub sale_price: String,
}

impl PropertyData {
    /// Single-line address, e.g. `123 Main St, Philadelphia, PA 19103`.
    pub fn full_address(&self) -> String {
        format_address(&self.street_address, &self.city, &self.state, &self.zip_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommissionData {
    pub listing_agent_commission: String,
    pub buyers_agent_commission: String,
    pub is_referral: bool,
    pub referral_party: String,
    pub broker_ein: String,
    pub referral_fee: String,
    pub coordinator_fee: String,
    pub coordinator_fee_paid_by: Option<FeePayer>,
}

/// Who pays the transaction coordinator fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeePayer {
    Client,
    Agent,
}

impl FeePayer {
    pub const ALL: [FeePayer; 2] = [FeePayer::Client, FeePayer::Agent];

    pub fn label(self) -> &'static str {
        match self {
            FeePayer::Client => "Client",
            FeePayer::Agent => "Agent",
        }
    }
}

impl fmt::Display for FeePayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDetailsData {
    pub municipality: String,
    pub resale_cert_required: bool,
    pub hoa_name: String,
    pub co_required: bool,
    pub has_attorney: bool,
    pub attorney_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyData {
    pub has_warranty: bool,
    pub provider: String,
    pub cost: String,
    pub paid_by: Option<WarrantyPayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarrantyPayer {
    Buyer,
    Seller,
    Agent,
}

impl WarrantyPayer {
    pub const ALL: [WarrantyPayer; 3] =
        [WarrantyPayer::Buyer, WarrantyPayer::Seller, WarrantyPayer::Agent];

    pub fn label(self) -> &'static str {
        match self {
            WarrantyPayer::Buyer => "Buyer",
            WarrantyPayer::Seller => "Seller",
            WarrantyPayer::Agent => "Agent",
        }
    }
}

impl fmt::Display for WarrantyPayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleCompanyData {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalInfoData {
    pub special_instructions: String,
    pub urgent_issues: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureData {
    pub agent_name: String,
    pub signature: String,
    /// Signing date as entered (`YYYY-MM-DD`).
    pub date: String,
    pub terms_accepted: bool,
}
