use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::submission::{AirtableRecord, CoverSheetRequest, EmailMessage};

/// Reply from the cover-sheet endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverSheetResponse {
    pub success: bool,
    pub message: Option<String>,
    #[serde(alias = "pdfUrl")]
    pub url: Option<String>,
    pub error: Option<String>,
}

/// Reply from the email endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Outbound collaborators reached during submission.
pub trait TransactionGateway: Send + Sync {
    /// Creates the transaction row and returns its record id.
    fn create_record(&self, record: &AirtableRecord) -> Result<String, GatewayError>;

    fn generate_cover_sheet(
        &self,
        request: &CoverSheetRequest,
    ) -> Result<CoverSheetResponse, GatewayError>;

    fn send_email(&self, message: &EmailMessage) -> Result<EmailResponse, GatewayError>;
}
