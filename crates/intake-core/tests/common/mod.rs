#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};
use intake_core::{
    AirtableRecord, CoverSheetRequest, CoverSheetResponse, EmailMessage, EmailResponse,
    FixedClock, FormStore, GatewayError, TransactionGateway, ValidationEngine, ValidationRules,
};
use intake_domain::{
    AgentRole, MaritalStatus, TransactionFormData, WarrantyPayer,
};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date")
}

pub fn engine() -> ValidationEngine {
    ValidationEngine::new(ValidationRules::default(), Arc::new(FixedClock::new(today())))
}

/// A dual-agent intake with every required field filled in.
pub fn complete_form() -> TransactionFormData {
    let mut form = TransactionFormData::new();
    form.selected_role = Some(AgentRole::DualAgent);

    form.property.mls_number = "PM-12345".into();
    form.property.street_address = "123 Main St".into();
    form.property.city = "Philadelphia".into();
    form.property.state = "PA".into();
    form.property.zip_code = "19103".into();
    form.property.sale_price = "$350,000".into();

    let client = &mut form.clients[0];
    client.name = "Jane Doe".into();
    client.email = "jane@x.com".into();
    client.phone = "2155551234".into();
    client.address = "45 Pine St, Philadelphia, PA 19106".into();
    client.marital_status = Some(MaritalStatus::Married);

    form.commission.listing_agent_commission = "3".into();
    form.commission.buyers_agent_commission = "2.5%".into();

    form.property_details.municipality = "Philadelphia".into();
    form.warranty.has_warranty = true;
    form.warranty.provider = "American Home Shield".into();
    form.warranty.cost = "525".into();
    form.warranty.paid_by = Some(WarrantyPayer::Seller);

    form.title.company_name = "Keystone Title".into();

    form.signature.agent_name = "Alex Agent".into();
    form.signature.signature = "Alex Agent".into();
    form.signature.date = (today() + Duration::days(1)).format("%Y-%m-%d").to_string();
    form.signature.terms_accepted = true;
    form
}

/// Store positioned on the final step of a complete intake.
pub fn store_on_final_step() -> FormStore {
    let mut store = FormStore::from_data(complete_form(), engine());
    let total = store.state().total_steps;
    for _ in 1..total {
        store.next().expect("complete form advances");
    }
    store
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    None,
    Record,
    CoverSheet,
    Email,
}

/// Records every outbound payload; fails at the configured stage.
pub struct RecordingGateway {
    pub failure: Failure,
    pub records: Mutex<Vec<AirtableRecord>>,
    pub cover_sheets: Mutex<Vec<CoverSheetRequest>>,
    pub emails: Mutex<Vec<EmailMessage>>,
}

impl RecordingGateway {
    pub fn new(failure: Failure) -> Self {
        Self {
            failure,
            records: Mutex::new(Vec::new()),
            cover_sheets: Mutex::new(Vec::new()),
            emails: Mutex::new(Vec::new()),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().expect("records lock").len()
    }
}

impl TransactionGateway for RecordingGateway {
    fn create_record(&self, record: &AirtableRecord) -> Result<String, GatewayError> {
        if self.failure == Failure::Record {
            return Err(GatewayError::Remote {
                status: 422,
                message: "INVALID_VALUE_FOR_COLUMN".into(),
            });
        }
        let mut records = self.records.lock().expect("records lock");
        records.push(record.clone());
        Ok(format!("rec{}", records.len()))
    }

    fn generate_cover_sheet(
        &self,
        request: &CoverSheetRequest,
    ) -> Result<CoverSheetResponse, GatewayError> {
        self.cover_sheets
            .lock()
            .expect("cover sheet lock")
            .push(request.clone());
        if self.failure == Failure::CoverSheet {
            return Ok(CoverSheetResponse {
                success: false,
                message: Some("Failed to generate cover sheet".into()),
                error: Some("template missing".into()),
                url: None,
            });
        }
        Ok(CoverSheetResponse {
            success: true,
            url: Some(format!("https://files.example/{}.pdf", request.record_id)),
            ..CoverSheetResponse::default()
        })
    }

    fn send_email(&self, message: &EmailMessage) -> Result<EmailResponse, GatewayError> {
        self.emails.lock().expect("email lock").push(message.clone());
        if self.failure == Failure::Email {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        Ok(EmailResponse {
            success: true,
            message: Some("Email sent".into()),
        })
    }
}
