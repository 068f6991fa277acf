//! Mapping of a completed intake into outbound payloads, and delivery of
//! those payloads through a [`TransactionGateway`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use intake_domain::{AgentRole, Section, TransactionFormData};

use crate::error::{CoreError, GatewayError};
use crate::format::{format_currency, format_percentage, parse_amount, parse_percentage, round_cents};
use crate::gateway::TransactionGateway;
use crate::steps::StepDefinitions;

/// Flat column map for the transactions table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirtableRecord {
    pub fields: BTreeMap<String, Value>,
}

impl AirtableRecord {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    fn text(&mut self, column: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.fields.insert(column.to_string(), Value::from(value));
        }
    }

    fn number(&mut self, column: &str, value: Option<f64>) {
        if let Some(value) = value {
            self.fields.insert(column.to_string(), Value::from(value));
        }
    }

    fn flag(&mut self, column: &str, value: bool) {
        self.fields.insert(column.to_string(), Value::Bool(value));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverSheetRequest {
    pub table_id: String,
    pub record_id: String,
    /// Display label, e.g. `Dual Agent`.
    pub agent_role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Deployment-specific inputs to a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionSettings {
    pub table_id: String,
    /// Notification recipients; no email is sent when empty.
    pub recipients: Vec<String>,
}

/// Payloads prepared before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionBundle {
    pub role: AgentRole,
    pub table_id: String,
    pub record: AirtableRecord,
    pub email: Option<EmailMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub record_id: String,
    pub cover_sheet_url: Option<String>,
    pub email_sent: bool,
    /// Follow-up steps that failed after the record was created.
    pub warnings: Vec<String>,
}

/// Pure transformations from form data to external payload shapes.
///
/// Identical inputs produce identical outputs; the submission date is always
/// supplied by the caller.
pub struct SubmissionAdapter;

impl SubmissionAdapter {
    pub fn prepare(
        data: &TransactionFormData,
        settings: &SubmissionSettings,
        submitted_on: NaiveDate,
    ) -> Result<SubmissionBundle, CoreError> {
        let role = require_role(data)?;
        let record = Self::to_airtable_record(data, submitted_on)?;
        let email = if settings.recipients.is_empty() {
            None
        } else {
            Some(Self::to_email(data, &settings.recipients, submitted_on)?)
        };
        Ok(SubmissionBundle {
            role,
            table_id: settings.table_id.clone(),
            record,
            email,
        })
    }

    pub fn to_airtable_record(
        data: &TransactionFormData,
        submitted_on: NaiveDate,
    ) -> Result<AirtableRecord, CoreError> {
        let role = require_role(data)?;
        require_clients(data)?;

        let property = &data.property;
        let commission = &data.commission;
        let details = &data.property_details;
        let warranty = &data.warranty;

        let sale_price = amount("sale price", &property.sale_price)?;
        let listing = if role.represents_seller() {
            percentage("listing agent commission", &commission.listing_agent_commission)?
        } else {
            None
        };
        let buyers = if role.represents_buyer() {
            percentage("buyer's agent commission", &commission.buyers_agent_commission)?
        } else {
            None
        };

        let mut record = AirtableRecord::default();
        record.text("Role", role.display_label());
        record.text("Property Address", &property.full_address());
        record.text("MLS Number", &property.mls_number);
        record.number("Sale Price", sale_price);
        record.text("Clients", &data.client_names());
        record.text("Client Emails", &join_values(data.clients.iter().map(|c| c.email.as_str())));
        record.text("Client Phones", &join_values(data.clients.iter().map(|c| c.phone.as_str())));
        record.number("Listing Agent Commission", listing);
        record.number("Buyer's Agent Commission", buyers);
        record.number("Commission Total", commission_total(sale_price, listing, buyers));

        record.flag("Referral", commission.is_referral);
        if commission.is_referral {
            record.text("Referral Party", &commission.referral_party);
            record.text("Broker EIN", &commission.broker_ein);
            record.number("Referral Fee", percentage("referral fee", &commission.referral_fee)?);
        }
        record.number("Coordinator Fee", amount("coordinator fee", &commission.coordinator_fee)?);
        if let Some(payer) = commission.coordinator_fee_paid_by {
            record.text("Coordinator Fee Paid By", payer.label());
        }

        record.text("Municipality", &details.municipality);
        record.flag("Resale Certificate", details.resale_cert_required);
        if details.resale_cert_required {
            record.text("HOA Name", &details.hoa_name);
        }
        record.flag("CO Required", details.co_required);
        if details.has_attorney {
            record.text("Attorney", &details.attorney_name);
        }

        record.flag("Home Warranty", warranty.has_warranty);
        if warranty.has_warranty {
            record.text("Warranty Provider", &warranty.provider);
            record.number("Warranty Cost", amount("warranty cost", &warranty.cost)?);
            if let Some(payer) = warranty.paid_by {
                record.text("Warranty Paid By", payer.label());
            }
        }

        if StepDefinitions::definition(Section::Title).is_visible(Some(role)) {
            record.text("Title Company", &data.title.company_name);
        }

        let info = &data.additional_info;
        record.text("Special Instructions", &info.special_instructions);
        record.text("Urgent Issues", &info.urgent_issues);
        record.text("Notes", &info.notes);
        record.text("Agent Name", &data.signature.agent_name);
        record.text("Signature Date", &data.signature.date);
        record.text("Submission Date", &submitted_on.format("%Y-%m-%d").to_string());
        Ok(record)
    }

    pub fn cover_sheet_request(
        table_id: &str,
        record_id: &str,
        role: AgentRole,
    ) -> CoverSheetRequest {
        CoverSheetRequest {
            table_id: table_id.to_string(),
            record_id: record_id.to_string(),
            agent_role: role.display_label().to_string(),
        }
    }

    pub fn to_email(
        data: &TransactionFormData,
        recipients: &[String],
        submitted_on: NaiveDate,
    ) -> Result<EmailMessage, CoreError> {
        let role = require_role(data)?;
        require_clients(data)?;
        let recipients: Vec<&str> = recipients
            .iter()
            .map(|recipient| recipient.trim())
            .filter(|recipient| !recipient.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(CoreError::Transformation(
                "no email recipients configured".into(),
            ));
        }

        let address = data.property.full_address();
        let subject = format!("New Transaction Intake: {} ({})", address, role.display_label());

        let mut lines = vec![
            format!("Submitted: {}", submitted_on.format("%Y-%m-%d")),
            format!("Agent role: {}", role.display_label()),
            format!("Property: {}", address),
            format!("MLS number: {}", data.property.mls_number.trim()),
        ];
        if let Some(price) = amount("sale price", &data.property.sale_price)? {
            lines.push(format!("Sale price: {}", format_currency(price)));
        }
        lines.push(format!("Clients: {}", data.client_names()));
        if role.represents_seller() {
            if let Some(rate) = percentage(
                "listing agent commission",
                &data.commission.listing_agent_commission,
            )? {
                lines.push(format!("Listing agent commission: {}", format_percentage(rate)));
            }
        }
        if role.represents_buyer() {
            if let Some(rate) = percentage(
                "buyer's agent commission",
                &data.commission.buyers_agent_commission,
            )? {
                lines.push(format!("Buyer's agent commission: {}", format_percentage(rate)));
            }
        }
        let urgent = data.additional_info.urgent_issues.trim();
        if !urgent.is_empty() {
            lines.push(format!("Urgent issues: {}", urgent));
        }
        let agent = data.signature.agent_name.trim();
        if !agent.is_empty() {
            lines.push(format!("Submitted by: {}", agent));
        }

        Ok(EmailMessage {
            to: recipients.join(", "),
            subject,
            body: lines.join("\n"),
        })
    }

    /// Sends a prepared bundle. Only record creation is fatal; once the record
    /// exists, cover-sheet and email failures are reported as warnings so a
    /// retry does not create a duplicate row.
    pub fn deliver(
        gateway: &dyn TransactionGateway,
        bundle: &SubmissionBundle,
    ) -> Result<SubmissionReceipt, GatewayError> {
        let record_id = gateway.create_record(&bundle.record)?;
        info!(record_id = %record_id, "transaction record created");

        let mut receipt = SubmissionReceipt {
            record_id: record_id.clone(),
            ..SubmissionReceipt::default()
        };

        let request = Self::cover_sheet_request(&bundle.table_id, &record_id, bundle.role);
        match gateway.generate_cover_sheet(&request) {
            Ok(response) if response.success => receipt.cover_sheet_url = response.url,
            Ok(response) => receipt.warnings.push(format!(
                "Cover sheet was not generated: {}",
                response
                    .error
                    .or(response.message)
                    .unwrap_or_else(|| "no reason given".into())
            )),
            Err(err) => receipt
                .warnings
                .push(format!("Cover sheet was not generated: {}", err)),
        }

        if let Some(message) = &bundle.email {
            match gateway.send_email(message) {
                Ok(response) if response.success => receipt.email_sent = true,
                Ok(response) => receipt.warnings.push(format!(
                    "Notification email was not sent: {}",
                    response.message.unwrap_or_else(|| "no reason given".into())
                )),
                Err(err) => receipt
                    .warnings
                    .push(format!("Notification email was not sent: {}", err)),
            }
        }

        for warning in &receipt.warnings {
            warn!(record_id = %record_id, "{}", warning);
        }
        Ok(receipt)
    }
}

fn require_role(data: &TransactionFormData) -> Result<AgentRole, CoreError> {
    data.selected_role
        .ok_or_else(|| CoreError::Transformation("agent role is not selected".into()))
}

fn require_clients(data: &TransactionFormData) -> Result<(), CoreError> {
    if data.clients.is_empty() {
        return Err(CoreError::Transformation("at least one client is required".into()));
    }
    Ok(())
}

fn amount(label: &str, raw: &str) -> Result<Option<f64>, CoreError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_amount(raw)
        .filter(|value| *value >= 0.0)
        .map(Some)
        .ok_or_else(|| CoreError::Transformation(format!("{} '{}' is not a valid amount", label, raw.trim())))
}

fn percentage(label: &str, raw: &str) -> Result<Option<f64>, CoreError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_percentage(raw)
        .filter(|value| (0.0..=100.0).contains(value))
        .map(Some)
        .ok_or_else(|| {
            CoreError::Transformation(format!("{} '{}' is not a valid percentage", label, raw.trim()))
        })
}

fn commission_total(sale_price: Option<f64>, listing: Option<f64>, buyers: Option<f64>) -> Option<f64> {
    let price = sale_price?;
    if listing.is_none() && buyers.is_none() {
        return None;
    }
    let rate = listing.unwrap_or(0.0) + buyers.unwrap_or(0.0);
    Some(round_cents(price * rate / 100.0))
}

fn join_values<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
