//! Text rendering of validation reports, summaries and receipts.

use chrono::NaiveDate;

use intake_core::format::{format_currency, format_phone, parse_amount};
use intake_core::{StepDefinitions, SubmissionReceipt, ValidationEngine, ValidationResult};
use intake_domain::TransactionFormData;

use super::output::{style, MessageKind};

/// One line per message: `  - Client 1 email: Enter a valid email address`.
pub fn field_error_lines(errors: &ValidationResult) -> Vec<String> {
    errors
        .iter()
        .flat_map(|(path, messages)| {
            messages
                .iter()
                .map(move |message| format!("  - {}: {}", path.label(), message))
        })
        .collect()
}

pub fn print_field_errors(errors: &ValidationResult) {
    for line in field_error_lines(errors) {
        println!("{}", style(MessageKind::Error, line));
    }
}

/// Validation report grouped by visible step; empty when the form is complete.
pub fn step_report(
    engine: &ValidationEngine,
    data: &TransactionFormData,
    today: NaiveDate,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (position, step) in StepDefinitions::visible_steps(data.selected_role)
        .into_iter()
        .enumerate()
    {
        let errors = engine.validate_step(step, data, today);
        if errors.is_valid() {
            continue;
        }
        lines.push(format!("Step {} ({}):", position + 1, step.title()));
        lines.extend(field_error_lines(&errors));
    }
    lines
}

pub fn summary_lines(data: &TransactionFormData) -> Vec<String> {
    let mut lines = Vec::new();
    let role = data
        .selected_role
        .map(|role| role.display_label())
        .unwrap_or("(not selected)");
    lines.push(format!("Role:       {}", role));
    lines.push(format!("Property:   {}", data.property.full_address()));
    if let Some(price) = parse_amount(&data.property.sale_price) {
        lines.push(format!("Sale price: {}", format_currency(price)));
    }
    for (index, client) in data.clients.iter().enumerate() {
        lines.push(format!(
            "Client {}:   {} <{}> {}",
            index + 1,
            client.name.trim(),
            client.email.trim(),
            format_phone(&client.phone)
        ));
    }
    lines
}

pub fn receipt_lines(receipt: &SubmissionReceipt) -> Vec<String> {
    let mut lines = vec![format!("Record:      {}", receipt.record_id)];
    if let Some(url) = &receipt.cover_sheet_url {
        lines.push(format!("Cover sheet: {}", url));
    }
    lines.push(format!(
        "Email:       {}",
        if receipt.email_sent { "sent" } else { "not sent" }
    ));
    lines
}
