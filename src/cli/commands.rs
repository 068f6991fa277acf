//! Handlers behind each subcommand.

use std::io::{self, BufReader};
use std::path::Path;
use std::process::ExitCode;

use intake_core::{
    is_valid_email, parse_date, AddressBook, CoreError, FormStore, SubmissionAdapter,
    ValidationResult, MAX_SIGNATURE_WINDOW_DAYS,
};
use intake_domain::TransactionFormData;
use intake_storage_json::{load_draft, save_draft};
use serde_json::json;
use tracing::info;

use super::prompts::{script_mode, Prompter, ScriptPrompter, TerminalPrompter};
use super::wizard::Wizard;
use super::{output, render, AppContext, ConfigAction, PreviewArgs, WizardArgs};
use crate::errors::CliError;
use crate::gateway::HttpGateway;

pub fn wizard(ctx: &AppContext, args: WizardArgs) -> Result<ExitCode, CliError> {
    let data = match &args.from {
        Some(path) => load_draft(path)?,
        None => TransactionFormData::new(),
    };
    let out = args.out.unwrap_or_else(|| ctx.default_draft_path());
    let mut store = FormStore::from_data(data, ctx.engine());
    let addresses = ctx.address_book()?;

    let outcome = if script_mode() {
        let mut prompter = ScriptPrompter::new(BufReader::new(io::stdin()));
        drive(&mut prompter, &mut store, &addresses)
    } else {
        let mut prompter = TerminalPrompter::new();
        drive(&mut prompter, &mut store, &addresses)
    };

    // Whatever was entered is kept, even when the wizard stops early.
    save_draft(&out, store.data())?;
    outcome?;

    output::section("Summary");
    for line in render::summary_lines(store.data()) {
        output::info(line);
    }
    output::success(format!("Draft saved to {}", out.display()));
    Ok(ExitCode::SUCCESS)
}

fn drive<P: Prompter>(
    prompter: &mut P,
    store: &mut FormStore,
    addresses: &AddressBook,
) -> Result<(), CliError> {
    Wizard::new(prompter).with_address_book(addresses).run(store)
}

pub fn validate(ctx: &AppContext, draft: &Path) -> Result<ExitCode, CliError> {
    let data = load_draft(draft)?;
    let engine = ctx.engine();
    let report = render::step_report(&engine, &data, engine.today());
    if report.is_empty() {
        output::success("Draft is complete and ready to submit");
        return Ok(ExitCode::SUCCESS);
    }
    for line in report {
        if line.starts_with("Step ") {
            output::warning(line);
        } else {
            output::error(line);
        }
    }
    Ok(ExitCode::from(1))
}

/// Prints the payloads as JSON on stdout, nothing else.
pub fn preview(ctx: &AppContext, args: PreviewArgs) -> Result<ExitCode, CliError> {
    let data = load_draft(&args.draft)?;
    let submitted_on = match args.date.as_deref() {
        Some(raw) => parse_date(raw).ok_or_else(|| {
            CliError::InvalidArguments(format!("`{}` is not a YYYY-MM-DD date", raw))
        })?,
        None => ctx.engine().today(),
    };
    let bundle = SubmissionAdapter::prepare(&data, &ctx.settings(), submitted_on)?;
    let cover_sheet = SubmissionAdapter::cover_sheet_request(
        &bundle.table_id,
        "<record id>",
        bundle.role,
    );
    let payload = json!({
        "record": {
            "fields": bundle.record.fields,
            "typecast": true,
        },
        "coverSheet": cover_sheet,
        "email": bundle.email,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(ExitCode::SUCCESS)
}

pub fn submit(ctx: &AppContext, draft: &Path) -> Result<ExitCode, CliError> {
    if !ctx.config.has_airtable_target() {
        return Err(CliError::InvalidArguments(
            "no Airtable base/table configured; run `config set-airtable BASE TABLE`".into(),
        ));
    }
    let data = load_draft(draft)?;
    let mut store = FormStore::from_data(data, ctx.engine());
    let gateway = HttpGateway::from_config(&ctx.config);

    let last = store.state().total_steps;
    let today = store.engine().today();
    let settings = ctx.settings();
    let result = store
        .go_to_step(last)
        .and_then(|()| store.submit(&gateway, &settings, today));

    match result {
        Ok(receipt) => {
            output::success("Transaction submitted");
            for line in render::receipt_lines(&receipt) {
                output::info(line);
            }
            for warning in &receipt.warnings {
                output::warning(warning);
            }
            info!("submitted {} as {}", draft.display(), receipt.record_id);
            Ok(ExitCode::SUCCESS)
        }
        Err(CoreError::StepBlocked { errors, .. }) | Err(CoreError::IncompleteForm { errors, .. }) => {
            report_incomplete(&errors);
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err.into()),
    }
}

fn report_incomplete(errors: &ValidationResult) {
    output::error("The draft is incomplete:");
    render::print_field_errors(errors);
}

pub fn config(ctx: &mut AppContext, action: ConfigAction) -> Result<ExitCode, CliError> {
    let updated = match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            return Ok(ExitCode::SUCCESS);
        }
        ConfigAction::SetWindow { days } => {
            if !(1..=MAX_SIGNATURE_WINDOW_DAYS).contains(&days) {
                return Err(CliError::InvalidArguments(format!(
                    "the signature window must be between 1 and {} days",
                    MAX_SIGNATURE_WINDOW_DAYS
                )));
            }
            ctx.manager.update(|config| config.signature_window_days = days)?
        }
        ConfigAction::SetApi { url } => {
            let url = url.trim().to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CliError::InvalidArguments(format!(
                    "`{}` is not an http(s) URL",
                    url
                )));
            }
            ctx.manager.update(|config| config.api_base_url = url)?
        }
        ConfigAction::SetAirtable { base_id, table_id } => ctx.manager.update(|config| {
            config.airtable_base_id = base_id.trim().to_string();
            config.airtable_table_id = table_id.trim().to_string();
        })?,
        ConfigAction::SetRecipients { emails } => {
            if let Some(bad) = emails.iter().find(|email| !is_valid_email(email)) {
                return Err(CliError::InvalidArguments(format!(
                    "`{}` is not a valid email address",
                    bad
                )));
            }
            let emails: Vec<String> = emails.iter().map(|email| email.trim().to_string()).collect();
            ctx.manager
                .update(|config| config.notification_recipients = emails)?
        }
    };
    ctx.config = updated;
    output::success(format!("Saved {}", ctx.manager.config_path().display()));
    Ok(ExitCode::SUCCESS)
}
