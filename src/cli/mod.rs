//! Command-line front end: argument parsing, shared context and dispatch.

pub mod commands;
pub mod output;
pub mod prompts;
pub mod render;
pub mod wizard;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use intake_config::{Config, ConfigManager};
use intake_core::{
    AddressBook, SubmissionSettings, SystemClock, ValidationEngine, ValidationRules,
    MAX_SIGNATURE_WINDOW_DAYS,
};
use intake_storage_json::JsonAddressCache;

use crate::errors::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "closing_intake_cli",
    version,
    about = "Transaction intake for real-estate closings",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk through the intake steps and save a draft
    Wizard(WizardArgs),
    /// Check a saved draft against every visible step
    Validate(DraftArgs),
    /// Print the record and email that a submission would send
    Preview(PreviewArgs),
    /// Deliver a complete draft to the record store, cover sheet and email services
    Submit(DraftArgs),
    /// Show or change deployment settings
    #[command(subcommand)]
    Config(ConfigAction),
}

#[derive(Parser, Debug)]
pub struct WizardArgs {
    /// Where to write the draft (defaults to draft.json in the data directory)
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Resume from an existing draft
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DraftArgs {
    /// Draft file written by the wizard
    #[arg(value_name = "FILE")]
    pub draft: PathBuf,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    #[arg(value_name = "FILE")]
    pub draft: PathBuf,

    /// Submission date stamped on the record (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the active settings as JSON
    Show,
    /// Days ahead of today a signature may be dated
    SetWindow {
        #[arg(value_name = "DAYS")]
        days: u32,
    },
    /// Host of the cover-sheet and email endpoints
    SetApi {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Airtable base and table that receive transaction records
    SetAirtable {
        #[arg(value_name = "BASE")]
        base_id: String,
        #[arg(value_name = "TABLE")]
        table_id: String,
    },
    /// Replace the notification recipients
    SetRecipients {
        #[arg(value_name = "EMAIL")]
        emails: Vec<String>,
    },
}

/// Loaded settings plus the services built from them.
pub struct AppContext {
    pub manager: ConfigManager,
    pub config: Config,
}

impl AppContext {
    pub fn load() -> Result<Self, CliError> {
        let manager = ConfigManager::from_env()?;
        let config = manager.load()?;
        Ok(Self { manager, config })
    }

    pub fn engine(&self) -> ValidationEngine {
        // Hand-edited config files are not range-checked on load.
        let rules = ValidationRules {
            signature_window_days: self
                .config
                .signature_window_days
                .min(MAX_SIGNATURE_WINDOW_DAYS),
        };
        ValidationEngine::new(rules, Arc::new(SystemClock))
    }

    pub fn settings(&self) -> SubmissionSettings {
        SubmissionSettings {
            table_id: self.config.airtable_table_id.clone(),
            recipients: self.config.notification_recipients.clone(),
        }
    }

    pub fn address_book(&self) -> Result<AddressBook, CliError> {
        let cache = JsonAddressCache::in_dir(self.manager.base_dir())?;
        Ok(AddressBook::new(Arc::new(cache)))
    }

    pub fn default_draft_path(&self) -> PathBuf {
        self.manager.base_dir().join("draft.json")
    }
}

/// Switches output to plain mode for `--plain` and script runs. Call before
/// `init()` so log lines follow the same preference.
pub fn apply_output_preferences(cli: &Cli) {
    if cli.plain || prompts::script_mode() {
        output::set_preferences(output::OutputPreferences { plain: true });
    }
}

pub fn run(cli: Cli) -> Result<ExitCode, CliError> {
    apply_output_preferences(&cli);
    let mut ctx = AppContext::load()?;
    match cli.command {
        Commands::Wizard(args) => commands::wizard(&ctx, args),
        Commands::Validate(args) => commands::validate(&ctx, &args.draft),
        Commands::Preview(args) => commands::preview(&ctx, args),
        Commands::Submit(args) => commands::submit(&ctx, &args.draft),
        Commands::Config(action) => commands::config(&mut ctx, action),
    }
}
