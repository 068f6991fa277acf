//! Prompt sources for the wizard: interactive terminal prompts, or
//! line-by-line answers read from stdin in script mode.

use std::io::BufRead;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::errors::CliError;

/// Environment variable switching the wizard to line-based script input.
pub const SCRIPT_ENV: &str = "CLOSING_INTAKE_SCRIPT";

pub fn script_mode() -> bool {
    std::env::var(SCRIPT_ENV)
        .map(|value| !value.is_empty() && value != "0")
        .unwrap_or(false)
}

pub trait Prompter {
    /// Free-form text; `current` is offered as the starting value.
    fn text(&mut self, label: &str, current: &str) -> Result<String, CliError>;

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool, CliError>;

    /// Returns the index of the chosen option.
    fn select(
        &mut self,
        label: &str,
        options: &[&str],
        default: Option<usize>,
    ) -> Result<usize, CliError>;
}

pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, label: &str, current: &str) -> Result<String, CliError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .map_err(CliError::from)
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool, CliError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .interact()
            .map_err(CliError::from)
    }

    fn select(
        &mut self,
        label: &str,
        options: &[&str],
        default: Option<usize>,
    ) -> Result<usize, CliError> {
        Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(options)
            .default(default.unwrap_or(0))
            .interact()
            .map_err(CliError::from)
    }
}

/// Reads one answer per line. A blank line keeps the current or default value.
pub struct ScriptPrompter<R> {
    input: R,
}

impl<R: BufRead> ScriptPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn next_line(&mut self, label: &str) -> Result<String, CliError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::InputClosed);
        }
        let answer = line.trim().to_string();
        println!("{}: {}", label, answer);
        Ok(answer)
    }
}

impl<R: BufRead> Prompter for ScriptPrompter<R> {
    fn text(&mut self, label: &str, current: &str) -> Result<String, CliError> {
        let answer = self.next_line(label)?;
        if answer.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(answer)
        }
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool, CliError> {
        let answer = self.next_line(label)?;
        match answer.to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" | "true" => Ok(true),
            "n" | "no" | "false" => Ok(false),
            other => Err(CliError::InvalidArguments(format!(
                "expected yes or no for `{}`, got `{}`",
                label, other
            ))),
        }
    }

    fn select(
        &mut self,
        label: &str,
        options: &[&str],
        default: Option<usize>,
    ) -> Result<usize, CliError> {
        let answer = self.next_line(label)?;
        if answer.is_empty() {
            return default.ok_or_else(|| {
                CliError::InvalidArguments(format!("`{}` needs a choice", label))
            });
        }
        if let Ok(number) = answer.parse::<usize>() {
            if (1..=options.len()).contains(&number) {
                return Ok(number - 1);
            }
        }
        let wanted = normalize(&answer);
        options
            .iter()
            .position(|option| normalize(option) == wanted)
            .ok_or_else(|| {
                CliError::InvalidArguments(format!(
                    "`{}` must be one of: {}",
                    label,
                    options.join(", ")
                ))
            })
    }
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}
