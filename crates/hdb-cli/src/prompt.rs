//! Terminal implementation of the prompt capability

use crate::auto_confirm;
use async_trait::async_trait;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};
use hdb_core::{HdbError, HdbResult, Prompter};
use std::io::ErrorKind;
use std::time::Duration;

/// Prompts on the controlling terminal with dialoguer widgets
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

#[async_trait]
impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> HdbResult<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map_err(widget_error)?
            .ok_or(HdbError::Cancelled)
    }

    async fn auto_confirm(&self, prompt: &str, timeout: Duration) -> HdbResult<bool> {
        auto_confirm::auto_confirm(prompt, timeout).await
    }

    fn select(&self, prompt: &str, items: &[String]) -> HdbResult<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(widget_error)?
            .ok_or(HdbError::Cancelled)
    }

    fn multi_select(&self, prompt: &str, items: &[String]) -> HdbResult<Vec<usize>> {
        MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .interact_opt()
            .map_err(widget_error)?
            .ok_or(HdbError::Cancelled)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> HdbResult<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(widget_error)
    }

    fn password(&self, prompt: &str) -> HdbResult<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(widget_error)
    }

    fn report_invalid(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }
}

fn widget_error(error: dialoguer::Error) -> HdbError {
    match error {
        dialoguer::Error::IO(e) if e.kind() == ErrorKind::Interrupted => HdbError::Interrupted,
        dialoguer::Error::IO(e) => HdbError::io(format!("Prompt failed: {e}")),
    }
}
