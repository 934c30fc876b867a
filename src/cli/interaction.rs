//! How the runner talks to the person filling in a form.

use std::io::BufRead;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::cli::output;
use crate::errors::FormError;
use crate::form::FormDefinition;

/// Answer to a single field prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Raw text to pass to the widget.
    Value(String),
    /// Leave the current value untouched.
    Keep,
    /// Abandon the form.
    Cancel,
}

/// Everything shown for one field prompt.
#[derive(Debug, Clone)]
pub struct FieldPrompt<'a> {
    pub name: &'a str,
    pub title: &'a str,
    /// Widget name, as reported by the dispatcher.
    pub widget: &'static str,
    pub lines: Vec<String>,
    pub error: Option<&'a str>,
}

pub trait FormInteraction {
    fn prompt(&mut self, prompt: &FieldPrompt<'_>) -> Result<Answer, FormError>;

    /// Asked once every field has an answer.
    fn confirm_submit(&mut self, definition: &FormDefinition) -> Result<bool, FormError>;

    /// Asked after the service rejected a submit.
    fn retry(&mut self) -> Result<bool, FormError>;
}

fn show(prompt: &FieldPrompt<'_>) {
    for line in &prompt.lines {
        output::info(line);
    }
    if let Some(error) = prompt.error {
        output::field_error(error);
    }
}

/// Interactive prompts through `dialoguer`.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl FormInteraction for TerminalInteraction {
    fn prompt(&mut self, prompt: &FieldPrompt<'_>) -> Result<Answer, FormError> {
        show(prompt);
        if prompt.widget == "checkbox" {
            let checked = Confirm::with_theme(&self.theme)
                .with_prompt(prompt.title)
                .default(false)
                .interact()?;
            return Ok(Answer::Value(if checked { "yes" } else { "no" }.into()));
        }
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(format!("{} (Enter keeps current)", prompt.title))
            .allow_empty(true)
            .interact_text()?;
        Ok(if raw.trim().is_empty() {
            Answer::Keep
        } else {
            Answer::Value(raw)
        })
    }

    fn confirm_submit(&mut self, definition: &FormDefinition) -> Result<bool, FormError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(format!("{}?", definition.submit_label))
            .default(true)
            .interact()?)
    }

    fn retry(&mut self) -> Result<bool, FormError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Try again?")
            .default(true)
            .interact()?)
    }
}

/// Reads one line per prompt; end of input cancels the form.
pub struct ScriptedInteraction<R> {
    input: R,
}

impl<R: BufRead> ScriptedInteraction<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn next_line(&mut self) -> Result<Option<String>, FormError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead> FormInteraction for ScriptedInteraction<R> {
    fn prompt(&mut self, prompt: &FieldPrompt<'_>) -> Result<Answer, FormError> {
        show(prompt);
        output::info(format!("> {}", prompt.title));
        Ok(match self.next_line()? {
            None => Answer::Cancel,
            Some(line) if line.trim().is_empty() => Answer::Keep,
            Some(line) => Answer::Value(line),
        })
    }

    fn confirm_submit(&mut self, definition: &FormDefinition) -> Result<bool, FormError> {
        output::info(format!("> {}", definition.submit_label));
        Ok(true)
    }

    fn retry(&mut self) -> Result<bool, FormError> {
        output::info("> Try again? [y/N]");
        Ok(self
            .next_line()?
            .is_some_and(|line| matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")))
    }
}
