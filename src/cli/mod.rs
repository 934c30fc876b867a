//! Terminal front-end for the intake forms.

pub mod commands;
pub mod interaction;
pub mod output;
pub mod runner;

use std::env;
use std::io;

use crate::config::ConfigManager;
use crate::errors::FormError;

pub use commands::Session;
pub use interaction::{Answer, FieldPrompt, FormInteraction, ScriptedInteraction, TerminalInteraction};
pub use runner::{FormRunner, RunOutcome};

/// When set, prompts are answered line by line from stdin.
pub const SCRIPT_ENV: &str = "INTAKE_FORMS_SCRIPT";

pub fn run_cli<I>(args: I) -> Result<(), FormError>
where
    I: IntoIterator<Item = String>,
{
    let scripted = env::var_os(SCRIPT_ENV).is_some();
    let interaction: Box<dyn FormInteraction> = if scripted {
        output::set_preferences(output::OutputPreferences { plain: true });
        Box::new(ScriptedInteraction::new(io::stdin().lock()))
    } else {
        Box::new(TerminalInteraction::new())
    };

    let config = ConfigManager::new()?.load()?;
    let mut session = Session::new(config, interaction);
    let args: Vec<String> = args.into_iter().collect();
    commands::dispatch(&mut session, &args)
}
