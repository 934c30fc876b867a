mod onboarding;
mod system;

use crate::cli::interaction::FormInteraction;
use crate::cli::output;
use crate::config::IntakeConfig;
use crate::errors::FormError;
use crate::intake::InMemoryBackend;

pub use onboarding::onboard;

/// State shared by every command in one CLI run.
pub struct Session {
    pub config: IntakeConfig,
    pub backend: InMemoryBackend,
    pub interaction: Box<dyn FormInteraction>,
}

impl Session {
    pub fn new(config: IntakeConfig, interaction: Box<dyn FormInteraction>) -> Self {
        Self {
            config,
            backend: InMemoryBackend::new(),
            interaction,
        }
    }
}

pub type CommandHandler = fn(&mut Session, &[String]) -> Result<(), FormError>;

#[derive(Clone)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub const DEFAULT_COMMAND: &str = "onboard";

pub fn all_commands() -> Vec<CommandEntry> {
    let mut commands = vec![CommandEntry::new(
        "onboard",
        "Sign up, register and book a first appointment",
        "onboard",
        onboarding::cmd_onboard,
    )];
    commands.extend(system::definitions());
    commands
}

/// Runs the command named by the first argument, `onboard` when none is given.
pub fn dispatch(session: &mut Session, args: &[String]) -> Result<(), FormError> {
    let (name, rest) = match args.split_first() {
        Some((name, rest)) => (name.to_ascii_lowercase(), rest),
        None => (DEFAULT_COMMAND.to_string(), args),
    };
    let commands = all_commands();
    match commands.iter().find(|entry| entry.name == name) {
        Some(entry) => (entry.handler)(session, rest),
        None => {
            if let Some(suggestion) = suggest(&commands, &name) {
                output::warning(format!("Did you mean `{suggestion}`?"));
            }
            Err(FormError::Input(format!("unknown command `{name}`")))
        }
    }
}

fn suggest(commands: &[CommandEntry], input: &str) -> Option<&'static str> {
    commands
        .iter()
        .map(|entry| (entry.name, strsim::jaro_winkler(entry.name, input)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_typos_get_a_suggestion() {
        let commands = all_commands();
        assert_eq!(suggest(&commands, "onbaord"), Some("onboard"));
        assert_eq!(suggest(&commands, "zzz"), None);
    }
}
