use crate::cli::commands::{all_commands, CommandEntry, Session};
use crate::cli::output;
use crate::errors::FormError;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("help", "Show available commands", "help [command]", cmd_help),
    ]
}

fn cmd_version(session: &mut Session, _args: &[String]) -> Result<(), FormError> {
    let meta = build_info();
    output::section(format!("{} intake forms {}", session.config.brand, meta.version));
    output::info(format!("  Build hash : {}", meta.hash));
    output::info(format!("  Built at   : {}", meta.built_at));
    output::info(format!("  Profile    : {}", meta.profile));
    Ok(())
}

fn cmd_help(_session: &mut Session, args: &[String]) -> Result<(), FormError> {
    let commands = all_commands();
    if let Some(name) = args.first() {
        let entry = commands
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| FormError::Input(format!("unknown command `{name}`")))?;
        output::section(format!("Help: {}", entry.name));
        output::info(format!("  Description: {}", entry.description));
        output::info(format!("  Usage: {}", entry.usage));
        return Ok(());
    }

    output::section("Available commands");
    for entry in &commands {
        output::info(format!("  {:<10} {}", entry.name, entry.description));
    }
    output::info("Use `help <command>` for details.");
    Ok(())
}
