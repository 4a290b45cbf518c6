//! Command routing logic for CLI
//!
//! `init` and `config` work on the project files directly. Every other
//! command goes through the same preflight: make sure the project is
//! initialized, migrate legacy credentials, resolve the target, show it and
//! (for most commands) give the operator a moment to back out.

use crate::args::{Cli, Commands, ComponentsAction, GlobalArgs};
use crate::commands;
use crate::console::CliConsole;
use crate::prompt::TerminalPrompter;
use hdb_core::config::{DEFAULT_CONFIRM_TIMEOUT, MigrationReport};
use hdb_core::exec::{ExecutableRunner, canonical_command, needs_confirmation, restarts_automatically};
use hdb_core::{
    CliOverrides, EnvironmentResolver, HdbError, HdbResult, Migrator, ProjectPaths,
    Prompter, ResolvedConfig, RuntimeOverrides,
};
use std::io::IsTerminal;
use tracing::debug;

/// Everything a command needs besides its own arguments
pub struct Session {
    pub paths: ProjectPaths,
    pub console: CliConsole,
    pub prompter: TerminalPrompter,
}

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> HdbResult<()> {
    let Cli {
        global,
        verbose,
        command,
    } = cli;

    let paths = match &global.project_dir {
        Some(dir) => ProjectPaths::new(dir),
        None => ProjectPaths::current()?,
    };
    debug!("Project directory: {}", paths.project_dir().display());

    let session = Session {
        paths,
        console: CliConsole::new(verbose),
        prompter: TerminalPrompter::new(),
    };

    match command {
        Commands::Init => commands::init::run(&session).await,
        Commands::Config { action } => commands::config::run(&session, action, &global).await,

        Commands::Api {
            operation,
            output,
            params,
        } => {
            let (params, global) = split_global_flags(params, global);
            let line = command_line("api", std::iter::once(&operation).chain(&params));
            let target = prepare_target(&session, &global, &operation, &line).await?;
            commands::api::run(&session, &target, &operation, &params, output.as_deref()).await?;
            finish(&session, &target, &operation, global.restart).await
        }

        Commands::Components { action } => {
            let name = match action {
                ComponentsAction::List => "list",
                ComponentsAction::Drop => "drop",
                ComponentsAction::Reset => "reset",
            };
            let line = format!("components {name}");
            let target = prepare_target(&session, &global, name, &line).await?;
            let changed = commands::components::run(&session, &target, action).await?;
            if changed {
                finish(&session, &target, name, global.restart).await
            } else {
                Ok(())
            }
        }

        Commands::Logs(args) => {
            let target = prepare_target(&session, &global, "logs", "logs").await?;
            commands::logs::run(&session, &target, &args).await
        }

        Commands::External(argv) => {
            let (argv, global) = split_global_flags(argv, global);
            let Some((command, args)) = argv.split_first() else {
                return Err(HdbError::validation("command", "missing command name"));
            };
            let command = canonical_command(command).to_string();
            let line = command_line(&command, args);
            let target = prepare_target(&session, &global, &command, &line).await?;
            commands::external::run(&session, &target, &command, args).await?;
            finish(&session, &target, &command, global.restart).await
        }
    }
}

/// Initialization check, migration, resolution and the pre-command
/// confirmation
async fn prepare_target(
    session: &Session,
    global: &GlobalArgs,
    command: &str,
    line: &str,
) -> HdbResult<ResolvedConfig> {
    if !session.paths.is_initialized() {
        if !std::io::stdin().is_terminal() {
            return Err(HdbError::NotInitialized);
        }
        let initialize = session.prompter.confirm(
            "This project has not been initialized for 'hdb' commands. Initialize now?",
            true,
        )?;
        if !initialize {
            return Err(HdbError::Cancelled);
        }
        commands::init::run(session).await?;
    }

    let credentials = session.paths.credential_store();
    let selection = session.paths.selection_store();
    let report = Migrator::new(&credentials, &selection).run()?;
    report_migration(&session.console, &report);

    let flags = CliOverrides {
        env: global.env.clone(),
        instance: global.instance.clone(),
    };
    let target = EnvironmentResolver::new(&selection, &session.prompter)
        .with_runtime_overrides(RuntimeOverrides::from_env())
        .with_cli_overrides(flags)
        .resolve()
        .await?;

    session.console.print_target_summary(&target, line);

    if needs_confirmation(command)
        && !session
            .prompter
            .auto_confirm("Continue with this configuration?", DEFAULT_CONFIRM_TIMEOUT)
            .await?
    {
        return Err(HdbError::Cancelled);
    }

    Ok(target)
}

pub(crate) fn report_migration(console: &CliConsole, report: &MigrationReport) {
    for moved in &report.migrated {
        if moved.renamed() {
            console.warn(&format!(
                "Environment {} already existed; legacy entry imported as {}",
                moved.source, moved.target
            ));
        } else {
            console.info(&format!("Imported legacy environment {}", moved.source));
        }
    }
    for name in &report.skipped {
        console.warn(&format!(
            "Legacy environment {name} could not be imported; fix its entries in .env.harperdb"
        ));
    }
}

/// Restart the instance when asked to or when `command` requires it
async fn finish(
    session: &Session,
    target: &ResolvedConfig,
    command: &str,
    restart_requested: bool,
) -> HdbResult<()> {
    if !(restart_requested || restarts_automatically(command)) {
        return Ok(());
    }
    session.console.info("Restarting instance");
    let output = ExecutableRunner::new().run("restart", &[], target).await?;
    session.console.success(&format!(
        "Restart completed in {:.2} seconds",
        output.elapsed.as_secs_f64()
    ));
    Ok(())
}

fn command_line<'a>(command: &'a str, args: impl IntoIterator<Item = &'a String>) -> String {
    std::iter::once(command)
        .chain(args.into_iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull `--env`, `--instance` and `--restart` out of pass-through
/// arguments, which clap hands over untouched
pub fn split_global_flags(args: Vec<String>, mut global: GlobalArgs) -> (Vec<String>, GlobalArgs) {
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--restart" {
            global.restart = true;
            continue;
        }

        let mut matched = false;
        for (flag, slot) in [
            ("--env", &mut global.env),
            ("--instance", &mut global.instance),
        ] {
            if let Some(value) = arg.strip_prefix(flag).and_then(|r| r.strip_prefix('=')) {
                *slot = Some(value.to_string());
                matched = true;
                break;
            }
            if arg == flag {
                if let Some(value) = iter.next() {
                    *slot = Some(value);
                }
                matched = true;
                break;
            }
        }
        if !matched {
            rest.push(arg);
        }
    }

    (rest, global)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_global_flags() {
        let (rest, global) = split_global_flags(
            args(&["restart", "--env=dev", "--instance", "node1", "--restart", "--x=1"]),
            GlobalArgs::default(),
        );
        assert_eq!(rest, vec!["restart", "--x=1"]);
        assert_eq!(global.env.as_deref(), Some("dev"));
        assert_eq!(global.instance.as_deref(), Some("node1"));
        assert!(global.restart);
    }

    #[test]
    fn test_split_keeps_existing_flags() {
        let existing = GlobalArgs {
            env: Some("PROD".into()),
            ..Default::default()
        };
        let (rest, global) = split_global_flags(args(&["--environment=x"]), existing);
        assert_eq!(rest, vec!["--environment=x"]);
        assert_eq!(global.env.as_deref(), Some("PROD"));
        assert!(!global.restart);
    }

    #[test]
    fn test_command_line() {
        let params = args(&["--a=1", "b"]);
        assert_eq!(command_line("api", &params), "api --a=1 b");
        assert_eq!(command_line("restart", &Vec::new()), "restart");
    }
}
