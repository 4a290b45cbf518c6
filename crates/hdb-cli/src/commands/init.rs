//! `hdb init`

use crate::console::CliConsole;
use crate::router::{Session, report_migration};
use hdb_core::config::{GitignoreUpdate, InitReport, flows};
use hdb_core::{HdbResult, Migrator, Prompter};

/// Create the configuration files, import legacy credentials and offer to
/// add a first environment
pub async fn run(session: &Session) -> HdbResult<()> {
    let console = &session.console;
    let report = session.paths.initialize_files()?;
    print_report(console, &report);

    let credentials = session.paths.credential_store();
    let selection = session.paths.selection_store();
    let migration = Migrator::new(&credentials, &selection).run()?;
    report_migration(console, &migration);

    let document = selection.read(None)?;
    if !document.is_empty() {
        console.success("Project initialized");
        return Ok(());
    }

    if session
        .prompter
        .confirm("No environments configured yet. Add one now?", true)?
    {
        let added = flows::add_environment(&selection, &session.prompter)?;
        console.success(&format!(
            "Environment {} added with {} instance(s)",
            added.name,
            added.instances.len()
        ));
    } else {
        console.info("Run 'hdb config add-env' when you are ready to add an environment");
    }
    Ok(())
}

fn print_report(console: &CliConsole, report: &InitReport) {
    for line in report_lines(report) {
        console.info(&line);
    }
}

fn report_lines(report: &InitReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.created_credentials {
        lines.push("Created .env.harperdb".to_string());
    }
    if report.created_selection {
        lines.push("Created .hdbconfig.json".to_string());
    }
    match &report.gitignore {
        GitignoreUpdate::Created => lines.push("Created .gitignore".to_string()),
        GitignoreUpdate::Updated(entries) => {
            lines.push(format!("Added {} to .gitignore", entries.join(", ")))
        }
        GitignoreUpdate::Unchanged => {}
    }
    if lines.is_empty() {
        lines.push("Configuration files already present".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lines() {
        let report = InitReport {
            created_credentials: true,
            created_selection: false,
            gitignore: GitignoreUpdate::Updated(vec![".env.harperdb".into(), ".hdbconfig.json".into()]),
        };
        assert_eq!(
            report_lines(&report),
            vec![
                "Created .env.harperdb",
                "Added .env.harperdb, .hdbconfig.json to .gitignore"
            ]
        );
    }

    #[test]
    fn test_report_lines_when_nothing_changed() {
        let report = InitReport {
            created_credentials: false,
            created_selection: false,
            gitignore: GitignoreUpdate::Unchanged,
        };
        assert_eq!(report_lines(&report), vec!["Configuration files already present"]);
    }
}
