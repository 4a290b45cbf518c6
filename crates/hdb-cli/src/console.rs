//! CLI console utilities

use colored::*;
use hdb_core::ResolvedConfig;

/// Console for formatted operator output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{} {}", "ℹ".blue().bold(), message);
    }

    /// Print an info message only with --verbose
    pub fn detail(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "·".dimmed(), message.dimmed());
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.chars().count()).dimmed());
    }

    /// Print the target a command is about to run against
    pub fn print_target_summary(&self, target: &ResolvedConfig, command: &str) {
        println!();
        println!("{}", "Configuration".bold());
        for line in summary_lines(target, command, self.verbose) {
            println!("{line}");
        }
        println!();
    }
}

fn summary_lines(target: &ResolvedConfig, command: &str, verbose: bool) -> Vec<String> {
    let mut lines = vec![
        format!("├─ {} {}", "Environment:".dimmed(), target.environment.cyan()),
        format!("│  └─ {} {}", "Instance:".dimmed(), target.instance_url.cyan()),
        format!("├─ {} {}", "Username:".dimmed(), target.username),
        format!("├─ {} {}", "Password:".dimmed(), target.masked_password()),
    ];
    if verbose {
        lines.push(format!("├─ {} {}", "Source:".dimmed(), target.source));
    }
    lines.push(format!("└─ {} {}", "Command:".dimmed(), command.bold()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdb_core::TargetSource;

    #[test]
    fn test_summary_never_shows_password() {
        colored::control::set_override(false);
        let target = ResolvedConfig::new(
            "DEV",
            "https://a:9925",
            "admin",
            "hunter2",
            TargetSource::PersistedDefault,
        );

        let lines = summary_lines(&target, "deploy_component", true);

        assert!(lines.iter().all(|l| !l.contains("hunter2")));
        assert!(lines.iter().any(|l| l.contains("https://a:9925")));
        assert!(lines.iter().any(|l| l.contains("saved default")));
        assert!(lines.last().unwrap().contains("deploy_component"));
    }

    #[test]
    fn test_source_only_in_verbose_mode() {
        colored::control::set_override(false);
        let target = ResolvedConfig::new("DEV", "https://a:9925", "admin", "", TargetSource::CliFlags);
        let lines = summary_lines(&target, "restart", false);
        assert!(lines.iter().all(|l| !l.contains("command-line flags")));
        assert!(lines.iter().any(|l| l.contains("(empty)")));
    }
}
