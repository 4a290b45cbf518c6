//! Local `harperdb` executable
//!
//! Lifecycle commands are run through the executable with the resolved
//! instance appended as `target=<url>` and the credentials passed in the
//! child's environment.

use crate::config::{ENV_VAR_PASSWORD, ENV_VAR_USERNAME, ResolvedConfig};
use crate::error::{HdbError, HdbResult};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Executable invoked for lifecycle commands
pub const HDB_EXECUTABLE: &str = "harperdb";

/// Environment variable carrying the instance URL to the child
pub const ENV_VAR_TARGET: &str = "HARPERDB_TARGET";

/// Commands handled by the executable rather than the operations API
pub const EXECUTABLE_COMMANDS: &[&str] = &["deploy_component", "restart", "run", "dev"];

/// Commands that run without the pre-command confirmation
pub const BYPASS_CONFIRMATION: &[&str] = &["init", "run", "dev"];

/// Commands followed by an instance restart
pub const AUTO_RESTART_COMMANDS: &[&str] = &["deploy_component", "drop", "reset"];

/// Shorthand command names
pub const COMMAND_ALIASES: &[(&str, &str)] = &[("deploy", "deploy_component")];

/// Resolve aliases to the command name the instance knows
pub fn canonical_command(command: &str) -> &str {
    COMMAND_ALIASES
        .iter()
        .find(|(alias, _)| *alias == command)
        .map(|(_, target)| *target)
        .unwrap_or(command)
}

pub fn is_executable_command(command: &str) -> bool {
    EXECUTABLE_COMMANDS.contains(&canonical_command(command))
}

pub fn needs_confirmation(command: &str) -> bool {
    !BYPASS_CONFIRMATION.contains(&canonical_command(command))
}

pub fn restarts_automatically(command: &str) -> bool {
    AUTO_RESTART_COMMANDS.contains(&canonical_command(command))
}

/// Captured result of a successful run
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub elapsed: Duration,
}

/// Runs lifecycle commands through the executable
#[derive(Debug, Clone)]
pub struct ExecutableRunner {
    program: String,
}

impl Default for ExecutableRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutableRunner {
    pub fn new() -> Self {
        Self {
            program: HDB_EXECUTABLE.to_string(),
        }
    }

    /// Use a different program, e.g. a wrapper script
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument list: the command, its arguments, then `target=<url>`
    pub fn build_args(command: &str, args: &[String], target: &ResolvedConfig) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push(canonical_command(command).to_string());
        argv.extend(args.iter().cloned());
        argv.push(format!("target={}", target.instance_url));
        argv
    }

    /// Run `command` against `target`, streaming output line by line.
    ///
    /// A non-zero exit is a [`HdbError::Process`] carrying stderr.
    #[instrument(skip(self, args, target), fields(program = %self.program))]
    pub async fn run(
        &self,
        command: &str,
        args: &[String],
        target: &ResolvedConfig,
    ) -> HdbResult<ExecutionOutput> {
        let argv = Self::build_args(command, args, target);
        info!("Running command: {} {}", self.program, argv.join(" "));

        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&argv)
            .env(ENV_VAR_USERNAME, &target.username)
            .env(ENV_VAR_PASSWORD, target.password())
            .env(ENV_VAR_TARGET, &target.instance_url)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                HdbError::process(&self.program, format!("Failed to start process: {e}"), None)
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HdbError::process(&self.program, "stdout not captured", None))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| HdbError::process(&self.program, "stderr not captured", None))?;

        let (stdout, stderr) = tokio::try_join!(
            forward_lines(stdout, |line| println!("{line}")),
            forward_lines(stderr, |line| eprintln!("{line}")),
        )
        .map_err(|e| HdbError::process(&self.program, format!("Failed to read output: {e}"), None))?;

        let status = child
            .wait()
            .await
            .map_err(|e| HdbError::process(&self.program, e.to_string(), None))?;
        let elapsed = start.elapsed();
        debug!("{} exited with {} after {:?}", self.program, status, elapsed);

        if !status.success() {
            let mut message = match status.code() {
                Some(code) => format!("Process exited with code {code}"),
                None => "Process terminated by signal".to_string(),
            };
            if !stderr.trim().is_empty() {
                message.push('\n');
                message.push_str(stderr.trim_end());
            }
            return Err(HdbError::process(&self.program, message, status.code()));
        }

        Ok(ExecutionOutput { stdout, elapsed })
    }
}

async fn forward_lines<R>(reader: R, emit: impl Fn(&str)) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut captured = String::new();
    while let Some(line) = lines.next_line().await? {
        emit(&line);
        captured.push_str(&line);
        captured.push('\n');
    }
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetSource;

    fn target() -> ResolvedConfig {
        ResolvedConfig::new(
            "DEV",
            "https://node:9925",
            "admin",
            "pw",
            TargetSource::CliFlags,
        )
    }

    #[test]
    fn test_command_tables() {
        assert_eq!(canonical_command("deploy"), "deploy_component");
        assert_eq!(canonical_command("restart"), "restart");
        assert!(is_executable_command("deploy"));
        assert!(is_executable_command("dev"));
        assert!(!is_executable_command("describe_all"));
        assert!(!needs_confirmation("run"));
        assert!(!needs_confirmation("init"));
        assert!(needs_confirmation("deploy"));
        assert!(restarts_automatically("deploy"));
        assert!(restarts_automatically("drop"));
        assert!(!restarts_automatically("restart"));
    }

    #[test]
    fn test_target_is_appended() {
        let argv = ExecutableRunner::build_args("deploy", &["project=app".to_string()], &target());
        assert_eq!(
            argv,
            vec!["deploy_component", "project=app", "target=https://node:9925"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = ExecutableRunner::with_program("echo");
        let output = runner.run("run", &["hello".to_string()], &target()).await.unwrap();
        assert_eq!(output.stdout, "run hello target=https://node:9925\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_child_sees_credentials() {
        let runner = ExecutableRunner::with_program("sh");
        let output = runner
            .run(
                "-c",
                &["echo \"$CLI_TARGET_USERNAME@$HARPERDB_TARGET\"".to_string()],
                &target(),
            )
            .await
            .unwrap();
        assert_eq!(output.stdout, "admin@https://node:9925\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_process_error() {
        let runner = ExecutableRunner::with_program("false");
        let err = runner.run("run", &[], &target()).await.unwrap_err();
        assert!(matches!(err, HdbError::Process { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_process_error() {
        let runner = ExecutableRunner::with_program("hdb-definitely-not-installed");
        let err = runner.run("run", &[], &target()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to start process"));
    }
}
