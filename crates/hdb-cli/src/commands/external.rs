//! Commands without a dedicated subcommand
//!
//! `deploy_component`, `restart`, `run` and `dev` are handed to the local
//! `harperdb` executable. Any other name is sent to the operations API with
//! the remaining arguments as parameters.

use crate::router::Session;
use hdb_core::api::{Operations, parse_operation_params};
use hdb_core::exec::is_executable_command;
use hdb_core::{ApiClient, ExecutableRunner, HdbResult, ResolvedConfig};

pub async fn run(
    session: &Session,
    target: &ResolvedConfig,
    command: &str,
    args: &[String],
) -> HdbResult<()> {
    let console = &session.console;

    if is_executable_command(command) {
        let output = ExecutableRunner::new().run(command, args, target).await?;
        console.success(&format!(
            "Command completed in {:.2} seconds",
            output.elapsed.as_secs_f64()
        ));
        return Ok(());
    }

    let params = parse_operation_params(args)?;
    let client = ApiClient::new(target)?;
    console.detail(&format!("POST {} operation={}", client.url(), command));
    let result = client.operation(command, params).await?;
    println!("{}", super::api::render(&result)?);
    Ok(())
}
