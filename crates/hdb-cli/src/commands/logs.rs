//! `hdb logs`
//!
//! A single read prints the lookback window once. With `--tail` the window
//! is re-read every second and only entries not printed before are shown;
//! failures while tailing are reported and polling continues.

use crate::args::LogsArgs;
use crate::console::CliConsole;
use crate::router::Session;
use chrono::Utc;
use colored::*;
use hdb_core::api::logs::{
    LogDeduper, LogEntry, LogFilter, LogQuery, MAX_LOOKBACK_MINUTES, read_log, select_entries,
};
use hdb_core::api::Operations;
use hdb_core::{ApiClient, HdbResult, ResolvedConfig};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(session: &Session, target: &ResolvedConfig, args: &LogsArgs) -> HdbResult<()> {
    let client = ApiClient::new(target)?;
    let filter = args.filter.as_deref().map(LogFilter::parse).transpose()?;
    let query = LogQuery {
        lookback_minutes: args.lookback.min(MAX_LOOKBACK_MINUTES),
        level: args.level.clone(),
    };
    let mut deduper = LogDeduper::new();

    if !args.tail {
        let console = &session.console;
        return fetch(&client, &query, filter.as_ref(), &mut deduper, console, true).await;
    }

    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut first = true;
    loop {
        ticker.tick().await;
        let result = fetch(
            &client,
            &query,
            filter.as_ref(),
            &mut deduper,
            &session.console,
            first,
        )
        .await;
        if let Err(e) = result {
            session
                .console
                .error(&format!("Error occurred while retrieving logs: {e}"));
        }
        first = false;
    }
}

async fn fetch(
    api: &dyn Operations,
    query: &LogQuery,
    filter: Option<&LogFilter>,
    deduper: &mut LogDeduper,
    console: &CliConsole,
    announce: bool,
) -> HdbResult<()> {
    let now = Utc::now();
    let entries = read_log(api, query, now).await?;
    let shown = select_entries(entries, deduper, filter);

    if announce {
        let label = match filter {
            Some(filter) => format!("Logs matching {}", filter.pattern()),
            None => "All logs".to_string(),
        };
        console.info(&format!("{label}: {}", shown.len()));
    }
    for entry in &shown {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &LogEntry) {
    println!("{}", entry.timestamp.bold());
    for (key, value) in entry.fields() {
        println!("  {}: {}", key.dimmed(), value);
    }
    println!();
}
