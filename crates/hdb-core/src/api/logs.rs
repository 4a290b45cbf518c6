//! `read_log` querying, filtering and de-duplication

use super::client::Operations;
use crate::error::{HdbError, HdbResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use colored::Colorize;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Lookback used when none is given, in minutes
pub const DEFAULT_LOOKBACK_MINUTES: u64 = 15;
/// Longest accepted lookback (one year)
pub const MAX_LOOKBACK_MINUTES: u64 = 60 * 24 * 366;

/// One log line as returned by `read_log`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub level: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// `key: value` pairs in display order
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("timestamp".to_string(), self.timestamp.clone())];
        if let Some(level) = &self.level {
            fields.push(("level".to_string(), level.clone()));
        }
        for (key, value) in &self.extra {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            fields.push((key.clone(), rendered));
        }
        fields.push(("message".to_string(), self.message.clone()));
        fields
    }
}

/// Time window and level for one `read_log` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub lookback_minutes: u64,
    pub level: Option<String>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            lookback_minutes: DEFAULT_LOOKBACK_MINUTES,
            level: None,
        }
    }
}

impl LogQuery {
    /// Operation parameters for a window ending at `now`
    pub fn params(&self, now: DateTime<Utc>) -> Map<String, Value> {
        let minutes = self.lookback_minutes.min(MAX_LOOKBACK_MINUTES) as i64;
        let from = now - Duration::minutes(minutes);

        let mut params = Map::new();
        params.insert("from".into(), Value::String(rfc3339(from)));
        params.insert("until".into(), Value::String(rfc3339(now)));
        params.insert("order".into(), Value::String("asc".into()));
        if let Some(level) = &self.level {
            params.insert("level".into(), Value::String(level.clone()));
        }
        params
    }
}

fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Case-insensitive message filter.
///
/// `/expr/` is always a regular expression. Anything else is tried as a
/// regular expression first and falls back to a literal match.
#[derive(Debug, Clone)]
pub struct LogFilter {
    pattern: String,
    regex: Regex,
}

impl LogFilter {
    pub fn parse(pattern: &str) -> HdbResult<Self> {
        let delimited = pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/');
        let regex = if delimited {
            build(&pattern[1..pattern.len() - 1])
                .map_err(|e| HdbError::validation("filter", e.to_string()))?
        } else {
            match build(pattern) {
                Ok(regex) => regex,
                Err(_) => build(&regex::escape(pattern))
                    .map_err(|e| HdbError::validation("filter", e.to_string()))?,
            }
        };
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, message: &str) -> bool {
        self.regex.is_match(message)
    }

    /// `message` with every match in bold red
    pub fn highlight(&self, message: &str) -> String {
        self.regex
            .replace_all(message, |caps: &regex::Captures<'_>| {
                caps[0].bold().red().to_string()
            })
            .into_owned()
    }
}

fn build(expr: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(expr).case_insensitive(true).build()
}

/// Remembers which entries were already shown in this run.
///
/// Only digests of the latest `read_log` batch are kept: an entry that has
/// fallen out of the lookback window is never returned again, so its
/// digest can go.
#[derive(Debug, Default)]
pub struct LogDeduper {
    seen: HashSet<String>,
}

impl LogDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry`, returning false if it was seen before
    pub fn insert(&mut self, entry: &LogEntry) -> bool {
        self.seen.insert(entry_digest(entry))
    }

    /// Forget every digest not in `batch`
    pub fn retain_batch(&mut self, batch: &[LogEntry]) {
        let current: HashSet<String> = batch.iter().map(entry_digest).collect();
        self.seen.retain(|digest| current.contains(digest));
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// SHA-256 of timestamp followed by message, hex encoded
pub fn entry_digest(entry: &LogEntry) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry.timestamp.as_bytes());
    hasher.update(entry.message.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Drop entries seen before and, with a filter, those that do not match.
/// Matches are highlighted in the returned messages.
pub fn select_entries(
    entries: Vec<LogEntry>,
    deduper: &mut LogDeduper,
    filter: Option<&LogFilter>,
) -> Vec<LogEntry> {
    deduper.retain_batch(&entries);
    entries
        .into_iter()
        .filter(|entry| deduper.insert(entry))
        .filter_map(|mut entry| match filter {
            None => Some(entry),
            Some(filter) if filter.is_match(&entry.message) => {
                entry.message = filter.highlight(&entry.message);
                Some(entry)
            }
            Some(_) => None,
        })
        .collect()
}

/// `read_log` for the window ending at `now`
pub async fn read_log(
    api: &dyn Operations,
    query: &LogQuery,
    now: DateTime<Utc>,
) -> HdbResult<Vec<LogEntry>> {
    let response = api.operation("read_log", query.params(now)).await?;
    serde_json::from_value(response)
        .map_err(|e| HdbError::json(format!("Unexpected read_log response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::super::components::fake::FakeOperations;
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn entry(timestamp: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: timestamp.to_string(),
            message: message.to_string(),
            level: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_query_params() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let query = LogQuery {
            lookback_minutes: 15,
            level: Some("error".into()),
        };

        let params = query.params(now);

        assert_eq!(params["from"], "2024-05-01T11:45:00.000Z");
        assert_eq!(params["until"], "2024-05-01T12:00:00.000Z");
        assert_eq!(params["order"], "asc");
        assert_eq!(params["level"], "error");
        assert!(!LogQuery::default().params(now).contains_key("level"));
    }

    #[test]
    fn test_deduper_forgets_entries_outside_the_window() {
        let mut deduper = LogDeduper::new();
        select_entries(vec![entry("1", "a"), entry("2", "b")], &mut deduper, None);
        assert_eq!(deduper.len(), 2);

        // "1" left the window; only the current batch is remembered
        let shown = select_entries(vec![entry("2", "b"), entry("3", "c")], &mut deduper, None);
        assert_eq!(shown, vec![entry("3", "c")]);
        assert_eq!(deduper.len(), 2);

        for i in 0..50 {
            let t = (10 + i).to_string();
            select_entries(vec![entry(&t, "tick")], &mut deduper, None);
        }
        assert_eq!(deduper.len(), 1);
    }

    #[test]
    fn test_deduper_suppresses_repeats() {
        let mut deduper = LogDeduper::new();
        assert!(deduper.insert(&entry("t1", "hello")));
        assert!(!deduper.insert(&entry("t1", "hello")));
        assert!(deduper.insert(&entry("t2", "hello")));
        assert_eq!(deduper.len(), 2);
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        let digest = entry_digest(&entry("", "abc"));
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_filter_forms() {
        let regex = LogFilter::parse("/err(or)?\\s+\\d+/").unwrap();
        assert!(regex.is_match("ERROR 42 happened"));
        assert!(!regex.is_match("error x"));

        let plain = LogFilter::parse("timeout").unwrap();
        assert!(plain.is_match("Request TIMEOUT"));

        let literal = LogFilter::parse("a(b").unwrap();
        assert!(literal.is_match("xa(by"));

        assert!(LogFilter::parse("/a(b/").is_err());
    }

    #[test]
    fn test_highlight_keeps_text() {
        let filter = LogFilter::parse("fail").unwrap();
        let highlighted = filter.highlight("it FAILed");
        assert!(highlighted.contains("FAIL"));
        assert!(highlighted.starts_with("it "));
        assert!(highlighted.ends_with("ed"));
    }

    #[test]
    fn test_select_entries_dedupes_then_filters() {
        let mut deduper = LogDeduper::new();
        let filter = LogFilter::parse("boom").unwrap();

        let first = select_entries(
            vec![entry("1", "boom"), entry("2", "quiet"), entry("1", "boom")],
            &mut deduper,
            Some(&filter),
        );
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].timestamp, "1");

        let second = select_entries(vec![entry("1", "boom"), entry("3", "calm")], &mut deduper, None);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].timestamp, "3");
    }

    #[test]
    fn test_entry_fields_keep_extra_keys() {
        let parsed: LogEntry = serde_json::from_value(json!({
            "timestamp": "t",
            "level": "warn",
            "thread": "main/0",
            "message": "m"
        }))
        .unwrap();
        let fields = parsed.fields();
        assert_eq!(fields.first().unwrap().0, "timestamp");
        assert_eq!(fields.last().unwrap(), &("message".to_string(), "m".to_string()));
        assert!(fields.contains(&("thread".to_string(), "main/0".to_string())));
    }

    #[tokio::test]
    async fn test_read_log_sends_window() {
        let api = FakeOperations::new([Ok(json!([{ "timestamp": "t", "message": "m" }]))]);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let entries = read_log(&api, &LogQuery::default(), now).await.unwrap();

        assert_eq!(entries, vec![entry("t", "m")]);
        let calls = api.calls();
        assert_eq!(calls[0].0, "read_log");
        assert_eq!(calls[0].1["from"], "2023-12-31T23:45:00.000Z");
    }
}
