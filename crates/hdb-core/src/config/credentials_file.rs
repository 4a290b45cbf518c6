//! Legacy credential file (`.env.harperdb`)
//!
//! Line-oriented `KEY="value"` pairs. Comments and blank lines are kept
//! verbatim on update: values are patched in place line by line rather
//! than regenerating the file from a map.

use crate::error::{HdbError, HdbResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the legacy credential file
pub const ENV_FILE: &str = ".env.harperdb";

/// Contents the credential file is reset to. Holds no keys, so migration
/// sees nothing to import afterwards.
pub const ENV_FILE_TEMPLATE: &str = "\
# HarperDB helper credentials (legacy format)
#
# Environments now live in .hdbconfig.json. Add one with:
#   hdb config add-env
#
# Entries of the form ENV_<NAME>_USERNAME, ENV_<NAME>_PASSWORD and
# ENV_<NAME>_INSTANCES (comma-separated) found here are imported into
# .hdbconfig.json automatically on the next command.
";

/// Durable access to the legacy credential file
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the file into key/value pairs.
    ///
    /// Fails with [`HdbError::CredentialParse`] when the file is absent;
    /// callers check [`exists`](Self::exists) first.
    pub fn read(&self) -> HdbResult<BTreeMap<String, String>> {
        Ok(parse_credentials(&self.read_text()?))
    }

    /// Raw file contents
    pub fn read_text(&self) -> HdbResult<String> {
        fs::read_to_string(&self.path)
            .map_err(|e| HdbError::credential_parse(&self.path, e.to_string()))
    }

    /// Replace the file contents
    pub fn write_text(&self, content: &str) -> HdbResult<()> {
        fs::write(&self.path, content).map_err(|e| HdbError::io_at(&self.path, e))?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }

    /// Patch `updates` into the file, preserving every other line
    pub fn apply_updates(&self, updates: &BTreeMap<String, String>) -> HdbResult<()> {
        let current = self.read_text()?;
        let next = update_text(&current, updates);
        if next != current {
            self.write_text(&next)?;
        }
        Ok(())
    }

    /// Overwrite the file with the key-less template
    pub fn reset_to_template(&self) -> HdbResult<()> {
        self.write_text(ENV_FILE_TEMPLATE)
    }
}

/// Parse credential file text into key/value pairs.
///
/// Blank lines and lines starting with `#` are ignored, as are lines without
/// a `KEY=` prefix. The first occurrence of a duplicated key wins, which
/// is also the line [`update_text`] patches.
pub fn parse_credentials(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for line in text.lines() {
        if let Some((key, raw)) = split_entry(line) {
            entries
                .entry(key.to_string())
                .or_insert_with(|| parse_value(raw));
        }
    }
    entries
}

/// Patch `updates` into `existing`, returning the new text.
///
/// Each line whose key is in `updates` gets its value replaced in place
/// (first occurrence only); keys not present in the file are appended in
/// key order. Applying the same updates to the result is a no-op.
pub fn update_text(existing: &str, updates: &BTreeMap<String, String>) -> String {
    let mut pending: BTreeSet<&str> = updates.keys().map(String::as_str).collect();
    let mut lines: Vec<String> = Vec::new();

    for line in existing.lines() {
        let replacement = split_entry(line).and_then(|(key, _)| {
            pending
                .take(key)
                .and_then(|key| updates.get(key).map(|value| format_entry(key, value)))
        });
        lines.push(replacement.unwrap_or_else(|| line.to_string()));
    }

    for key in pending {
        if let Some(value) = updates.get(key) {
            lines.push(format_entry(key, value));
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Split `KEY=rest` off a line, skipping comments and blanks
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, rest) = trimmed.split_once('=')?;
    let key = key.trim();
    let key = key.strip_prefix("export ").map(str::trim).unwrap_or(key);
    if key.is_empty() {
        return None;
    }
    Some((key, rest))
}

fn parse_value(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape(&raw[1..raw.len() - 1]);
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

fn format_entry(key: &str, value: &str) -> String {
    format!("{key}=\"{}\"", escape(value))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn updates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# comment\n\nA=\"1\"\n  # indented comment\nB='two'\nC=plain # trailing\nnot an entry\n";
        let parsed = parse_credentials(text);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed["A"], "1");
        assert_eq!(parsed["B"], "two");
        assert_eq!(parsed["C"], "plain");
    }

    #[test]
    fn test_parse_keeps_dollar_signs_and_unescapes_quotes() {
        let parsed = parse_credentials("P=\"pa$$w\\\"rd\"\nexport Q=\"x\"\n");
        assert_eq!(parsed["P"], "pa$$w\"rd");
        assert_eq!(parsed["Q"], "x");
    }

    #[test]
    fn test_update_replaces_in_place_and_appends_new_keys() {
        let original = "# header\n\nENV_DEV_USERNAME=\"old\"\n# keep me\nOTHER=\"x\"\n";
        let result = update_text(
            original,
            &updates(&[("ENV_DEV_USERNAME", "new"), ("ENV_DEV_PASSWORD", "pw")]),
        );
        assert_eq!(
            result,
            "# header\n\nENV_DEV_USERNAME=\"new\"\n# keep me\nOTHER=\"x\"\nENV_DEV_PASSWORD=\"pw\"\n"
        );
    }

    #[test]
    fn test_update_twice_is_byte_identical() {
        let original = "# c\nA=\"1\"\n\nB=2";
        let u = updates(&[("A", "9"), ("C", "new value"), ("D", "quote\"d")]);
        let once = update_text(original, &u);
        let twice = update_text(&once, &u);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_only_replaces_first_occurrence() {
        let result = update_text("A=\"1\"\nA=\"2\"\n", &updates(&[("A", "3")]));
        assert_eq!(result, "A=\"3\"\nA=\"2\"\n");
    }

    #[test]
    fn test_read_sees_updated_duplicate_key() {
        let text = update_text("A=\"1\"\nA=\"2\"\n", &updates(&[("A", "3")]));
        assert_eq!(parse_credentials(&text)["A"], "3");
        assert_eq!(parse_credentials("B=\"first\"\nB=\"second\"\n")["B"], "first");
    }

    #[test]
    fn test_update_does_not_touch_commented_keys() {
        let result = update_text("#A=\"1\"\n", &updates(&[("A", "2")]));
        assert_eq!(result, "#A=\"1\"\nA=\"2\"\n");
    }

    #[test]
    fn test_escaped_values_round_trip() {
        let value = "back\\slash \"quoted\" $HOME";
        let text = update_text("", &updates(&[("SECRET", value)]));
        assert_eq!(parse_credentials(&text)["SECRET"], value);
    }

    #[test]
    fn test_template_has_no_keys() {
        assert!(parse_credentials(ENV_FILE_TEMPLATE).is_empty());
    }

    #[test]
    fn test_read_missing_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join(ENV_FILE));
        assert!(!store.exists());
        assert!(matches!(
            store.read().unwrap_err(),
            HdbError::CredentialParse { .. }
        ));
    }

    #[test]
    fn test_apply_updates_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join(ENV_FILE));
        store.write_text("# keep\nA=\"1\"\n").unwrap();

        store.apply_updates(&updates(&[("A", "2"), ("B", "3")])).unwrap();

        assert_eq!(store.read_text().unwrap(), "# keep\nA=\"2\"\nB=\"3\"\n");
        let parsed = store.read().unwrap();
        assert_eq!(parsed["A"], "2");
        assert_eq!(parsed["B"], "3");
    }
}
