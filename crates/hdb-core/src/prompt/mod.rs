//! Interactive confirmation capability
//!
//! The resolver and the configuration flows only ever talk to the operator
//! through [`Prompter`]. The terminal implementation lives in the CLI crate.

#[cfg(test)]
pub(crate) mod scripted;

use crate::error::HdbResult;
use async_trait::async_trait;
use std::time::Duration;

/// Ask the operator yes/no, pick-one and free-text questions.
///
/// Backing out of a prompt (Esc, closed input) is reported as
/// [`HdbError::Cancelled`](crate::HdbError::Cancelled).
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Blocking yes/no question; `default` is the answer on bare Enter
    fn confirm(&self, prompt: &str, default: bool) -> HdbResult<bool>;

    /// Yes/no with a visible countdown.
    ///
    /// Resolves `true` when `timeout` elapses without input or on an accept
    /// key, `false` on a cancel key. Terminal input mode is restored on
    /// every path.
    async fn auto_confirm(&self, prompt: &str, timeout: Duration) -> HdbResult<bool>;

    /// Pick one of `items`, returning its index
    fn select(&self, prompt: &str, items: &[String]) -> HdbResult<usize>;

    /// Pick any number of `items`, returning their indices
    fn multi_select(&self, prompt: &str, items: &[String]) -> HdbResult<Vec<usize>>;

    /// Free text, pre-filled with `default` when given
    fn input(&self, prompt: &str, default: Option<&str>) -> HdbResult<String>;

    /// Hidden input
    fn password(&self, prompt: &str) -> HdbResult<String>;

    /// Tell the operator their last answer was rejected before asking again
    fn report_invalid(&self, message: &str);
}
