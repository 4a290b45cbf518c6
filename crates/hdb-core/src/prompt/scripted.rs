//! Prompter double that replays queued answers

use super::Prompter;
use crate::error::{HdbError, HdbResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    AutoConfirm(bool),
    Select(usize),
    MultiSelect(Vec<usize>),
    Text(String),
    Cancel,
}

/// Answers prompts from a queue and records every question asked.
///
/// Asking a question whose queued answer has the wrong kind, or with an
/// empty queue, panics so the test fails at the offending prompt.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
    rejections: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn rejections(&self) -> Vec<String> {
        self.rejections.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, prompt: &str) -> Answer {
        self.asked.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer for prompt {prompt:?}"))
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, _default: bool) -> HdbResult<bool> {
        match self.next(prompt) {
            Answer::Confirm(value) => Ok(value),
            Answer::Cancel => Err(HdbError::Cancelled),
            other => panic!("expected Confirm for {prompt:?}, got {other:?}"),
        }
    }

    async fn auto_confirm(&self, prompt: &str, _timeout: Duration) -> HdbResult<bool> {
        match self.next(prompt) {
            Answer::AutoConfirm(value) => Ok(value),
            Answer::Cancel => Err(HdbError::Cancelled),
            other => panic!("expected AutoConfirm for {prompt:?}, got {other:?}"),
        }
    }

    fn select(&self, prompt: &str, items: &[String]) -> HdbResult<usize> {
        match self.next(prompt) {
            Answer::Select(index) => {
                assert!(index < items.len(), "index {index} out of range for {items:?}");
                Ok(index)
            }
            Answer::Cancel => Err(HdbError::Cancelled),
            other => panic!("expected Select for {prompt:?}, got {other:?}"),
        }
    }

    fn multi_select(&self, prompt: &str, _items: &[String]) -> HdbResult<Vec<usize>> {
        match self.next(prompt) {
            Answer::MultiSelect(indices) => Ok(indices),
            Answer::Cancel => Err(HdbError::Cancelled),
            other => panic!("expected MultiSelect for {prompt:?}, got {other:?}"),
        }
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> HdbResult<String> {
        match self.next(prompt) {
            Answer::Text(text) if text.is_empty() => {
                Ok(default.map(str::to_string).unwrap_or_default())
            }
            Answer::Text(text) => Ok(text),
            Answer::Cancel => Err(HdbError::Cancelled),
            other => panic!("expected Text for {prompt:?}, got {other:?}"),
        }
    }

    fn password(&self, prompt: &str) -> HdbResult<String> {
        self.input(prompt, None)
    }

    fn report_invalid(&self, message: &str) {
        self.rejections.lock().unwrap().push(message.to_string());
    }
}
