// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Confirmation prompts used by the grouping workflows.

/// Interactive decisions a workflow may ask for.
pub trait Prompt {
    /// Yes/no question; `true` means go ahead.
    fn confirm(&mut self, question: &str) -> bool;

    /// Pick one of `choices` (never empty).
    fn choose(&mut self, headline: &str, choices: &[String]) -> String;
}

/// Non-interactive prompt: confirms everything and picks the first choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!(question, "Assuming yes");
        true
    }

    fn choose(&mut self, headline: &str, choices: &[String]) -> String {
        tracing::debug!(headline, choices = choices.len(), "Picking first choice");
        choices.first().cloned().unwrap_or_default()
    }
}
