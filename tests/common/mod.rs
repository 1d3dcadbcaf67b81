// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use activity_reconcile::models::{Activity, Uid};
use activity_reconcile::services::Prompt;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::collections::VecDeque;

/// Timestamp on the reference day 2022-02-22.
#[allow(dead_code)]
pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 2, 22, h, m, s).unwrap()
}

#[allow(dead_code)]
pub fn uid(s: &str) -> Uid {
    Uid::parse(s).expect("valid uid")
}

/// Activity with uid, name and a start/end time spanning `minutes`.
#[allow(dead_code)]
pub fn recorded(uid_str: &str, name: &str, start: DateTime<Utc>, minutes: i64) -> Activity {
    Activity {
        uid: Some(uid(uid_str)),
        name: Some(name.to_string()),
        starttime: Some(start),
        endtime: Some(start + TimeDelta::minutes(minutes)),
        duration: Some(TimeDelta::minutes(minutes)),
        ..Default::default()
    }
}

/// Prompt replaying canned answers and recording what it was asked.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    pick: usize,
    pub questions: Vec<String>,
    pub offered: Vec<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedPrompt {
    /// Answer the confirmations in order, then yes.
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Pick the choice at `index` whenever a name is to be chosen.
    pub fn picking(mut self, index: usize) -> Self {
        self.pick = index;
        self
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.answers.pop_front().unwrap_or(true)
    }

    fn choose(&mut self, _headline: &str, choices: &[String]) -> String {
        self.offered.push(choices.to_vec());
        choices[self.pick.min(choices.len() - 1)].clone()
    }
}
