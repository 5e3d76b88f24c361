// ABOUTME: Reducer for the running workout completion form
// ABOUTME: Tracks minute/second split entries plus session RPE and builds the completion body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::NaiveDate;
use repforge_core::constants::rpe::clamp_rpe;
use repforge_core::models::{IntervalLog, RunningCompletionRequest, SavedRunningSession, SplitLog};
use serde::{Deserialize, Serialize};

/// One split row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDraft {
    /// Saved split id
    pub id: i64,
    /// 1-based repeat number
    pub repeat_number: i64,
    /// Target time in seconds
    pub target_time: Option<i64>,
    /// Minutes entered
    pub minutes: Option<i64>,
    /// Seconds entered
    pub seconds: Option<i64>,
    /// Notes
    pub comments: String,
}

impl SplitDraft {
    /// Entered time in seconds, or `None` when both fields are empty
    #[must_use]
    pub fn actual_time(&self) -> Option<i64> {
        match (self.minutes, self.seconds) {
            (None, None) => None,
            (minutes, seconds) => Some(minutes.unwrap_or(0) * 60 + seconds.unwrap_or(0)),
        }
    }
}

/// One interval and its splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalDraft {
    /// Saved interval id
    pub id: i64,
    /// Variation number
    pub repeat_variation: i64,
    /// Distance per repeat
    pub repeat_distance: f64,
    /// Split rows
    pub splits: Vec<SplitDraft>,
}

/// Everything the running completion screen can do to its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunningAction {
    /// Enter a split time
    SplitTime {
        /// Saved split id
        split_id: i64,
        /// Minutes, empty to clear
        minutes: Option<i64>,
        /// Seconds, empty to clear
        seconds: Option<i64>,
    },
    /// Enter split notes
    SplitComment {
        /// Saved split id
        split_id: i64,
        /// Notes
        comments: String,
    },
    /// Session RPE
    Rpe(Option<i64>),
    /// Session notes
    Comments(String),
}

/// State of the running completion form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningCompletionForm {
    /// Workout being completed
    pub workout_id: i64,
    /// Intervals in order
    pub intervals: Vec<IntervalDraft>,
    /// Session RPE
    pub rpe: Option<i64>,
    /// Session notes
    pub comments: String,
}

impl RunningCompletionForm {
    /// Build the form from the saved running session of a workout
    #[must_use]
    pub fn from_session(workout_id: i64, session: &SavedRunningSession) -> Self {
        let intervals = session
            .saved_intervals
            .iter()
            .map(|interval| IntervalDraft {
                id: interval.id,
                repeat_variation: interval.repeat_variation,
                repeat_distance: interval.repeat_distance,
                splits: interval
                    .split_times
                    .iter()
                    .map(|split| SplitDraft {
                        id: split.id,
                        repeat_number: split.repeat_number,
                        target_time: split.target_time,
                        minutes: split.actual_time.map(|time| time / 60),
                        seconds: split.actual_time.map(|time| time % 60),
                        comments: split.comments.clone().unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            workout_id,
            intervals,
            rpe: session.rpe,
            comments: session.comments.clone().unwrap_or_default(),
        }
    }

    /// Apply an action; unknown split ids are ignored
    pub fn apply(&mut self, action: RunningAction) {
        match action {
            RunningAction::SplitTime {
                split_id,
                minutes,
                seconds,
            } => {
                if let Some(split) = self.split_mut(split_id) {
                    split.minutes = minutes;
                    split.seconds = seconds;
                }
            }
            RunningAction::SplitComment { split_id, comments } => {
                if let Some(split) = self.split_mut(split_id) {
                    split.comments = comments;
                }
            }
            RunningAction::Rpe(rpe) => self.rpe = rpe.map(clamp_rpe),
            RunningAction::Comments(comments) => self.comments = comments,
        }
    }

    /// Body for `PUT /api/saved_runs/complete-workout/{id}/`
    #[must_use]
    pub fn payload(&self, scheduled_date: Option<NaiveDate>) -> RunningCompletionRequest {
        RunningCompletionRequest {
            scheduled_date,
            rpe: self.rpe,
            comments: Some(self.comments.clone()),
            intervals: self
                .intervals
                .iter()
                .map(|interval| IntervalLog {
                    id: interval.id,
                    split_times: interval
                        .splits
                        .iter()
                        .map(|split| SplitLog {
                            id: split.id,
                            actual_time: split.actual_time(),
                            comments: Some(split.comments.clone()),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn split_mut(&mut self, split_id: i64) -> Option<&mut SplitDraft> {
        self.intervals
            .iter_mut()
            .flat_map(|interval| interval.splits.iter_mut())
            .find(|split| split.id == split_id)
    }
}
