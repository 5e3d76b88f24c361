// ABOUTME: Reducer for HIIT and mobility completion forms
// ABOUTME: Holds the session RPE and notes and builds the completion body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use repforge_core::constants::rpe::clamp_rpe;
use repforge_core::models::SessionCompletionRequest;
use serde::{Deserialize, Serialize};

/// Edits on the session completion screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Session RPE
    Rpe(Option<i64>),
    /// Session notes
    Comments(String),
}

/// State of a HIIT or mobility completion form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCompletionForm {
    /// Session RPE
    pub rpe: Option<i64>,
    /// Session notes
    pub comments: String,
}

impl SessionCompletionForm {
    /// Apply an action
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::Rpe(rpe) => self.rpe = rpe.map(clamp_rpe),
            SessionAction::Comments(comments) => self.comments = comments,
        }
    }

    /// Body for the HIIT and mobility completion endpoints
    #[must_use]
    pub fn payload(&self) -> SessionCompletionRequest {
        SessionCompletionRequest {
            rpe: self.rpe,
            comments: (!self.comments.trim().is_empty()).then(|| self.comments.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_omits_blank_comments() {
        let mut form = SessionCompletionForm::default();
        form.apply(SessionAction::Rpe(Some(-2)));
        form.apply(SessionAction::Comments("  ".to_owned()));

        let payload = form.payload();
        assert_eq!(payload.rpe, Some(0));
        assert_eq!(payload.comments, None);
    }
}
