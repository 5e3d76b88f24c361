// ABOUTME: Reducer for the gym workout completion form
// ABOUTME: Holds per-movement set drafts and builds the details and completion request bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use repforge_core::constants::rpe::clamp_rpe;
use repforge_core::models::{
    MovementLog, PopulatedWorkout, SectionLog, SectionMovementDetail, SetEntry, WorkoutLogRequest,
};
use serde::{Deserialize, Serialize};

/// Sets shown for a movement that has no logged sets yet
pub const DEFAULT_SET_COUNT: i64 = 3;

/// One editable set row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDraft {
    /// 1-based set number
    pub set_number: i64,
    /// Reps, empty until entered
    pub reps: Option<i64>,
    /// Weight, empty until entered
    pub weight: Option<f64>,
}

impl SetDraft {
    const fn empty(set_number: i64) -> Self {
        Self {
            set_number,
            reps: None,
            weight: None,
        }
    }
}

/// Difficulty and notes for one movement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSummaryDraft {
    /// 0 until the user rates the movement
    pub movement_difficulty: i64,
    /// Free text
    pub movement_comments: String,
}

/// One movement placed in a section, with its drafts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDraft {
    /// Section movement id
    pub section_movement_id: i64,
    /// Exercise name for display
    pub exercise: String,
    /// Set rows
    pub sets: Vec<SetDraft>,
    /// Difficulty and notes
    pub summary: MovementSummaryDraft,
}

impl MovementDraft {
    fn from_detail(detail: &SectionMovementDetail) -> Self {
        let sets = if detail.workout_sets.is_empty() {
            (1..=DEFAULT_SET_COUNT).map(SetDraft::empty).collect()
        } else {
            detail
                .workout_sets
                .iter()
                .map(|set| SetDraft {
                    set_number: set.set_number,
                    reps: Some(set.reps),
                    weight: Some(set.weight),
                })
                .collect()
        };

        Self {
            section_movement_id: detail.id,
            exercise: detail.movements.exercise.clone(),
            sets,
            summary: MovementSummaryDraft {
                movement_difficulty: detail.movement_difficulty.unwrap_or(0),
                movement_comments: detail.movement_comment.clone().unwrap_or_default(),
            },
        }
    }

    fn to_log(&self, with_summary: bool) -> MovementLog {
        MovementLog {
            movement_id: self.section_movement_id,
            movement_difficulty: with_summary.then_some(self.summary.movement_difficulty),
            movement_comments: with_summary.then(|| self.summary.movement_comments.clone()),
            sets: self
                .sets
                .iter()
                .map(|set| SetEntry {
                    set_number: set.set_number,
                    reps: set.reps,
                    weight: set.weight,
                })
                .collect(),
        }
    }
}

/// One section (a form stage)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDraft {
    /// Section id
    pub section_id: i64,
    /// Display name
    pub section_name: String,
    /// Movements in order
    pub movements: Vec<MovementDraft>,
}

/// Value typed into a set row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetValue {
    /// Reps column
    Reps(Option<i64>),
    /// Weight column
    Weight(Option<f64>),
}

/// Edit to a movement summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryChange {
    /// Difficulty rating
    Difficulty(i64),
    /// Notes
    Comments(String),
}

/// Everything the gym completion screen can do to its state
#[derive(Debug, Clone, PartialEq)]
pub enum GymAction {
    /// Append an empty-valued set to a movement
    AddSet(i64),
    /// Drop the last set of a movement, keeping at least one
    RemoveSet(i64),
    /// Edit one set row
    SetChange {
        /// Section movement id
        movement_id: i64,
        /// Row index
        index: usize,
        /// New value
        value: SetValue,
    },
    /// Edit a movement summary
    SummaryChange {
        /// Section movement id
        movement_id: i64,
        /// New value
        change: SummaryChange,
    },
    /// Advance to the next section
    NextStage,
    /// Go back to the previous section
    PrevStage,
}

/// State of the gym completion form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymCompletionForm {
    /// Workout being completed
    pub workout_id: i64,
    /// Sections in order
    pub sections: Vec<SectionDraft>,
    /// Index of the section on screen
    pub stage: usize,
}

impl GymCompletionForm {
    /// Build the form from a populated workout
    #[must_use]
    pub fn from_workout(workout: &PopulatedWorkout) -> Self {
        let mut sections: Vec<_> = workout.workout_sections.iter().collect();
        sections.sort_by_key(|section| section.section_order);

        Self {
            workout_id: workout.workout.id,
            sections: sections
                .into_iter()
                .map(|section| {
                    let mut details: Vec<_> = section.section_movement_details.iter().collect();
                    details.sort_by_key(|detail| detail.movement_order);
                    SectionDraft {
                        section_id: section.id,
                        section_name: section.section_name.clone(),
                        movements: details.into_iter().map(MovementDraft::from_detail).collect(),
                    }
                })
                .collect(),
            stage: 0,
        }
    }

    /// Apply an action; unknown movement ids and row indexes are ignored
    pub fn apply(&mut self, action: GymAction) {
        match action {
            GymAction::AddSet(movement_id) => {
                if let Some(movement) = self.movement_mut(movement_id) {
                    let set_number = movement.sets.len() as i64 + 1;
                    movement.sets.push(SetDraft {
                        set_number,
                        reps: Some(0),
                        weight: Some(0.0),
                    });
                }
            }
            GymAction::RemoveSet(movement_id) => {
                if let Some(movement) = self.movement_mut(movement_id) {
                    if movement.sets.len() > 1 {
                        movement.sets.pop();
                    }
                }
            }
            GymAction::SetChange {
                movement_id,
                index,
                value,
            } => {
                if let Some(set) = self
                    .movement_mut(movement_id)
                    .and_then(|movement| movement.sets.get_mut(index))
                {
                    match value {
                        SetValue::Reps(reps) => set.reps = reps,
                        SetValue::Weight(weight) => set.weight = weight,
                    }
                }
            }
            GymAction::SummaryChange {
                movement_id,
                change,
            } => {
                if let Some(movement) = self.movement_mut(movement_id) {
                    match change {
                        SummaryChange::Difficulty(value) => {
                            movement.summary.movement_difficulty = clamp_rpe(value);
                        }
                        SummaryChange::Comments(text) => movement.summary.movement_comments = text,
                    }
                }
            }
            GymAction::NextStage => {
                if self.stage + 1 < self.sections.len() {
                    self.stage += 1;
                }
            }
            GymAction::PrevStage => self.stage = self.stage.saturating_sub(1),
        }
    }

    /// Section on screen
    #[must_use]
    pub fn current_section(&self) -> Option<&SectionDraft> {
        self.sections.get(self.stage)
    }

    /// Whether the last section is on screen
    #[must_use]
    pub fn is_last_stage(&self) -> bool {
        self.stage + 1 >= self.sections.len()
    }

    /// Body for `PUT /api/workout_sections/save-workout-details/`
    #[must_use]
    pub fn details_payload(&self) -> WorkoutLogRequest {
        self.payload(true)
    }

    /// Body for `PUT /api/saved_workouts/complete-workout/{id}/`
    #[must_use]
    pub fn completion_payload(&self) -> WorkoutLogRequest {
        self.payload(false)
    }

    fn payload(&self, with_summary: bool) -> WorkoutLogRequest {
        WorkoutLogRequest {
            sections: self
                .sections
                .iter()
                .map(|section| SectionLog {
                    section_id: section.section_id,
                    movements: section
                        .movements
                        .iter()
                        .map(|movement| movement.to_log(with_summary))
                        .collect(),
                })
                .collect(),
        }
    }

    fn movement_mut(&mut self, movement_id: i64) -> Option<&mut MovementDraft> {
        self.sections
            .iter_mut()
            .flat_map(|section| section.movements.iter_mut())
            .find(|movement| movement.section_movement_id == movement_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use repforge_core::models::{
        ActivityType, Movement, SectionType, Workout, WorkoutSection, WorkoutSet, WorkoutStatus,
    };

    use super::*;

    fn detail(id: i64, order: i64, sets: Vec<WorkoutSet>) -> SectionMovementDetail {
        SectionMovementDetail {
            id,
            movement_order: order,
            movement_difficulty: None,
            movement_comment: None,
            movements: Movement {
                id: id * 10,
                exercise: format!("Exercise {id}"),
                ..Movement::default()
            },
            workout_sets: sets,
        }
    }

    fn workout() -> PopulatedWorkout {
        let now = Utc::now();
        PopulatedWorkout {
            workout: Workout {
                id: 5,
                owner_id: 1,
                workout_number: 1,
                name: "Upper body Workout".to_owned(),
                description: String::new(),
                status: WorkoutStatus::Started,
                complexity: 2,
                duration: 40,
                activity_type: ActivityType::Gym,
                comments: None,
                scheduled_date: None,
                completed_date: None,
                created_at: now,
                updated_at: now,
            },
            workout_sections: vec![
                WorkoutSection {
                    id: 12,
                    section_name: "Workout part 2".to_owned(),
                    section_type: SectionType::Single,
                    section_order: 2,
                    section_movement_details: vec![detail(
                        3,
                        1,
                        vec![WorkoutSet {
                            id: 1,
                            set_number: 1,
                            reps: 8,
                            weight: 60.0,
                        }],
                    )],
                },
                WorkoutSection {
                    id: 11,
                    section_name: "Warmup".to_owned(),
                    section_type: SectionType::Single,
                    section_order: 1,
                    section_movement_details: vec![detail(2, 2, vec![]), detail(1, 1, vec![])],
                },
            ],
            running_sessions: vec![],
            hiit_sessions: vec![],
            mobility_sessions: vec![],
        }
    }

    #[test]
    fn test_form_orders_sections_and_seeds_default_sets() {
        let form = GymCompletionForm::from_workout(&workout());

        assert_eq!(form.sections[0].section_id, 11);
        assert_eq!(form.sections[0].movements[0].section_movement_id, 1);
        assert_eq!(form.sections[0].movements[0].sets.len(), 3);
        assert_eq!(form.sections[0].movements[0].sets[2], SetDraft::empty(3));
        assert_eq!(form.sections[1].movements[0].sets[0].reps, Some(8));
    }

    #[test]
    fn test_add_and_remove_sets() {
        let mut form = GymCompletionForm::from_workout(&workout());

        form.apply(GymAction::AddSet(3));
        let sets = &form.sections[1].movements[0].sets;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[1].set_number, 2);
        assert_eq!(sets[1].weight, Some(0.0));

        form.apply(GymAction::RemoveSet(3));
        form.apply(GymAction::RemoveSet(3));
        assert_eq!(form.sections[1].movements[0].sets.len(), 1);
    }

    #[test]
    fn test_set_and_summary_changes() {
        let mut form = GymCompletionForm::from_workout(&workout());

        form.apply(GymAction::SetChange {
            movement_id: 1,
            index: 0,
            value: SetValue::Reps(Some(12)),
        });
        form.apply(GymAction::SetChange {
            movement_id: 1,
            index: 9,
            value: SetValue::Weight(Some(20.0)),
        });
        form.apply(GymAction::SummaryChange {
            movement_id: 1,
            change: SummaryChange::Difficulty(7),
        });

        let payload = form.details_payload();
        let logged = &payload.sections[0].movements[0];
        assert_eq!(logged.sets[0].reps, Some(12));
        assert_eq!(logged.movement_difficulty, Some(7));
        assert_eq!(logged.movement_comments.as_deref(), Some(""));

        let completion = form.completion_payload();
        assert_eq!(completion.sections[0].movements[0].movement_difficulty, None);
    }

    #[test]
    fn test_difficulty_stays_on_rpe_scale() {
        let mut form = GymCompletionForm::from_workout(&workout());

        form.apply(GymAction::SummaryChange {
            movement_id: 1,
            change: SummaryChange::Difficulty(14),
        });
        assert_eq!(form.details_payload().sections[0].movements[0].movement_difficulty, Some(10));

        form.apply(GymAction::SummaryChange {
            movement_id: 1,
            change: SummaryChange::Difficulty(-3),
        });
        assert_eq!(form.details_payload().sections[0].movements[0].movement_difficulty, Some(0));
    }

    #[test]
    fn test_stages_are_clamped() {
        let mut form = GymCompletionForm::from_workout(&workout());

        form.apply(GymAction::PrevStage);
        assert_eq!(form.stage, 0);
        form.apply(GymAction::NextStage);
        form.apply(GymAction::NextStage);
        assert_eq!(form.stage, 1);
        assert!(form.is_last_stage());
        assert_eq!(
            form.current_section().map(|s| s.section_name.as_str()),
            Some("Workout part 2")
        );
    }
}
