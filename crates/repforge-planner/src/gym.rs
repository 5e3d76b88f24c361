// ABOUTME: Gym session generator building sectioned plans from the movement catalog
// ABOUTME: Snaps the requested time to a template, then fills warm-up, primary, and accessory sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Gym session generation
//!
//! A plan always opens with a single conditioning warm-up, followed by the
//! sections of one of the configurations registered for the snapped duration.
//! Section letters map to a selection strategy:
//!
//! | Letter | Strategy                                                    |
//! |--------|-------------------------------------------------------------|
//! | B      | up to three "Warm Up" movements as a superset               |
//! | C      | one "Primary" movement                                      |
//! | D      | one "Primary" movement with a different pattern than C      |
//! | E..I   | up to three Secondary/Accessory movements, max two per pattern |

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use repforge_core::models::{
    ActivityType, Movement, SaveWorkoutRequest, SectionMovementPayload, SectionPayload,
    SectionType, WorkoutStatus,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::PlannedMovement;

/// Durations a gym session can be generated for, in minutes
pub const ALLOWED_TIMES: [i64; 5] = [30, 40, 50, 60, 75];

/// Number of alternative plans offered per request
pub const PLANS_PER_REQUEST: usize = 5;

/// Body area value that accepts every movement
pub const FULL_BODY: &str = "Full body";

const WARMUP_LABEL: &str = "Warmup";
const WARMUP_PATTERN: &str = "Conditioning";
const WARMUP_PLACEHOLDER: &str = "Default warm-up activity";
const READINESS_LABEL: &str = "Movement readiness superset";
const SUPERSET_SIZE: usize = 3;
const MAX_PER_PATTERN: usize = 2;

/// Section letters used by the configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
}

/// Section configurations for a snapped duration
fn configurations(time: i64) -> &'static [&'static [Slot]] {
    use Slot::{B, C, D, E, F, G, H, I};
    match time {
        30 => &[&[B, C, D], &[B, C, F]],
        40 => &[&[B, C, D, E], &[B, C, D, F]],
        50 => &[&[B, C, D, E, F], &[B, C, D, F, G]],
        60 => &[&[B, C, D, E, F, G, H], &[B, C, D, F, G, H, I]],
        _ => &[&[B, C, D, E, F, G, H, I]],
    }
}

/// Snap a requested duration to the closest allowed time, preferring the shorter on ties
#[must_use]
pub fn snap_time(requested: i64) -> i64 {
    ALLOWED_TIMES
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.abs_diff(requested) < best.abs_diff(requested) {
                candidate
            } else {
                best
            }
        })
        .unwrap_or(ALLOWED_TIMES[0])
}

/// Map how often the athlete trains to the highest complexity offered
#[must_use]
pub fn max_complexity(frequency: &str) -> i64 {
    match frequency {
        "Rarely" => 1,
        "Sometimes" => 2,
        _ => 3,
    }
}

/// Parameters of a gym generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymRequest {
    /// Body area ("Upper body", "Lower body", "Full body", ...)
    pub body_area: String,
    /// Requested duration in minutes
    pub time: i64,
    /// Training frequency ("Rarely", "Sometimes", "Often")
    pub complexity: String,
}

/// One section of a generated gym plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymSection {
    /// Display label
    pub part_label: String,
    /// Single or superset
    pub section_type: SectionType,
    /// Movements in order
    pub movements: Vec<PlannedMovement>,
}

/// A generated gym session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymPlan {
    /// Body area the plan targets
    pub body_area: String,
    /// Snapped duration in minutes
    pub duration: i64,
    /// Complexity ceiling used for selection
    pub complexity: i64,
    /// Sections in order, warm-up first
    pub sections: Vec<GymSection>,
}

impl GymPlan {
    /// Build the save-workout body for this plan
    ///
    /// Placeholder slots are dropped because the server resolves movements by catalog name.
    #[must_use]
    pub fn to_save_request(&self, scheduled_date: Option<NaiveDate>) -> SaveWorkoutRequest {
        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| SectionPayload {
                section_name: Some(section.part_label.clone()),
                section_order: Some(index as i64 + 1),
                section_type: Some(section.section_type),
                movements: section
                    .movements
                    .iter()
                    .filter(|movement| movement.id.is_some())
                    .enumerate()
                    .map(|(order, movement)| SectionMovementPayload {
                        movement_name: Some(movement.exercise.clone()),
                        movement_order: order as i64 + 1,
                        ..SectionMovementPayload::default()
                    })
                    .collect(),
                ..SectionPayload::default()
            })
            .collect();

        SaveWorkoutRequest {
            name: format!("{} Workout", self.body_area),
            description: "Custom generated workout".to_owned(),
            duration: self.duration,
            complexity: self.complexity,
            status: Some(WorkoutStatus::Started.as_str().to_owned()),
            scheduled_date,
            activity_type: ActivityType::Gym.as_str().to_owned(),
            sections,
            ..SaveWorkoutRequest::default()
        }
    }
}

/// Generate [`PLANS_PER_REQUEST`] alternative gym plans
pub fn generate_gym_plans<R: Rng + ?Sized>(
    catalog: &[Movement],
    request: &GymRequest,
    rng: &mut R,
) -> Vec<GymPlan> {
    (0..PLANS_PER_REQUEST)
        .map(|_| generate_gym_plan(catalog, request, rng))
        .collect()
}

/// Generate a single gym plan
pub fn generate_gym_plan<R: Rng + ?Sized>(
    catalog: &[Movement],
    request: &GymRequest,
    rng: &mut R,
) -> GymPlan {
    let duration = snap_time(request.time);
    let complexity = max_complexity(&request.complexity);
    let config = configurations(duration)
        .choose(rng)
        .copied()
        .unwrap_or(&[]);

    debug!(
        requested = request.time,
        snapped = duration,
        sections = config.len(),
        "Generating gym plan"
    );

    let mut builder = PlanBuilder {
        used: HashSet::new(),
        primary_pattern: None,
    };

    let mut sections = vec![builder.warmup(catalog, rng)];

    let eligible: Vec<&Movement> = catalog
        .iter()
        .filter(|movement| {
            movement.complexity <= complexity
                && (request.body_area == FULL_BODY || movement.body_area == request.body_area)
        })
        .collect();

    for (index, slot) in config.iter().enumerate() {
        let part_label = if *slot == Slot::B {
            READINESS_LABEL.to_owned()
        } else {
            format!("Workout part {index}")
        };
        let (section_type, movements) = builder.fill(*slot, &eligible, rng);
        sections.push(GymSection {
            part_label,
            section_type,
            movements,
        });
    }

    GymPlan {
        body_area: request.body_area.clone(),
        duration,
        complexity,
        sections,
    }
}

struct PlanBuilder {
    used: HashSet<String>,
    primary_pattern: Option<String>,
}

impl PlanBuilder {
    fn warmup<R: Rng + ?Sized>(&mut self, catalog: &[Movement], rng: &mut R) -> GymSection {
        let candidates: Vec<&Movement> = catalog
            .iter()
            .filter(|movement| movement.movement == WARMUP_PATTERN)
            .collect();

        let movement = candidates.choose(rng).map_or_else(
            || PlannedMovement::placeholder(WARMUP_PLACEHOLDER),
            |movement| {
                self.used.insert(movement.exercise.clone());
                PlannedMovement::from_catalog(movement)
            },
        );

        GymSection {
            part_label: WARMUP_LABEL.to_owned(),
            section_type: SectionType::Single,
            movements: vec![movement],
        }
    }

    fn fill<R: Rng + ?Sized>(
        &mut self,
        slot: Slot,
        eligible: &[&Movement],
        rng: &mut R,
    ) -> (SectionType, Vec<PlannedMovement>) {
        let unused: Vec<&Movement> = eligible
            .iter()
            .copied()
            .filter(|movement| !self.used.contains(&movement.exercise))
            .collect();

        match slot {
            Slot::B => {
                let pool = unused
                    .into_iter()
                    .filter(|movement| movement.movement_type.contains("Warm Up"))
                    .collect();
                (SectionType::Superset, self.superset(pool, None, rng))
            }
            Slot::C | Slot::D => {
                let previous = self.primary_pattern.clone();
                let pool: Vec<&Movement> = unused
                    .into_iter()
                    .filter(|movement| movement.movement_type.contains("Primary"))
                    .filter(|movement| {
                        slot == Slot::C || previous.as_deref() != Some(movement.movement.as_str())
                    })
                    .collect();
                let picked = pool.choose(rng).map(|movement| {
                    self.used.insert(movement.exercise.clone());
                    if slot == Slot::C {
                        self.primary_pattern = Some(movement.movement.clone());
                    }
                    PlannedMovement::from_catalog(movement)
                });
                (SectionType::Single, picked.into_iter().collect())
            }
            Slot::E | Slot::F | Slot::G | Slot::H | Slot::I => {
                let pool = unused
                    .into_iter()
                    .filter(|movement| {
                        movement.movement_type.contains("Secondary")
                            || movement.movement_type.contains("Accessory")
                    })
                    .collect();
                (
                    SectionType::Superset,
                    self.superset(pool, Some(MAX_PER_PATTERN), rng),
                )
            }
        }
    }

    /// Draw up to three distinct movements without replacement, optionally capping
    /// how many share a movement pattern
    fn superset<R: Rng + ?Sized>(
        &mut self,
        mut pool: Vec<&Movement>,
        per_pattern: Option<usize>,
        rng: &mut R,
    ) -> Vec<PlannedMovement> {
        pool.shuffle(rng);
        let mut pattern_counts: HashMap<&str, usize> = HashMap::new();
        let mut picked = Vec::with_capacity(SUPERSET_SIZE);

        for movement in pool {
            if picked.len() == SUPERSET_SIZE {
                break;
            }
            if self.used.contains(&movement.exercise) {
                continue;
            }
            let count = pattern_counts.entry(movement.movement.as_str()).or_insert(0);
            if per_pattern.is_some_and(|limit| *count >= limit) {
                continue;
            }
            *count += 1;
            self.used.insert(movement.exercise.clone());
            picked.push(PlannedMovement::from_catalog(movement));
        }

        picked
    }
}
