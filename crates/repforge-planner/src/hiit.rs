// ABOUTME: HIIT session generator for AMRAP, EMOM, Tabata, and 30/30 formats
// ABOUTME: Fills rule templates from HIIT-flagged movements and snaps durations per format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! HIIT session generation
//!
//! Each format owns a set of templates, and every template slot is a
//! [`MovementRule`]. A plan picks one template at random and resolves each
//! slot against the HIIT-flagged catalog.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use repforge_core::models::{
    ActivityType, Movement, SaveWorkoutRequest, SectionMovementPayload, SectionPayload,
    WorkoutStatus,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::{MovementPicker, MovementRule, MovementRule as Rule, PlannedMovement, REST};

/// Plans returned for a specific format
pub const PLANS_PER_FORMAT: usize = 10;

/// Plans returned for a mixed request
pub const MIXED_PLAN_LIMIT: usize = 15;

const AMRAP_STRUCTURE_SUFFIX: &str = "with 1-3 mins rest in between";
const EMOM_STRUCTURE: &str =
    "Perform one movement every minute and loop through these for the time available";
const TABATA_STRUCTURE: &str =
    "20s work / 10s rest and rotate through the movements until the time is up";
const THIRTY_THIRTY_STRUCTURE: &str =
    "Alternate between movements every 30 seconds without taking any rest";

/// HIIT formats a user can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HiitFormat {
    /// As many rounds as possible
    #[serde(rename = "AMRAP")]
    Amrap,
    /// Every minute on the minute
    #[serde(rename = "EMOM")]
    Emom,
    /// 20s on / 10s off
    Tabata,
    /// 30s alternating intervals
    #[serde(rename = "30/30")]
    ThirtyThirty,
    /// A shuffled mix of every format valid for the duration
    #[serde(rename = "I don't mind")]
    Mixed,
}

impl HiitFormat {
    /// Wire label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amrap => "AMRAP",
            Self::Emom => "EMOM",
            Self::Tabata => "Tabata",
            Self::ThirtyThirty => "30/30",
            Self::Mixed => "I don't mind",
        }
    }

    /// Parse the wire label
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::Amrap,
            Self::Emom,
            Self::Tabata,
            Self::ThirtyThirty,
            Self::Mixed,
        ]
        .into_iter()
        .find(|format| format.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Durations this format can be generated for, ascending
    #[must_use]
    pub const fn duration_limits(self) -> &'static [i64] {
        match self {
            Self::Amrap => &[10, 15, 20, 30, 40],
            Self::Emom => &[15, 20, 25, 30, 40, 50],
            Self::Tabata => &[10, 15],
            Self::ThirtyThirty => &[10, 15, 20],
            Self::Mixed => &[10, 15, 20, 25, 30, 40, 50],
        }
    }
}

/// Snap to the largest allowed value not above the request, or the smallest allowed value
#[must_use]
pub fn snap_duration(requested: i64, allowed: &[i64]) -> i64 {
    allowed
        .iter()
        .copied()
        .filter(|duration| *duration <= requested)
        .max()
        .or_else(|| allowed.first().copied())
        .unwrap_or(requested)
}

/// Parameters of a HIIT generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiitRequest {
    /// Requested format
    pub workout_type: HiitFormat,
    /// Requested duration in minutes
    pub duration: i64,
}

/// An AMRAP block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiitBlock {
    /// Display name ("Block 1", ...)
    pub block_name: String,
    /// Rep scheme
    pub rep_scheme: Option<String>,
    /// Movements in order
    pub movements: Vec<PlannedMovement>,
}

/// A generated HIIT session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiitPlan {
    /// Format
    pub workout_type: HiitFormat,
    /// AMRAP layout label ("2 x 4' AMRAPs", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Instructions
    pub structure: String,
    /// Duration in minutes
    pub duration: i64,
    /// Number of alternating pairs (30/30 only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<i64>,
    /// AMRAP blocks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<HiitBlock>,
    /// Movement loop for non-AMRAP formats
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movements: Vec<PlannedMovement>,
}

impl HiitPlan {
    /// Build the save-workout body for this plan
    #[must_use]
    pub fn to_save_request(&self, scheduled_date: Option<NaiveDate>) -> SaveWorkoutRequest {
        let sections = if self.sections.is_empty() {
            vec![block_payload("Workout Block", None, &self.movements)]
        } else {
            self.sections
                .iter()
                .map(|block| {
                    block_payload(&block.block_name, block.rep_scheme.clone(), &block.movements)
                })
                .collect()
        };

        SaveWorkoutRequest {
            name: format!("{} HIIT Workout", self.workout_type.as_str()),
            description: "High-intensity interval training session".to_owned(),
            duration: self.duration,
            status: Some(WorkoutStatus::Started.as_str().to_owned()),
            scheduled_date,
            activity_type: ActivityType::Hiit.as_str().to_owned(),
            sections,
            workout_type: Some(self.workout_type.as_str().to_owned()),
            structure: Some(self.structure.clone()),
            ..SaveWorkoutRequest::default()
        }
    }
}

fn block_payload(
    name: &str,
    rep_scheme: Option<String>,
    movements: &[PlannedMovement],
) -> SectionPayload {
    SectionPayload {
        block_name: Some(name.to_owned()),
        rep_scheme,
        movements: movements
            .iter()
            .enumerate()
            .map(|(index, movement)| SectionMovementPayload {
                movement_name: Some(movement.exercise.clone()),
                exercise: Some(movement.exercise.clone()),
                movement_order: index as i64 + 1,
                rest_period: movement.is_rest(),
            })
            .collect(),
        ..SectionPayload::default()
    }
}

// ============================================================================
// Templates
// ============================================================================

struct AmrapBlockRule {
    rep_scheme: &'static str,
    rules: Vec<MovementRule>,
}

struct AmrapTemplate {
    duration: i64,
    style: &'static str,
    blocks: Vec<AmrapBlockRule>,
}

fn amrap_block(rep_scheme: &'static str, rules: Vec<MovementRule>) -> AmrapBlockRule {
    AmrapBlockRule { rep_scheme, rules }
}

fn base_amrap_blocks() -> [AmrapBlockRule; 6] {
    [
        amrap_block(
            "15-12-10",
            vec![Rule::movement("Squat"), Rule::body_part("Core"), Rule::movement("Push")],
        ),
        amrap_block(
            "8-6-4",
            vec![
                Rule::movement("Lunge"),
                Rule::body_part("Core"),
                Rule::movement_type("Metcon"),
            ],
        ),
        amrap_block(
            "10 + 45s",
            vec![Rule::movement_type("Metcon"), Rule::movement("Conditioning")],
        ),
        amrap_block(
            "12-12-12",
            vec![
                Rule::movement("Squat"),
                Rule::body_part("Core"),
                Rule::movement_type("Metcon"),
            ],
        ),
        amrap_block(
            "10-10-30s",
            vec![
                Rule::movement("Lunge"),
                Rule::movement("Pull H"),
                Rule::movement("Conditioning"),
            ],
        ),
        amrap_block(
            "10-10-30s",
            vec![
                Rule::movement("Hinge"),
                Rule::movement("Push"),
                Rule::movement("Conditioning"),
            ],
        ),
    ]
}

fn amrap_templates(duration: i64) -> Vec<AmrapTemplate> {
    let pairs = |style: &'static str| {
        let [b0, b1, b2, b3, b4, b5] = base_amrap_blocks();
        vec![
            AmrapTemplate {
                duration,
                style,
                blocks: vec![b0, b1],
            },
            AmrapTemplate {
                duration,
                style,
                blocks: vec![b2, b3],
            },
            AmrapTemplate {
                duration,
                style,
                blocks: vec![b4, b5],
            },
        ]
    };

    match duration {
        10 => pairs("2 x 4' AMRAPs"),
        15 => pairs("2 x 6' AMRAPs"),
        20 => {
            let style = "3 x 5' AMRAPs";
            let [b0, b1, b2, b3, b4, b5] = base_amrap_blocks();
            vec![
                AmrapTemplate {
                    duration,
                    style,
                    blocks: vec![
                        b0,
                        b1,
                        amrap_block(
                            "8-6-30s",
                            vec![
                                Rule::movement("Hinge"),
                                Rule::movement_type("Metcon"),
                                Rule::movement("Conditioning"),
                            ],
                        ),
                    ],
                },
                AmrapTemplate {
                    duration,
                    style,
                    blocks: vec![
                        b2,
                        b3,
                        amrap_block(
                            "10-10-60s",
                            vec![
                                Rule::movement("Lunge"),
                                Rule::movement("Push"),
                                Rule::movement("Conditioning"),
                            ],
                        ),
                    ],
                },
                AmrapTemplate {
                    duration,
                    style,
                    blocks: vec![
                        b4,
                        b5,
                        amrap_block(
                            "10-10-30s",
                            vec![
                                Rule::movement("Squat"),
                                Rule::body_part("Core"),
                                Rule::movement("Conditioning"),
                            ],
                        ),
                    ],
                },
            ]
        }
        _ => Vec::new(),
    }
}

fn emom_templates(duration: i64) -> Vec<Vec<MovementRule>> {
    let all = vec![
        vec![
            Rule::movement("Squat"),
            Rule::movement("Conditioning"),
            Rule::body_part("Core"),
            Rule::movement(REST),
        ],
        vec![
            Rule::movement("Lunge"),
            Rule::advanced("Accessory"),
            Rule::movement("Push"),
            Rule::movement(REST),
        ],
        vec![
            Rule::advanced("Accessory"),
            Rule::body_part("Core"),
            Rule::movement("Conditioning"),
            Rule::movement(REST),
        ],
        vec![
            Rule::movement("Squat"),
            Rule::movement("Pull H"),
            Rule::body_part("Core"),
            Rule::movement("Conditioning"),
            Rule::movement(REST),
            Rule::movement("Lunge"),
            Rule::movement("Push H"),
            Rule::body_part("Core"),
            Rule::movement("Conditioning"),
            Rule::movement(REST),
        ],
    ];

    all.into_iter()
        .filter(|rules| match duration {
            15 | 25 => rules.len() < 10,
            40 | 50 => rules.len() == 10,
            _ => true,
        })
        .collect()
}

fn tabata_templates() -> Vec<Vec<MovementRule>> {
    vec![
        vec![
            Rule::movement("Squat"),
            Rule::movement("Push H"),
            Rule::body_part("Core"),
            Rule::movement("Conditioning"),
        ],
        vec![
            Rule::body_part("Lunge"),
            Rule::body_part("Core"),
            Rule::movement_type("Metcon"),
            Rule::movement("Pull H"),
        ],
        vec![
            Rule::movement_type("Metcon"),
            Rule::movement("Lunge"),
            Rule::body_part("Core"),
            Rule::movement("Conditioning"),
        ],
        vec![
            Rule::movement_type("Metcon"),
            Rule::movement("Push V"),
            Rule::movement_type("Metcon"),
            Rule::body_part("Core"),
        ],
    ]
}

fn thirty_thirty_templates(duration: i64) -> Vec<Vec<MovementRule>> {
    match duration {
        10 => vec![
            vec![Rule::movement("Squat"), Rule::movement("Conditioning")],
            vec![Rule::movement("Push"), Rule::advanced("Accessory")],
            vec![Rule::movement("Lunge"), Rule::body_part("Core")],
            vec![Rule::movement("Conditioning"), Rule::body_part("Core")],
        ],
        15 => vec![
            vec![
                Rule::movement("Squat"),
                Rule::body_part("Core"),
                Rule::movement("Conditioning"),
            ],
            vec![
                Rule::movement("Push"),
                Rule::advanced("Accessory"),
                Rule::movement("Lunge"),
            ],
            vec![
                Rule::movement("Lunge"),
                Rule::body_part("Core"),
                Rule::movement("Conditioning"),
            ],
            vec![
                Rule::movement("Conditioning"),
                Rule::body_part("Core"),
                Rule::movement("Conditioning"),
            ],
        ],
        _ => vec![
            vec![
                Rule::movement("Squat"),
                Rule::body_part("Core"),
                Rule::movement("Push"),
                Rule::movement("Conditioning"),
            ],
            vec![
                Rule::movement("Push"),
                Rule::advanced("Accessory"),
                Rule::body_part("Core"),
                Rule::movement("Lunge"),
            ],
            vec![
                Rule::movement("Lunge"),
                Rule::movement("Pull"),
                Rule::body_part("Core"),
                Rule::movement("Conditioning"),
            ],
            vec![
                Rule::movement("Conditioning"),
                Rule::body_part("Core"),
                Rule::movement("Conditioning"),
                Rule::body_part("Core"),
            ],
        ],
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Generate HIIT plans for a request
///
/// A specific format yields [`PLANS_PER_FORMAT`] plans. The mixed format draws
/// from every format valid at the snapped duration and returns at most
/// [`MIXED_PLAN_LIMIT`] plans in random order.
pub fn generate_hiit_plans<R: Rng + ?Sized>(
    catalog: &[Movement],
    request: &HiitRequest,
    rng: &mut R,
) -> Vec<HiitPlan> {
    let pool: Vec<Movement> = catalog
        .iter()
        .filter(|movement| movement.hiit_flag)
        .cloned()
        .collect();
    let format = request.workout_type;
    let duration = snap_duration(request.duration, format.duration_limits());

    debug!(
        format = format.as_str(),
        requested = request.duration,
        snapped = duration,
        pool = pool.len(),
        "Generating HIIT plans"
    );

    if format == HiitFormat::Mixed {
        let mix = [
            (HiitFormat::Tabata, 5),
            (HiitFormat::Amrap, 3),
            (HiitFormat::Emom, 4),
            (HiitFormat::ThirtyThirty, 3),
        ];
        let mut plans = Vec::new();
        for (part, count) in mix {
            if part.duration_limits().contains(&duration) {
                plans.extend(generate_format(&pool, part, duration, count, rng));
            }
        }
        plans.shuffle(rng);
        plans.truncate(MIXED_PLAN_LIMIT);
        return plans;
    }

    let mut plans = generate_format(&pool, format, duration, PLANS_PER_FORMAT, rng);
    plans.shuffle(rng);
    plans
}

fn generate_format<R: Rng + ?Sized>(
    pool: &[Movement],
    format: HiitFormat,
    duration: i64,
    count: usize,
    rng: &mut R,
) -> Vec<HiitPlan> {
    match format {
        HiitFormat::Amrap => {
            let templates = amrap_templates(duration);
            (0..count)
                .filter_map(|_| {
                    let template = templates.choose(rng)?;
                    Some(amrap_plan(pool, template, rng))
                })
                .collect()
        }
        HiitFormat::Emom => loop_plans(
            pool,
            &emom_templates(duration),
            format,
            EMOM_STRUCTURE,
            duration,
            count,
            rng,
        ),
        HiitFormat::Tabata => loop_plans(
            pool,
            &tabata_templates(),
            format,
            TABATA_STRUCTURE,
            duration,
            count,
            rng,
        ),
        HiitFormat::ThirtyThirty => loop_plans(
            pool,
            &thirty_thirty_templates(duration),
            format,
            THIRTY_THIRTY_STRUCTURE,
            duration,
            count,
            rng,
        ),
        HiitFormat::Mixed => Vec::new(),
    }
}

fn amrap_plan<R: Rng + ?Sized>(
    pool: &[Movement],
    template: &AmrapTemplate,
    rng: &mut R,
) -> HiitPlan {
    let mut picker = MovementPicker::new(pool);
    let sections = template
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| HiitBlock {
            block_name: format!("Block {}", index + 1),
            rep_scheme: Some(block.rep_scheme.to_owned()),
            movements: picker.pick_all(&block.rules, rng),
        })
        .collect();

    HiitPlan {
        workout_type: HiitFormat::Amrap,
        style: Some(template.style.to_owned()),
        structure: format!("Complete {} {AMRAP_STRUCTURE_SUFFIX}", template.style),
        duration: template.duration,
        blocks: None,
        sections,
        movements: Vec::new(),
    }
}

fn loop_plans<R: Rng + ?Sized>(
    pool: &[Movement],
    templates: &[Vec<MovementRule>],
    format: HiitFormat,
    structure: &str,
    duration: i64,
    count: usize,
    rng: &mut R,
) -> Vec<HiitPlan> {
    (0..count)
        .filter_map(|_| {
            let rules = templates.choose(rng)?;
            let movements = MovementPicker::new(pool).pick_all(rules, rng);
            Some(HiitPlan {
                workout_type: format,
                style: None,
                structure: structure.to_owned(),
                duration,
                blocks: (format == HiitFormat::ThirtyThirty).then_some(rules.len() as i64 / 2),
                sections: Vec::new(),
                movements,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn hiit_movement(id: i64, exercise: &str, pattern: &str, part: &str) -> Movement {
        Movement {
            id,
            exercise: exercise.to_owned(),
            body_area: "Full body".to_owned(),
            movement: pattern.to_owned(),
            complexity: 1,
            movement_type: "Metcon".to_owned(),
            primary_body_part: part.to_owned(),
            advanced_movements: "Accessory".to_owned(),
            hiit_flag: true,
        }
    }

    fn catalog() -> Vec<Movement> {
        let mut movements = vec![
            hiit_movement(1, "Air Squat", "Squat", "Legs"),
            hiit_movement(2, "Push Up", "Push H", "Chest"),
            hiit_movement(3, "Plank", "Core", "Core"),
            hiit_movement(4, "Assault Bike", "Conditioning", "Full body"),
            hiit_movement(5, "Walking Lunge", "Lunge", "Legs"),
            hiit_movement(6, "KB Swing", "Hinge", "Posterior chain"),
            hiit_movement(7, "Ring Row", "Pull H", "Back"),
        ];
        let mut barbell = hiit_movement(8, "Back Squat", "Squat", "Legs");
        barbell.hiit_flag = false;
        movements.push(barbell);
        movements
    }

    #[test]
    fn test_snap_duration() {
        assert_eq!(snap_duration(17, HiitFormat::Amrap.duration_limits()), 15);
        assert_eq!(snap_duration(5, HiitFormat::Tabata.duration_limits()), 10);
        assert_eq!(snap_duration(60, HiitFormat::Emom.duration_limits()), 50);
        assert_eq!(snap_duration(20, HiitFormat::ThirtyThirty.duration_limits()), 20);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(HiitFormat::parse("amrap"), Some(HiitFormat::Amrap));
        assert_eq!(HiitFormat::parse("30/30"), Some(HiitFormat::ThirtyThirty));
        assert_eq!(HiitFormat::parse("I don't mind"), Some(HiitFormat::Mixed));
        assert_eq!(HiitFormat::parse("Crossfit"), None);
    }

    #[test]
    fn test_amrap_twenty_minutes_has_three_blocks() {
        let mut rng = StdRng::seed_from_u64(9);
        let request = HiitRequest {
            workout_type: HiitFormat::Amrap,
            duration: 20,
        };

        let plans = generate_hiit_plans(&catalog(), &request, &mut rng);

        assert_eq!(plans.len(), PLANS_PER_FORMAT);
        for plan in &plans {
            assert_eq!(plan.sections.len(), 3);
            assert_eq!(plan.style.as_deref(), Some("3 x 5' AMRAPs"));
            assert_eq!(
                plan.structure,
                "Complete 3 x 5' AMRAPs with 1-3 mins rest in between"
            );
            assert_eq!(plan.sections[0].block_name, "Block 1");
        }
    }

    #[test]
    fn test_amrap_without_templates_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(9);
        let request = HiitRequest {
            workout_type: HiitFormat::Amrap,
            duration: 30,
        };
        assert!(generate_hiit_plans(&catalog(), &request, &mut rng).is_empty());
    }

    #[test]
    fn test_emom_long_sessions_use_ten_movement_template() {
        let mut rng = StdRng::seed_from_u64(2);
        let request = HiitRequest {
            workout_type: HiitFormat::Emom,
            duration: 45,
        };

        let plans = generate_hiit_plans(&catalog(), &request, &mut rng);
        assert!(plans
            .iter()
            .all(|plan| plan.duration == 40 && plan.movements.len() == 10));
        assert!(plans
            .iter()
            .all(|plan| plan.movements.iter().filter(|m| m.is_rest()).count() == 2));
    }

    #[test]
    fn test_thirty_thirty_block_count() {
        let mut rng = StdRng::seed_from_u64(4);
        let request = HiitRequest {
            workout_type: HiitFormat::ThirtyThirty,
            duration: 15,
        };

        let plans = generate_hiit_plans(&catalog(), &request, &mut rng);
        assert!(plans.iter().all(|plan| plan.blocks == Some(1)));
    }

    #[test]
    fn test_only_hiit_flagged_movements_are_used() {
        let mut rng = StdRng::seed_from_u64(8);
        let request = HiitRequest {
            workout_type: HiitFormat::Tabata,
            duration: 10,
        };

        for plan in generate_hiit_plans(&catalog(), &request, &mut rng) {
            assert!(plan.movements.iter().all(|m| m.id != Some(8)));
        }
    }

    #[test]
    fn test_mixed_plans_are_capped() {
        let mut rng = StdRng::seed_from_u64(21);
        let request = HiitRequest {
            workout_type: HiitFormat::Mixed,
            duration: 15,
        };

        let plans = generate_hiit_plans(&catalog(), &request, &mut rng);
        assert_eq!(plans.len(), MIXED_PLAN_LIMIT);
        assert!(plans.iter().any(|plan| plan.workout_type == HiitFormat::Tabata));
    }

    #[test]
    fn test_save_request_for_loop_format() {
        let mut rng = StdRng::seed_from_u64(13);
        let request = HiitRequest {
            workout_type: HiitFormat::Emom,
            duration: 20,
        };
        let plan = generate_hiit_plans(&catalog(), &request, &mut rng).remove(0);

        let save = plan.to_save_request(None);
        assert_eq!(save.name, "EMOM HIIT Workout");
        assert_eq!(save.activity_type, "Hiit");
        assert_eq!(save.sections.len(), 1);
        assert_eq!(save.sections[0].block_name.as_deref(), Some("Workout Block"));
        assert!(save.sections[0]
            .movements
            .iter()
            .any(|movement| movement.rest_period));
    }
}
