// ABOUTME: Movement catalog and equipment types
// ABOUTME: Exercise metadata used by workout building, history, and the workout planner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// A catalog exercise with the metadata the planners filter on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Catalog ID
    pub id: i64,
    /// Exercise name, unique across the catalog
    pub exercise: String,
    /// Body area ("Upper body", "Lower body", "Full body", ...)
    #[serde(default)]
    pub body_area: String,
    /// Movement pattern ("Squat", "Push", "Conditioning", ...)
    #[serde(default)]
    pub movement: String,
    /// Technical complexity from 1 (simple) to 3 (advanced)
    #[serde(default)]
    pub complexity: i64,
    /// Role in a session ("Warm Up", "Primary", "Secondary", "Accessory", "Metcon")
    #[serde(default)]
    pub movement_type: String,
    /// Main body part trained
    #[serde(default)]
    pub primary_body_part: String,
    /// Extra pattern tags used by HIIT rules
    #[serde(default)]
    pub advanced_movements: String,
    /// Whether the movement is suitable for HIIT formats
    #[serde(default)]
    pub hiit_flag: bool,
}

impl Movement {
    /// Field lookup used by rule-based selection
    #[must_use]
    pub fn field(&self, key: MovementField) -> &str {
        match key {
            MovementField::Movement => &self.movement,
            MovementField::AdvancedMovements => &self.advanced_movements,
            MovementField::PrimaryBodyPart => &self.primary_body_part,
            MovementField::MovementType => &self.movement_type,
        }
    }
}

/// Movement attributes that selection rules may match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementField {
    /// Movement pattern
    Movement,
    /// Advanced pattern tags
    AdvancedMovements,
    /// Primary body part
    PrimaryBodyPart,
    /// Session role
    MovementType,
}

/// A piece of gym equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Equipment ID
    pub id: i64,
    /// Display name, unique
    pub equipment_name: String,
}
