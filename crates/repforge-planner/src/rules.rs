// ABOUTME: Movement selection rules shared by the HIIT templates
// ABOUTME: Matches catalog movements on a field and picks random unused candidates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use repforge_core::models::{Movement, MovementField};
use serde::{Deserialize, Serialize};

/// Placeholder exercise name for rest slots
pub const REST: &str = "Rest";

/// How a rule compares the movement field to its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    /// Substring match
    #[default]
    Contains,
}

/// A single slot in a template: which movement attribute to match and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRule {
    /// Attribute to inspect
    pub key: MovementField,
    /// Value to look for
    pub value: String,
    /// Comparison
    #[serde(default)]
    pub operator: RuleOperator,
}

impl MovementRule {
    /// Rule on the movement pattern
    #[must_use]
    pub fn movement(value: &str) -> Self {
        Self::new(MovementField::Movement, value)
    }

    /// Rule on the advanced pattern tags
    #[must_use]
    pub fn advanced(value: &str) -> Self {
        Self::new(MovementField::AdvancedMovements, value)
    }

    /// Rule on the primary body part
    #[must_use]
    pub fn body_part(value: &str) -> Self {
        Self::new(MovementField::PrimaryBodyPart, value)
    }

    /// Rule on the session role
    #[must_use]
    pub fn movement_type(value: &str) -> Self {
        Self::new(MovementField::MovementType, value)
    }

    fn new(key: MovementField, value: &str) -> Self {
        Self {
            key,
            value: value.to_owned(),
            operator: RuleOperator::Contains,
        }
    }

    /// Whether the movement satisfies this rule
    #[must_use]
    pub fn matches(&self, movement: &Movement) -> bool {
        match self.operator {
            RuleOperator::Contains => movement.field(self.key).contains(self.value.as_str()),
        }
    }

    /// Conditioning slots may reuse a movement
    fn allows_repeats(&self) -> bool {
        self.value.to_lowercase().contains("conditioning")
    }

    fn is_rest(&self) -> bool {
        self.key == MovementField::Movement && self.value == REST
    }
}

/// A movement chosen for a plan, or a named placeholder when nothing matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMovement {
    /// Catalog ID, absent for placeholders
    pub id: Option<i64>,
    /// Exercise name
    pub exercise: String,
}

impl PlannedMovement {
    /// A catalog movement
    #[must_use]
    pub fn from_catalog(movement: &Movement) -> Self {
        Self {
            id: Some(movement.id),
            exercise: movement.exercise.clone(),
        }
    }

    /// A named slot that is not backed by the catalog
    #[must_use]
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            id: None,
            exercise: name.into(),
        }
    }

    /// Whether this slot is a rest period
    #[must_use]
    pub fn is_rest(&self) -> bool {
        self.exercise == REST
    }
}

/// Picks movements for one plan, never handing out the same exercise twice
/// unless the rule allows repeats
#[derive(Debug)]
pub struct MovementPicker<'a> {
    pool: &'a [Movement],
    used: HashSet<String>,
}

impl<'a> MovementPicker<'a> {
    /// Start a fresh plan over the given pool
    #[must_use]
    pub fn new(pool: &'a [Movement]) -> Self {
        Self {
            pool,
            used: HashSet::new(),
        }
    }

    /// Pick a movement for the rule, falling back to a placeholder named after the rule value
    pub fn pick<R: Rng + ?Sized>(&mut self, rule: &MovementRule, rng: &mut R) -> PlannedMovement {
        if rule.is_rest() {
            return PlannedMovement::placeholder(REST);
        }

        let mut candidates: Vec<&Movement> =
            self.pool.iter().filter(|movement| rule.matches(movement)).collect();
        candidates.shuffle(rng);

        let repeats = rule.allows_repeats();
        let chosen = candidates
            .into_iter()
            .find(|movement| repeats || !self.used.contains(&movement.exercise));

        chosen.map_or_else(
            || PlannedMovement::placeholder(rule.value.clone()),
            |movement| {
                self.used.insert(movement.exercise.clone());
                PlannedMovement::from_catalog(movement)
            },
        )
    }

    /// Pick one movement per rule, in order
    pub fn pick_all<R: Rng + ?Sized>(
        &mut self,
        rules: &[MovementRule],
        rng: &mut R,
    ) -> Vec<PlannedMovement> {
        rules.iter().map(|rule| self.pick(rule, rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn movement(id: i64, exercise: &str, pattern: &str) -> Movement {
        Movement {
            id,
            exercise: exercise.to_owned(),
            body_area: "Full body".to_owned(),
            movement: pattern.to_owned(),
            complexity: 1,
            movement_type: "Metcon".to_owned(),
            primary_body_part: "Legs".to_owned(),
            advanced_movements: String::new(),
            hiit_flag: true,
        }
    }

    #[test]
    fn test_rule_contains_match() {
        let squat = movement(1, "Goblet Squat", "Squat");
        assert!(MovementRule::movement("Squat").matches(&squat));
        assert!(!MovementRule::movement("Push").matches(&squat));
        assert!(MovementRule::movement_type("Met").matches(&squat));
    }

    #[test]
    fn test_picker_does_not_reuse_movements() {
        let pool = vec![movement(1, "Goblet Squat", "Squat")];
        let mut rng = StdRng::seed_from_u64(7);
        let mut picker = MovementPicker::new(&pool);

        let first = picker.pick(&MovementRule::movement("Squat"), &mut rng);
        let second = picker.pick(&MovementRule::movement("Squat"), &mut rng);

        assert_eq!(first.id, Some(1));
        assert_eq!(second, PlannedMovement::placeholder("Squat"));
    }

    #[test]
    fn test_conditioning_rules_may_repeat() {
        let pool = vec![movement(4, "Row Sprint", "Conditioning")];
        let mut rng = StdRng::seed_from_u64(7);
        let mut picker = MovementPicker::new(&pool);
        let rule = MovementRule::movement("Conditioning");

        assert_eq!(picker.pick(&rule, &mut rng).id, Some(4));
        assert_eq!(picker.pick(&rule, &mut rng).id, Some(4));
    }

    #[test]
    fn test_rest_rule_yields_rest_placeholder() {
        let pool = vec![movement(9, "Rest Walk", "Rest")];
        let mut rng = StdRng::seed_from_u64(1);
        let mut picker = MovementPicker::new(&pool);

        let slot = picker.pick(&MovementRule::movement(REST), &mut rng);
        assert!(slot.is_rest());
        assert_eq!(slot.id, None);
    }
}
