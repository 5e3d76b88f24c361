// ABOUTME: Catalog seeding for movements, equipment, workout templates, and chat rooms
// ABOUTME: Loads the embedded catalog document and upserts it into the database
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Catalog Seeding
//!
//! Movements and chat rooms are upserted by name, so reseeding is safe.
//! Templates carry no natural key: they are inserted only into an empty
//! catalog unless `force` clears them first.

use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    ConditioningTemplate, MobilityWorkoutTemplate, RunningSessionTemplate,
    SuggestedStrengthTemplate,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::database::{Database, MovementSeed};

const EMBEDDED_CATALOG: &str = include_str!("catalog.json");

/// The full seed document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    /// Movements with the equipment they need
    #[serde(default)]
    pub movements: Vec<MovementSeed>,
    /// Running templates
    #[serde(default)]
    pub running_sessions: Vec<RunningSessionTemplate>,
    /// Mobility templates
    #[serde(default)]
    pub mobility_workouts: Vec<MobilityWorkoutTemplate>,
    /// Suggested strength templates
    #[serde(default)]
    pub suggested_strength: Vec<SuggestedStrengthTemplate>,
    /// Conditioning templates
    #[serde(default)]
    pub conditioning: Vec<ConditioningTemplate>,
    /// Default chat room names
    #[serde(default)]
    pub chat_rooms: Vec<String>,
}

impl CatalogSeed {
    /// The catalog compiled into the binary
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document does not parse
    pub fn embedded() -> AppResult<Self> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parse a seed document
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the document is not a valid catalog
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::invalid_input(format!("Invalid catalog document: {e}")))
    }

    /// Number of templates across every kind
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.running_sessions.len()
            + self.mobility_workouts.len()
            + self.suggested_strength.len()
            + self.conditioning.len()
    }
}

/// What a seeding run wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Movements inserted or updated
    pub movements: usize,
    /// Templates inserted
    pub templates: usize,
    /// Templates left alone because the catalog already had some
    pub templates_skipped: bool,
    /// Chat rooms newly created
    pub chat_rooms: usize,
}

/// Seed the embedded catalog
///
/// # Errors
///
/// Returns an error if the embedded document is invalid or a write fails
pub async fn seed_catalog(database: &Database, force: bool) -> AppResult<SeedReport> {
    let seed = CatalogSeed::embedded()?;
    apply_seed(database, &seed, force).await
}

/// Upsert a seed document into the database
///
/// # Errors
///
/// Returns an error if any write fails
pub async fn apply_seed(database: &Database, seed: &CatalogSeed, force: bool) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    let movements = database.movements();
    for movement in &seed.movements {
        let id = movements.upsert_movement(movement).await?;
        debug!(movement_id = id, exercise = %movement.exercise, "Seeded movement");
        report.movements += 1;
    }

    let catalog = database.catalog();
    let existing = catalog.template_count().await?;
    if existing > 0 && !force {
        info!(existing, "Templates already present, skipping (use --force to replace)");
        report.templates_skipped = true;
    } else {
        if existing > 0 {
            info!(existing, "Clearing existing templates");
            catalog.clear_templates().await?;
        }
        for template in &seed.running_sessions {
            catalog.insert_running_session(template).await?;
        }
        for template in &seed.mobility_workouts {
            catalog.insert_mobility_workout(template).await?;
        }
        for template in &seed.suggested_strength {
            catalog.insert_suggested_strength(template).await?;
        }
        for template in &seed.conditioning {
            catalog.insert_conditioning(template).await?;
        }
        report.templates = seed.template_count();
    }

    let chat = database.chat();
    for name in &seed.chat_rooms {
        if chat.ensure_room(name).await? {
            report.chat_rooms += 1;
        }
    }

    info!(
        movements = report.movements,
        templates = report.templates,
        chat_rooms = report.chat_rooms,
        "Catalog seeded"
    );
    Ok(report)
}
