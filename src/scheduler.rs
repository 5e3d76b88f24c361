// ABOUTME: Background scheduler for leaderboard, user stats, and reminder release jobs
// ABOUTME: Runs interval loops until the server signals shutdown through a watch channel
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Scheduler
//!
//! Three independent loops share one task:
//! - leaderboard recompute every `leaderboard_refresh_secs`
//! - user statistics recompute every `user_stats_refresh_secs`
//! - reminder release every `notification_poll_secs`
//!
//! A failing job is logged and retried on its next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::SchedulerConfig;
use crate::database::today;
use crate::resources::ServerResources;
use crate::services::{progress, reminders};

/// Background job runner
pub struct Scheduler {
    resources: Arc<ServerResources>,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler from the resources' configuration
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        let config = resources.config.scheduler.clone();
        Self { resources, config }
    }

    /// Spawn the job loop; it exits when `shutdown` changes or its sender drops
    ///
    /// Returns `None` when the scheduler is disabled.
    #[must_use]
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            info!("Background scheduler disabled");
            return None;
        }

        info!(
            leaderboard_secs = self.config.leaderboard_refresh_secs,
            user_stats_secs = self.config.user_stats_refresh_secs,
            notification_secs = self.config.notification_poll_secs,
            "Starting background scheduler"
        );
        Some(tokio::spawn(self.run(shutdown)))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut leaderboard = ticker(self.config.leaderboard_refresh_secs);
        let mut user_stats = ticker(self.config.user_stats_refresh_secs);
        let mut notifications = ticker(self.config.notification_poll_secs);

        loop {
            tokio::select! {
                _ = leaderboard.tick() => self.run_leaderboard().await,
                _ = user_stats.tick() => self.run_user_stats().await,
                _ = notifications.tick() => self.run_notifications().await,
                _ = shutdown.changed() => {
                    debug!("Scheduler received shutdown signal");
                    break;
                }
            }
        }
        info!("Background scheduler stopped");
    }

    async fn run_leaderboard(&self) {
        if let Err(e) = progress::refresh_leaderboard(&self.resources, today()).await {
            error!(error = %e, "Leaderboard recompute failed");
        }
    }

    async fn run_user_stats(&self) {
        if let Err(e) = progress::refresh_all_user_stats(&self.resources, today()).await {
            error!(error = %e, "User stats recompute failed");
        }
    }

    async fn run_notifications(&self) {
        if let Err(e) = reminders::release_due_reminders(&self.resources, Utc::now()).await {
            error!(error = %e, "Reminder release failed");
        }
    }
}

// `interval` panics on a zero period
fn ticker(period_secs: u64) -> Interval {
    let mut ticker = interval(Duration::from_secs(period_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
