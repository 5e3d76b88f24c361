// ABOUTME: Single-owner notification list with ordered, ticketed refreshes
// ABOUTME: Stale refresh responses that resolve after a newer refresh or a clear are dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Notification Center
//!
//! The notification list is shared by every screen. All changes go through
//! [`NotificationCenter::dispatch`], and refreshes carry a [`RefreshTicket`]
//! taken when the request was issued. A response is applied only if no newer
//! ticket has been applied and no clear happened since it was issued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use repforge_core::models::ScheduledNotification;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};

/// Issue order of a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Changes to the notification list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    /// Replace the list with a fetched one; unsent entries are dropped
    Replace {
        /// Ticket taken when the fetch was issued
        ticket: RefreshTicket,
        /// Fetched entries
        notifications: Vec<ScheduledNotification>,
    },
    /// Empty the list
    Clear,
    /// Mark one entry read
    MarkRead(i64),
}

/// Notification list state
#[derive(Debug, Default, Clone)]
pub struct NotificationCenter {
    notifications: Vec<ScheduledNotification>,
    read: HashSet<i64>,
    issued: u64,
    applied: u64,
}

impl NotificationCenter {
    /// Empty center
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket before issuing a refresh request
    pub fn issue(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Apply an action, returning whether it changed state
    pub fn dispatch(&mut self, action: NotificationAction) -> bool {
        match action {
            NotificationAction::Replace {
                ticket,
                notifications,
            } => {
                if ticket.0 <= self.applied {
                    debug!(ticket = ticket.0, applied = self.applied, "Dropping stale refresh");
                    return false;
                }
                self.applied = ticket.0;
                self.notifications = notifications
                    .into_iter()
                    .filter(|notification| notification.sent)
                    .collect();
                let live: HashSet<i64> = self.notifications.iter().map(|n| n.id).collect();
                self.read.retain(|id| live.contains(id));
                true
            }
            NotificationAction::Clear => {
                self.applied = self.issued;
                self.notifications.clear();
                self.read.clear();
                true
            }
            NotificationAction::MarkRead(id) => {
                self.notifications.iter().any(|n| n.id == id) && self.read.insert(id)
            }
        }
    }

    /// Current entries
    #[must_use]
    pub fn notifications(&self) -> &[ScheduledNotification] {
        &self.notifications
    }

    /// Entries not yet marked read
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|notification| !self.read.contains(&notification.id))
            .count()
    }
}

/// Cloneable handle that serializes access to one [`NotificationCenter`]
#[derive(Debug, Default, Clone)]
pub struct NotificationStore {
    inner: Arc<Mutex<NotificationCenter>>,
}

impl NotificationStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action
    ///
    /// # Errors
    ///
    /// Returns an error if a previous holder panicked while dispatching
    pub fn dispatch(&self, action: NotificationAction) -> ClientResult<bool> {
        Ok(self.lock()?.dispatch(action))
    }

    /// Copy of the current entries and unread count
    ///
    /// # Errors
    ///
    /// Returns an error if a previous holder panicked while dispatching
    pub fn snapshot(&self) -> ClientResult<(Vec<ScheduledNotification>, usize)> {
        let center = self.lock()?;
        Ok((center.notifications().to_vec(), center.unread_count()))
    }

    /// Fetch the list and apply it unless a newer refresh or a clear got there first
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails
    pub async fn refresh(&self, api: &ApiClient) -> ClientResult<bool> {
        let ticket = self.lock()?.issue();
        let list = api.notifications().await?;
        self.dispatch(NotificationAction::Replace {
            ticket,
            notifications: list.notifications,
        })
    }

    /// Clear on the server, then locally
    ///
    /// # Errors
    ///
    /// Returns an error if the server call fails
    pub async fn clear(&self, api: &ApiClient) -> ClientResult<()> {
        api.clear_notifications().await?;
        self.dispatch(NotificationAction::Clear).map(drop)
    }

    fn lock(&self) -> ClientResult<MutexGuard<'_, NotificationCenter>> {
        self.inner.lock().map_err(ClientError::session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn notification(id: i64, sent: bool) -> ScheduledNotification {
        let now = Utc::now();
        ScheduledNotification {
            id,
            owner_id: 1,
            workout_id: None,
            scheduled_datetime: now,
            sent,
            canceled: false,
            title: "Workout reminder".to_owned(),
            subtitle: None,
            body: "Legs is scheduled for today".to_owned(),
            cleared_by_user: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_replace_keeps_sent_only() {
        let mut center = NotificationCenter::new();
        let ticket = center.issue();
        assert!(center.dispatch(NotificationAction::Replace {
            ticket,
            notifications: vec![notification(1, true), notification(2, false)],
        }));
        assert_eq!(center.notifications().len(), 1);
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_stale_refresh_is_dropped() {
        let mut center = NotificationCenter::new();
        let older = center.issue();
        let newer = center.issue();

        assert!(center.dispatch(NotificationAction::Replace {
            ticket: newer,
            notifications: vec![notification(2, true)],
        }));
        assert!(!center.dispatch(NotificationAction::Replace {
            ticket: older,
            notifications: vec![notification(1, true), notification(3, true)],
        }));
        assert_eq!(center.notifications()[0].id, 2);
    }

    #[test]
    fn test_clear_invalidates_in_flight_refresh() {
        let mut center = NotificationCenter::new();
        let in_flight = center.issue();
        center.dispatch(NotificationAction::Clear);

        assert!(!center.dispatch(NotificationAction::Replace {
            ticket: in_flight,
            notifications: vec![notification(1, true)],
        }));
        assert!(center.notifications().is_empty());
    }

    #[test]
    fn test_mark_read() {
        let mut center = NotificationCenter::new();
        let ticket = center.issue();
        center.dispatch(NotificationAction::Replace {
            ticket,
            notifications: vec![notification(1, true), notification(2, true)],
        });

        assert!(center.dispatch(NotificationAction::MarkRead(1)));
        assert!(!center.dispatch(NotificationAction::MarkRead(1)));
        assert!(!center.dispatch(NotificationAction::MarkRead(99)));
        assert_eq!(center.unread_count(), 1);
    }
}
