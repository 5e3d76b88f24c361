// ABOUTME: Chat route handlers for community rooms and their message streams
// ABOUTME: Room listing is public; creating rooms and reading or posting messages need a token
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Chat routes
//!
//! Messages are paged newest first with `offset`/`limit`; the limit is
//! clamped so a client cannot ask for the whole room at once.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use repforge_core::constants::chat::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use repforge_core::errors::AppError;
use repforge_core::models::{CreateRoomRequest, PostMessageRequest};
use serde::Deserialize;
use tracing::info;

use crate::middleware::AuthUser;
use crate::resources::ServerResources;

/// Paging query for room messages
#[derive(Debug, Default, Deserialize)]
pub struct MessagePageQuery {
    /// Messages to skip, newest first
    #[serde(default)]
    pub offset: Option<i64>,
    /// Page size
    #[serde(default)]
    pub limit: Option<i64>,
}

impl MessagePageQuery {
    /// Offset and limit after defaults and clamping
    #[must_use]
    pub fn window(&self) -> (i64, i64) {
        let offset = self.offset.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (offset, limit)
    }
}

/// Chat routes implementation
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/chat/rooms/",
                get(Self::handle_list_rooms).post(Self::handle_create_room),
            )
            .route(
                "/api/chat/rooms/:room_id/messages/",
                get(Self::handle_list_messages).post(Self::handle_post_message),
            )
            .with_state(resources)
    }

    /// Handle GET /api/chat/rooms/
    async fn handle_list_rooms(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let rooms = resources.database.chat().list_rooms().await?;
        Ok((StatusCode::OK, Json(rooms)).into_response())
    }

    /// Handle POST /api/chat/rooms/
    async fn handle_create_room(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Json(request): Json<CreateRoomRequest>,
    ) -> Result<Response, AppError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Room name is required"));
        }

        let room = resources.database.chat().create_room(name).await?;
        info!(user_id = auth.user_id, room_id = room.id, "Chat room created");
        Ok((StatusCode::CREATED, Json(room)).into_response())
    }

    /// Handle GET /api/chat/rooms/{id}/messages/
    async fn handle_list_messages(
        State(resources): State<Arc<ServerResources>>,
        _auth: AuthUser,
        Path(room_id): Path<i64>,
        Query(query): Query<MessagePageQuery>,
    ) -> Result<Response, AppError> {
        let chat = resources.database.chat();
        if !chat.room_exists(room_id).await? {
            return Err(AppError::not_found("Chat room"));
        }

        let (offset, limit) = query.window();
        let messages = chat.list_messages(room_id, offset, limit).await?;
        Ok((StatusCode::OK, Json(messages)).into_response())
    }

    /// Handle POST /api/chat/rooms/{id}/messages/
    async fn handle_post_message(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthUser,
        Path(room_id): Path<i64>,
        Json(request): Json<PostMessageRequest>,
    ) -> Result<Response, AppError> {
        let owner_id = auth.ensure_matches(request.user_id)?;
        let content = request.content.trim();
        if content.is_empty() {
            return Err(AppError::invalid_input("Message content is required"));
        }

        let chat = resources.database.chat();
        if !chat.room_exists(room_id).await? {
            return Err(AppError::not_found("Chat room"));
        }

        let message = chat.post_message(room_id, owner_id, content).await?;
        Ok((StatusCode::CREATED, Json(message)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_window_defaults_and_clamps() {
        assert_eq!(MessagePageQuery::default().window(), (0, DEFAULT_PAGE_SIZE));

        let oversized = MessagePageQuery {
            offset: Some(-5),
            limit: Some(10_000),
        };
        assert_eq!(oversized.window(), (0, MAX_PAGE_SIZE));

        let empty = MessagePageQuery {
            offset: Some(40),
            limit: Some(0),
        };
        assert_eq!(empty.window(), (40, 1));
    }
}
