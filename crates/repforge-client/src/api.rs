// ABOUTME: Typed HTTP client for every Repforge server endpoint
// ABOUTME: Attaches the stored bearer token and maps non-success responses to ClientError::Http
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # API Client
//!
//! One method per server endpoint. Calls are single-shot: there is no retry,
//! backoff, or idempotency key, and the first failure is returned to the
//! caller as-is.

use std::time::Duration;

use chrono::NaiveDate;
use repforge_core::constants::service;
use repforge_core::models::{
    ChatMessage, ChatRoom, ClearNotificationsRequest, ConditioningTemplate, CreateRoomRequest,
    DateUpdateRequest, Equipment, EquipmentFilter, EquipmentFilterRequest, FullProfile,
    LeaderboardEntry, LoginRequest, LoginResponse, MessageResponse, MobilityWorkoutTemplate,
    Movement, MovementSummaryResponse, NotificationList, PostMessageRequest,
    ProfileUpdateRequest, PushTokenRequest, RegisterRequest, RegisterResponse,
    RunningCompletionRequest, RunningSessionTemplate, SaveWorkoutRequest, SaveWorkoutResponse,
    SessionCompletionRequest, SingleWorkoutResponse, StatusResponse, StatusUpdateRequest,
    SuggestedStrengthTemplate, User, UserStats, Workout, WorkoutLogRequest, WorkoutStatus,
};
use repforge_planner::{GymPlan, GymRequest, HiitPlan, HiitRequest};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Request timeout applied to every call
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client bound to one server and one session
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8081`)
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized
    pub fn new(base_url: impl Into<String>, session: Session) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(format!("{}/{}", service::CLIENT, env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            session,
        })
    }

    /// Session this client reads its token from
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    // ========================================================================
    // Auth and profile
    // ========================================================================

    /// Create an account and sign in with the returned token
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the registration
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<RegisterResponse> {
        let response: RegisterResponse =
            Self::send(self.request(Method::POST, "/api/auth/register/")?.json(request)).await?;
        self.session.sign_in(&response.token, response.user_id)?;
        Ok(response)
    }

    /// Sign in and store the session
    ///
    /// # Errors
    ///
    /// Returns an error on bad credentials or a transport failure
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let body = LoginRequest {
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
        };
        let response: LoginResponse =
            Self::send(self.request(Method::POST, "/api/auth/login/")?.json(&body)).await?;

        self.session.sign_in(&response.token, response.user_id)?;
        if response.user.is_onboarding_complete {
            self.session.complete_onboarding()?;
        }
        Ok(response)
    }

    /// Forget the local session
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written
    pub fn logout(&self) -> ClientResult<()> {
        self.session.sign_out()
    }

    /// Public profile of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist
    pub async fn profile(&self, user_id: i64) -> ClientResult<User> {
        Self::send(self.request(Method::GET, &format!("/api/auth/profile/{user_id}/"))?)
            .await
    }

    /// Profile of the signed-in user with workout and leaderboard stats
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn full_profile(&self) -> ClientResult<FullProfile> {
        let user_id = self.session.require_user_id()?;
        Self::send(self.request(Method::GET, &format!("/api/auth/full-profile/{user_id}/"))?)
            .await
    }

    /// Update the signed-in user's profile
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken or the call fails
    pub async fn update_profile(&self, update: &ProfileUpdateRequest) -> ClientResult<User> {
        let user_id = self.session.require_user_id()?;
        Self::send(
            self.request(Method::PATCH, &format!("/api/auth/update-profile/{user_id}/"))?
                .json(update),
        )
        .await
    }

    /// Mark onboarding finished on the server and locally
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn complete_onboarding(&self) -> ClientResult<MessageResponse> {
        let user_id = self.session.require_user_id()?;
        let path = format!("/api/auth/complete-onboarding/{user_id}/");
        let response = Self::send(self.request(Method::POST, &path)?).await?;
        self.session.complete_onboarding()?;
        Ok(response)
    }

    // ========================================================================
    // Movement catalog
    // ========================================================================

    /// Every movement in the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is empty or the call fails
    pub async fn movements(&self) -> ClientResult<Vec<Movement>> {
        Self::send(self.request(Method::GET, "/api/movements/extract-movements/")?)
            .await
    }

    /// Movements usable with a saved equipment filter
    ///
    /// # Errors
    ///
    /// Returns an error if the filter does not exist or the call fails
    pub async fn filtered_movements(&self, filter_id: Option<i64>) -> ClientResult<Vec<Movement>> {
        let mut builder = self.request(Method::GET, "/api/movements/filtered-movements/")?;
        if let Some(filter_id) = filter_id {
            builder = builder.query(&[("filter_id", filter_id)]);
        }
        Self::send(builder).await
    }

    /// Every piece of equipment
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn equipment(&self) -> ClientResult<Vec<Equipment>> {
        Self::send(self.request(Method::GET, "/api/equipment/")?).await
    }

    // ========================================================================
    // Saved workouts
    // ========================================================================

    /// Persist a workout for the signed-in user
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails on the server
    pub async fn save_workout(&self, request: &SaveWorkoutRequest) -> ClientResult<SaveWorkoutResponse> {
        let mut body = request.clone();
        body.user_id = Some(self.session.require_user_id()?);
        Self::send(
            self.request(Method::POST, "/api/saved_workouts/save-workout/")?
                .json(&body),
        )
        .await
    }

    /// All of the signed-in user's workouts, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn all_workouts(&self) -> ClientResult<Vec<Workout>> {
        Self::send(self.user_request(Method::GET, "/api/saved_workouts/get-all-workouts/")?)
            .await
    }

    /// Upcoming workouts in date order, or recent ones when `upcoming` is false
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn upcoming_workouts(
        &self,
        upcoming: bool,
        limit: Option<i64>,
    ) -> ClientResult<Vec<Workout>> {
        let mut builder = self
            .user_request(Method::GET, "/api/saved_workouts/upcoming-workouts/")?
            .query(&[("upcoming", upcoming)]);
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }
        Self::send(builder).await
    }

    /// One fully populated workout with per-movement history
    ///
    /// # Errors
    ///
    /// Returns an error if the workout is missing or not owned by the user
    pub async fn single_workout(&self, workout_id: i64) -> ClientResult<SingleWorkoutResponse> {
        Self::send(self.user_request(
            Method::GET,
            &format!("/api/saved_workouts/get-single-workout/{workout_id}/"),
        )?)
        .await
    }

    /// Move a workout to Started, Completed, or Scheduled
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not client-settable or the call fails
    pub async fn update_workout_status(
        &self,
        workout_id: i64,
        status: WorkoutStatus,
    ) -> ClientResult<MessageResponse> {
        let body = StatusUpdateRequest {
            status: Some(status.as_str().to_owned()),
        };
        Self::send(
            self.request(
                Method::PATCH,
                &format!("/api/saved_workouts/update-workout-status/{workout_id}/"),
            )?
            .json(&body),
        )
        .await
    }

    /// Delete a workout and everything under it
    ///
    /// # Errors
    ///
    /// Returns an error if the workout is missing or the call fails
    pub async fn delete_workout(&self, workout_id: i64) -> ClientResult<MessageResponse> {
        Self::send(self.request(
            Method::DELETE,
            &format!("/api/saved_workouts/delete-workout/{workout_id}/"),
        )?)
        .await
    }

    /// Reschedule a workout
    ///
    /// # Errors
    ///
    /// Returns an error if the workout is already completed or the call fails
    pub async fn update_workout_date(
        &self,
        workout_id: i64,
        scheduled_date: NaiveDate,
    ) -> ClientResult<MessageResponse> {
        let body = DateUpdateRequest {
            scheduled_date: Some(scheduled_date),
        };
        Self::send(
            self.request(
                Method::PATCH,
                &format!("/api/saved_workouts/update-workout-date/{workout_id}/"),
            )?
            .json(&body),
        )
        .await
    }

    /// Complete a gym workout with its logged sets
    ///
    /// # Errors
    ///
    /// Returns an error if the workout is missing or the call fails
    pub async fn complete_gym_workout(
        &self,
        workout_id: i64,
        log: &WorkoutLogRequest,
    ) -> ClientResult<MessageResponse> {
        Self::send(
            self.request(
                Method::PUT,
                &format!("/api/saved_workouts/complete-workout/{workout_id}/"),
            )?
            .json(log),
        )
        .await
    }

    /// Save in-progress gym details without completing the workout
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn save_workout_details(&self, log: &WorkoutLogRequest) -> ClientResult<MessageResponse> {
        Self::send(
            self.request(Method::PUT, "/api/workout_sections/save-workout-details/")?
                .json(log),
        )
        .await
    }

    // ========================================================================
    // Modality sessions and templates
    // ========================================================================

    /// Running session templates
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn running_sessions(&self) -> ClientResult<Vec<RunningSessionTemplate>> {
        Self::send(self.request(Method::GET, "/api/running_sessions/all/")?)
            .await
    }

    /// Complete a running workout with split times
    ///
    /// # Errors
    ///
    /// Returns an error if the workout is not a running workout or the call fails
    pub async fn complete_running_workout(
        &self,
        workout_id: i64,
        request: &RunningCompletionRequest,
    ) -> ClientResult<MessageResponse> {
        Self::send(
            self.request(
                Method::PUT,
                &format!("/api/saved_runs/complete-workout/{workout_id}/"),
            )?
            .json(request),
        )
        .await
    }

    /// Complete a HIIT workout
    ///
    /// # Errors
    ///
    /// Returns an error if the workout is not a HIIT workout or the call fails
    pub async fn complete_hiit_workout(
        &self,
        workout_id: i64,
        request: &SessionCompletionRequest,
    ) -> ClientResult<MessageResponse> {
        Self::send(
            self.request(
                Method::PUT,
                &format!("/api/saved_hiit/complete-workout/{workout_id}/"),
            )?
            .json(request),
        )
        .await
    }

    /// Complete a mobility workout
    ///
    /// # Errors
    ///
    /// Returns an error if the workout is not a mobility workout or the call fails
    pub async fn complete_mobility_workout(
        &self,
        workout_id: i64,
        request: &SessionCompletionRequest,
    ) -> ClientResult<MessageResponse> {
        Self::send(
            self.request(
                Method::PUT,
                &format!("/api/saved_mobility/complete-workout/{workout_id}/"),
            )?
            .json(request),
        )
        .await
    }

    /// Mobility workout templates
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn mobility_workouts(&self) -> ClientResult<Vec<MobilityWorkoutTemplate>> {
        Self::send(self.request(Method::GET, "/api/mobility_workouts/all/")?)
            .await
    }

    /// Suggested strength templates
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn suggested_strength(&self) -> ClientResult<Vec<SuggestedStrengthTemplate>> {
        Self::send(self.request(Method::GET, "/api/suggested_strength/all/")?)
            .await
    }

    /// Conditioning templates
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn conditioning(&self) -> ClientResult<Vec<ConditioningTemplate>> {
        Self::send(self.request(Method::GET, "/api/conditioning/all/")?)
            .await
    }

    // ========================================================================
    // Progress
    // ========================================================================

    /// Leaderboard ordered by weekly rank
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn leaderboard(&self) -> ClientResult<Vec<LeaderboardEntry>> {
        Self::send(self.request(Method::GET, "/api/leaderboard/")?)
            .await
    }

    /// Body-part and activity breakdown for the signed-in user
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn user_stats(&self, refresh: bool) -> ClientResult<UserStats> {
        let user_id = self.session.require_user_id()?;
        let mut builder = self.request(Method::GET, &format!("/api/user_stats/{user_id}/"))?;
        if refresh {
            builder = builder.query(&[("refresh", true)]);
        }
        Self::send(builder).await
    }

    /// Best lifts and logged strength sets
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn movement_summary(&self) -> ClientResult<MovementSummaryResponse> {
        Self::send(self.user_request(Method::GET, "/api/movement_summary_stats/")?)
            .await
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Register the device push token
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn set_push_token(&self, token: &str) -> ClientResult<StatusResponse> {
        let body = PushTokenRequest {
            user_id: Some(self.session.require_user_id()?),
            token: Some(token.to_owned()),
        };
        Self::send(
            self.request(Method::POST, "/api/notifications/set_token/")?
                .json(&body),
        )
        .await
    }

    /// Released notifications for the signed-in user
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn notifications(&self) -> ClientResult<NotificationList> {
        Self::send(self.user_request(Method::GET, "/api/notifications/list/")?)
            .await
    }

    /// Dismiss every notification for the signed-in user
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn clear_notifications(&self) -> ClientResult<MessageResponse> {
        let body = ClearNotificationsRequest {
            user_id: Some(self.session.require_user_id()?),
        };
        Self::send(
            self.request(Method::POST, "/api/notifications/clear/")?
                .json(&body),
        )
        .await
    }

    // ========================================================================
    // Equipment filters
    // ========================================================================

    /// Saved equipment filters
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the call fails
    pub async fn equipment_filters(&self) -> ClientResult<Vec<EquipmentFilter>> {
        Self::send(self.user_request(Method::GET, "/api/saved_equipment_filters/get_all/")?)
            .await
    }

    /// Create an equipment filter
    ///
    /// # Errors
    ///
    /// Returns an error if the name is missing or already used
    pub async fn create_equipment_filter(
        &self,
        request: &EquipmentFilterRequest,
    ) -> ClientResult<EquipmentFilter> {
        Self::send(
            self.request(Method::POST, "/api/saved_equipment_filters/create/")?
                .json(request),
        )
        .await
    }

    /// One equipment filter
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is missing or not owned by the user
    pub async fn equipment_filter(&self, filter_id: i64) -> ClientResult<EquipmentFilter> {
        Self::send(self.request(
            Method::GET,
            &format!("/api/saved_equipment_filters/{filter_id}/get/"),
        )?)
        .await
    }

    /// Rename or re-equip a filter
    ///
    /// # Errors
    ///
    /// Returns an error if the new name is already used or the call fails
    pub async fn update_equipment_filter(
        &self,
        filter_id: i64,
        request: &EquipmentFilterRequest,
    ) -> ClientResult<EquipmentFilter> {
        Self::send(
            self.request(
                Method::PUT,
                &format!("/api/saved_equipment_filters/{filter_id}/update/"),
            )?
            .json(request),
        )
        .await
    }

    /// Delete a filter
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is missing or the call fails
    pub async fn delete_equipment_filter(&self, filter_id: i64) -> ClientResult<()> {
        Self::send_empty(self.request(
            Method::DELETE,
            &format!("/api/saved_equipment_filters/{filter_id}/delete/"),
        )?)
        .await
    }

    // ========================================================================
    // Chat
    // ========================================================================

    /// Every chat room
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn chat_rooms(&self) -> ClientResult<Vec<ChatRoom>> {
        Self::send(self.request(Method::GET, "/api/chat/rooms/")?)
            .await
    }

    /// Create a chat room
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the call fails
    pub async fn create_chat_room(&self, name: &str) -> ClientResult<ChatRoom> {
        let body = CreateRoomRequest {
            name: name.to_owned(),
        };
        Self::send(self.request(Method::POST, "/api/chat/rooms/")?.json(&body))
            .await
    }

    /// A page of messages, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the room does not exist or the call fails
    pub async fn chat_messages(
        &self,
        room_id: i64,
        offset: i64,
        limit: i64,
    ) -> ClientResult<Vec<ChatMessage>> {
        Self::send(
            self.request(Method::GET, &format!("/api/chat/rooms/{room_id}/messages/"))?
                .query(&[("offset", offset), ("limit", limit)]),
        )
        .await
    }

    /// Post a message as the signed-in user
    ///
    /// # Errors
    ///
    /// Returns an error if the content is blank or the call fails
    pub async fn post_chat_message(&self, room_id: i64, content: &str) -> ClientResult<ChatMessage> {
        let body = PostMessageRequest {
            user_id: Some(self.session.require_user_id()?),
            content: content.to_owned(),
        };
        Self::send(
            self.request(Method::POST, &format!("/api/chat/rooms/{room_id}/messages/"))?
                .json(&body),
        )
        .await
    }

    // ========================================================================
    // Planner
    // ========================================================================

    /// Generate gym plans on the server
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn gym_plans(&self, request: &GymRequest) -> ClientResult<Vec<GymPlan>> {
        Self::send(self.request(Method::POST, "/api/planner/gym/")?.json(request))
            .await
    }

    /// Generate HIIT plans on the server
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails
    pub async fn hiit_plans(&self, request: &HiitRequest) -> ClientResult<Vec<HiitPlan>> {
        Self::send(self.request(Method::POST, "/api/planner/hiit/")?.json(request))
            .await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method, url);
        Ok(match self.session.token()? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Request that also carries the legacy `user_id` query parameter
    fn user_request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let user_id = self.session.require_user_id()?;
        Ok(self.request(method, path)?.query(&[("user_id", user_id)]))
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = Self::check(builder.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_empty(builder: RequestBuilder) -> ClientResult<()> {
        Self::check(builder.send().await?).await.map(drop)
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_owned());
        warn!(status = status.as_u16(), %message, "API request failed");

        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// Server message from an error body: top-level `message`, else `error.message`
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
        })
        .map(str::to_owned)
}
