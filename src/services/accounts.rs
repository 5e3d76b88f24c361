// ABOUTME: Account registration, login, and profile business rules
// ABOUTME: Validates credentials, issues tokens, and assembles the full profile with stats
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{Datelike, NaiveDate};
use rand::distributions::Alphanumeric;
use rand::Rng;
use repforge_core::constants::stats::RECENT_WORKOUTS;
use repforge_core::constants::users::{GENERATED_USERNAME_LEN, MIN_PASSWORD_LEN};
use repforge_core::errors::{AppError, AppResult};
use repforge_core::models::{
    FullProfile, LoginRequest, LoginResponse, LoginUser, ProfileStats, ProfileUpdateRequest,
    RegisterRequest, RegisterResponse, User,
};
use tracing::info;

use crate::auth::AuthManager;
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Create an account and sign it in
///
/// # Errors
///
/// Returns `InvalidInput` for a malformed email, a short password, or an email
/// or username that is already registered
pub async fn register(
    resources: &ServerResources,
    request: &RegisterRequest,
) -> AppResult<RegisterResponse> {
    let email = request.email.trim();
    if !is_valid_email(email) {
        return Err(AppError::invalid_input("Enter a valid email address."));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }

    let users = resources.database.users();
    if users.email_exists(email).await? {
        return Err(AppError::invalid_input("A user with this email already exists."));
    }

    let username = match request.username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            if users.username_taken(name, None).await? {
                return Err(AppError::invalid_input("A user with that username already exists."));
            }
            name.to_owned()
        }
        _ => generate_username(&mut rand::thread_rng()),
    };

    let password_hash = resources.auth.hash_password(&request.password).await?;
    let user = users
        .create_user(
            email,
            &password_hash,
            request.first_name.trim(),
            request.last_name.trim(),
            &username,
        )
        .await?;
    let token = resources.auth.generate_token(user.id, &user.email)?;

    AppLogger::log_auth_event(Some(user.id), "register", true, None);
    Ok(RegisterResponse {
        message: format!("User {} registered successfully.", user.email),
        token,
        user_id: user.id,
    })
}

/// Check credentials and issue a token
///
/// # Errors
///
/// Returns `MissingRequiredField` when either field is blank and
/// `PermissionDenied` when the credentials do not match
pub async fn login(resources: &ServerResources, request: &LoginRequest) -> AppResult<LoginResponse> {
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::missing_field("Email and password are required."));
    }

    let users = resources.database.users();
    let Some(credentials) = users.get_credentials(email).await? else {
        AppLogger::log_auth_event(None, "login", false, Some("unknown email"));
        return Err(AppError::permission_denied("Invalid credentials"));
    };
    if !AuthManager::verify_password(password, &credentials.password_hash).await? {
        AppLogger::log_auth_event(Some(credentials.user.id), "login", false, Some("bad password"));
        return Err(AppError::permission_denied("Invalid credentials"));
    }

    let user = credentials.user;
    users.record_login(user.id).await?;
    let token = resources.auth.generate_token(user.id, &user.email)?;

    AppLogger::log_auth_event(Some(user.id), "login", true, None);
    Ok(LoginResponse {
        message: format!("Welcome back, {}", user.email),
        token,
        user_id: user.id,
        user: LoginUser {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_onboarding_complete: user.is_onboarding_complete,
        },
    })
}

/// Apply a profile update for the owner
///
/// # Errors
///
/// Returns `InvalidInput` for a blank or duplicate username
pub async fn update_profile(
    resources: &ServerResources,
    user_id: i64,
    update: &ProfileUpdateRequest,
) -> AppResult<User> {
    let users = resources.database.users();
    if let Some(username) = update.username.as_deref() {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::invalid_input("Username cannot be blank."));
        }
        if users.username_taken(username, Some(user_id)).await? {
            return Err(AppError::invalid_input("A user with that username already exists."));
        }
    }

    let user = users.update_profile(user_id, update).await?;
    info!(user_id, "Profile updated");
    Ok(user)
}

/// The user with workout counts, recent workouts, and leaderboard standing
///
/// # Errors
///
/// Returns `ResourceNotFound` if the user does not exist
pub async fn full_profile(
    resources: &ServerResources,
    user_id: i64,
    today: NaiveDate,
) -> AppResult<FullProfile> {
    let user = resources.database.users().require_user(user_id).await?;
    let workouts = resources.database.workouts();
    let scores = resources.database.scores();

    let month_start = today.with_day(1).unwrap_or(today);
    let stats = ProfileStats {
        workouts_this_month: workouts.count_completed(user_id, Some(month_start)).await?,
        workouts_all_time: workouts.count_completed(user_id, None).await?,
        recent_workouts: workouts.recent_completed(user_id, RECENT_WORKOUTS).await?,
        leaderboard: scores.totals(user_id).await?,
        leaderboard_rank: scores.rank(user_id).await?,
    };

    Ok(FullProfile { user, stats })
}

/// Minimal structural email check: one `@`, a non-empty local part, and a dotted domain
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn generate_username<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(GENERATED_USERNAME_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_email_shape_check() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last@sub.example.co.uk"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada @example.com"));
    }

    #[test]
    fn test_generated_username_is_alphanumeric() {
        let mut rng = StdRng::seed_from_u64(3);
        let name = generate_username(&mut rng);
        assert_eq!(name.len(), GENERATED_USERNAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
