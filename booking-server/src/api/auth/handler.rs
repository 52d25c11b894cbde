//! Authentication Handlers
//!
//! Handles registration, login and the current-user lookup

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};

use crate::accounts::AccountService;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_email, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/register - 注册顾客或店铺账号
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    validate_email(req.email.trim())?;
    validate_password(&req.password)?;
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;

    let user = state.accounts.register(req)?;
    Ok((StatusCode::CREATED, Json(AccountService::user_info(&user))))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same error after the same delay
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::invalid_credentials());
    }
    let result = state.accounts.authenticate(&req.email, &req.password);

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match result {
        Ok(user) => user,
        Err(e) => {
            security_log!("WARN", "login_failed", code = e.code.code());
            return Err(e);
        }
    };

    let current = AccountService::current_user(&user);
    let token = state
        .get_jwt_service()
        .generate_token(&current)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = user.id,
        role = user.role.as_str(),
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        token_type: "bearer".to_string(),
        user: AccountService::user_info(&user),
    }))
}

/// GET /api/auth/me - 当前用户 (从存储读取最新状态)
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<UserInfo>> {
    let record = state.accounts.get(user.id)?;
    Ok(Json(AccountService::user_info(&record)))
}
