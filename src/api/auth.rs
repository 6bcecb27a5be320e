use axum::{
    extract::{Request, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};

use crate::auth::{
    jwt_auth_middleware, AuthError, AuthResponse, AuthService, ChangePasswordRequest,
    ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, TokenResponse, UserInfo, UserSession, VerifyOtpRequest,
};

/// Authentication routes
pub fn auth_routes(auth_service: AuthService) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/activate", post(activate))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route(
            "/change-password",
            post(change_password).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .route(
            "/me",
            get(me).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .with_state(auth_service)
}

/// Register a new user (inactive until the OTP is confirmed)
#[tracing::instrument(skip(auth_service, request))]
async fn register(
    State(auth_service): State<AuthService>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service.register(request).await?;
    Ok(Json(response))
}

/// Activate an account with the emailed code
#[tracing::instrument(skip(auth_service, request))]
async fn activate(
    State(auth_service): State<AuthService>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.activate(request).await?;
    Ok(Json(response))
}

/// Login user
#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

/// Refresh access token
#[tracing::instrument(skip(auth_service, request))]
async fn refresh_token(
    State(auth_service): State<AuthService>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = auth_service.refresh_token(request).await?;
    Ok(Json(response))
}

/// Logout user
#[tracing::instrument(skip(auth_service, request))]
async fn logout(
    State(auth_service): State<AuthService>,
    request: Request,
) -> Result<Json<MessageResponse>, AuthError> {
    let auth_header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = crate::auth::extract_bearer_token(auth_header)?;
    let response = auth_service.logout(token).await?;
    Ok(Json(response))
}

/// Start a password reset
#[tracing::instrument(skip(auth_service, request))]
async fn forgot_password(
    State(auth_service): State<AuthService>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service.forgot_password(&request.email).await?;
    Ok(Json(response))
}

/// Complete a password reset
#[tracing::instrument(skip(auth_service, request))]
async fn reset_password(
    State(auth_service): State<AuthService>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service.reset_password(request).await?;
    Ok(Json(response))
}

/// Change password for the authenticated user
#[tracing::instrument(skip(auth_service, session, request))]
async fn change_password(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service.change_password(&session, request).await?;
    Ok(Json(response))
}

/// Current user profile
#[tracing::instrument(skip(auth_service, session))]
async fn me(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<UserInfo>, AuthError> {
    let user = auth_service.current_user(&session).await?;
    Ok(Json(user))
}
