use axum::{middleware, routing::get, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api::{
    admin::admin_routes, auth::auth_routes, coach::coach_routes, engagement::engagement_routes,
    goals::goals_routes, health::health_check, logs::log_routes,
    notifications::notification_routes, plans::plan_routes, profile::profile_routes,
    schedules::schedule_routes,
};
use crate::auth::{
    admin_only_middleware, cors_layer, jwt_auth_middleware, security_headers_layer, AuthService,
};
use crate::config::{AppConfig, DatabaseConfig, SmtpConfig};
use crate::metrics::{track_request_metrics, MetricsRegistry};
use crate::services::EmailService;

/// Assemble the full application router. Every `/api` route except the auth
/// endpoints sits behind JWT authentication; `/api/admin` additionally
/// requires the admin role.
pub fn create_routes(
    db: PgPool,
    app_config: &AppConfig,
    db_config: &DatabaseConfig,
    smtp_config: &SmtpConfig,
    metrics: MetricsRegistry,
) -> anyhow::Result<Router> {
    let email = EmailService::new(smtp_config)?;
    let auth_service = AuthService::new(db.clone(), &app_config.jwt_secret, email.clone());

    let jwt = || middleware::from_fn_with_state(auth_service.clone(), jwt_auth_middleware);

    let member_routes = Router::new()
        .merge(profile_routes(db.clone()))
        .merge(goals_routes(db.clone()))
        .merge(log_routes(db.clone()))
        .merge(plan_routes(db.clone(), email.clone()))
        .merge(engagement_routes(db.clone(), email.clone()))
        .route_layer(jwt());

    let admin = admin_routes(
        db.clone(),
        email.clone(),
        metrics.clone(),
        db_config.database_url.clone(),
        app_config.backup_dir.clone(),
    )
    .route_layer(middleware::from_fn(admin_only_middleware))
    .route_layer(jwt());

    let api = Router::new()
        .nest("/auth", auth_routes(auth_service.clone()))
        .nest("/members", member_routes)
        .nest(
            "/notifications",
            notification_routes(db.clone(), email.clone()).route_layer(jwt()),
        )
        .nest("/coach", coach_routes(db.clone(), email.clone()).route_layer(jwt()))
        .nest(
            "/schedules",
            schedule_routes(db, email).route_layer(jwt()),
        )
        .nest("/admin", admin);

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(metrics, track_request_metrics))
                .layer(security_headers_layer())
                .layer(cors_layer()),
        );

    Ok(router)
}
