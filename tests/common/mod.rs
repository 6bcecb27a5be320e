use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use gymdesk::auth::UserRole;
use gymdesk::config::SmtpConfig;
use gymdesk::services::EmailService;

/// Connect to the database named by `TEST_DATABASE_URL` and run migrations.
/// Returns `None` when the variable is unset or the database is unreachable,
/// letting DB-backed tests skip on machines without Postgres.
pub async fn try_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed against test database");
    Some(pool)
}

/// SMTP transport pointed at a port nothing listens on, with a short timeout.
/// Notification delivery failures are logged and never fail the write under
/// test.
pub fn test_email() -> EmailService {
    let config = SmtpConfig {
        host: "localhost".to_string(),
        port: 2525,
        username: String::new(),
        password: String::new(),
        from_email: "noreply@test.local".to_string(),
        from_name: "Gymdesk Test".to_string(),
        send_timeout: Duration::from_secs(1),
    };
    EmailService::new(&config).expect("smtp transport")
}

/// Insert an active user with a throwaway email and return its id.
pub async fn seed_user(pool: &PgPool, role: UserRole) -> Uuid {
    let id = Uuid::new_v4();
    let email = format!("{}-{}@test.local", role.as_str(), id.simple());
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, is_active, created_at, updated_at)
         VALUES ($1, $2, 'x', $3, true, $4, $4)",
    )
    .bind(id)
    .bind(email)
    .bind(role.as_str())
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("failed to seed user");
    id
}

pub async fn assign_trainer(pool: &PgPool, member_id: Uuid, trainer_id: Uuid) {
    sqlx::query(
        "INSERT INTO trainer_assignments (member_id, trainer_id)
         VALUES ($1, $2)
         ON CONFLICT (member_id) DO UPDATE SET trainer_id = $2",
    )
    .bind(member_id)
    .bind(trainer_id)
    .execute(pool)
    .await
    .expect("failed to assign trainer");
}

pub async fn assign_nutritionist(pool: &PgPool, member_id: Uuid, nutritionist_id: Uuid) {
    sqlx::query(
        "INSERT INTO nutritionist_assignments (member_id, nutritionist_id)
         VALUES ($1, $2)
         ON CONFLICT (member_id) DO UPDATE SET nutritionist_id = $2",
    )
    .bind(member_id)
    .bind(nutritionist_id)
    .execute(pool)
    .await
    .expect("failed to assign nutritionist");
}

pub fn session_for(user_id: Uuid, role: UserRole) -> gymdesk::auth::UserSession {
    gymdesk::auth::UserSession {
        user_id,
        email: format!("{}@test.local", user_id.simple()),
        role,
        jti: Uuid::new_v4().to_string(),
    }
}
