mod common;

use assert_matches::assert_matches;

use gymdesk::auth::{Discipline, UserRole};
use gymdesk::error::ApiError;
use gymdesk::services::{AssignmentService, NotificationService};

use common::{seed_user, test_email, try_pool};

#[tokio::test]
async fn assignment_change_lands_in_the_audit_trail() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let trainer = seed_user(&pool, UserRole::Trainer).await;
    let admin = seed_user(&pool, UserRole::Admin).await;

    let notifications = NotificationService::new(pool.clone(), test_email());
    let assignments = AssignmentService::new(pool.clone(), notifications);

    assignments
        .upsert_assignment(member, trainer, Discipline::Workout, admin)
        .await
        .expect("assignment upsert");

    let recorded: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM system_logs
         WHERE event = 'admin.assignment_changed' AND user_id = $1",
    )
    .bind(admin)
    .fetch_one(&pool)
    .await
    .expect("count audit rows");

    assert_eq!(recorded, 1);
}

#[tokio::test]
async fn assignment_rejects_bad_input_as_validation() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let other_member = seed_user(&pool, UserRole::Member).await;
    let trainer = seed_user(&pool, UserRole::Trainer).await;
    let admin = seed_user(&pool, UserRole::Admin).await;

    let notifications = NotificationService::new(pool.clone(), test_email());
    let assignments = AssignmentService::new(pool.clone(), notifications);

    // A member is not a valid coach for any discipline.
    assert_matches!(
        assignments
            .upsert_assignment(member, other_member, Discipline::Workout, admin)
            .await,
        Err(ApiError::Validation(_))
    );

    // Assignments are tracked per discipline.
    assert_matches!(
        assignments
            .upsert_assignment(member, trainer, Discipline::General, admin)
            .await,
        Err(ApiError::Validation(_))
    );
}
