mod common;

use assert_matches::assert_matches;
use gymdesk::auth::{AccessControl, Discipline, UserRole};
use gymdesk::error::ApiError;

use common::{assign_nutritionist, assign_trainer, seed_user, session_for, try_pool};

#[tokio::test]
async fn assigned_trainer_reads_workout_but_not_diet() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let trainer = seed_user(&pool, UserRole::Trainer).await;
    assign_trainer(&pool, member, trainer).await;

    let access = AccessControl::new(pool);
    let session = session_for(trainer, UserRole::Trainer);

    assert!(access.authorize(&session, member, Discipline::Workout).await.is_ok());
    assert!(access.authorize(&session, member, Discipline::General).await.is_ok());
    assert_matches!(
        access.authorize(&session, member, Discipline::Diet).await,
        Err(ApiError::Forbidden)
    );
}

#[tokio::test]
async fn unassigned_trainer_is_denied_member_data() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let trainer = seed_user(&pool, UserRole::Trainer).await;

    let access = AccessControl::new(pool);
    let session = session_for(trainer, UserRole::Trainer);

    for discipline in [Discipline::Diet, Discipline::Workout, Discipline::General] {
        assert_matches!(
            access.authorize(&session, member, discipline).await,
            Err(ApiError::Forbidden)
        );
    }
}

#[tokio::test]
async fn nutritionist_scope_follows_assignment() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let nutritionist = seed_user(&pool, UserRole::Nutritionist).await;
    assign_nutritionist(&pool, member, nutritionist).await;

    let access = AccessControl::new(pool);
    let session = session_for(nutritionist, UserRole::Nutritionist);

    assert!(access.authorize(&session, member, Discipline::Diet).await.is_ok());
    assert!(access.authorize(&session, member, Discipline::General).await.is_ok());
    assert_matches!(
        access.authorize(&session, member, Discipline::Workout).await,
        Err(ApiError::Forbidden)
    );
}

#[tokio::test]
async fn member_cannot_touch_another_member() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let other = seed_user(&pool, UserRole::Member).await;

    let access = AccessControl::new(pool);
    let session = session_for(other, UserRole::Member);

    for discipline in [Discipline::Diet, Discipline::Workout, Discipline::General] {
        assert_matches!(
            access.authorize(&session, member, discipline).await,
            Err(ApiError::Forbidden)
        );
    }
}

#[tokio::test]
async fn self_and_admin_are_always_granted() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let admin = seed_user(&pool, UserRole::Admin).await;

    let access = AccessControl::new(pool);
    let self_session = session_for(member, UserRole::Member);
    let admin_session = session_for(admin, UserRole::Admin);

    for discipline in [Discipline::Diet, Discipline::Workout, Discipline::General] {
        assert!(access.authorize(&self_session, member, discipline).await.is_ok());
        assert!(access.authorize(&admin_session, member, discipline).await.is_ok());
    }
}
