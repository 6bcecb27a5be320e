mod common;

use assert_matches::assert_matches;

use gymdesk::auth::{AccessControl, Discipline, UserRole};
use gymdesk::error::ApiError;
use gymdesk::models::{CreateDietPlanRequest, SaveProfileRequest};
use gymdesk::services::{
    plan_generator, DietPlanService, MessageService, NotificationService, ProfileService,
};

use common::{
    assign_nutritionist, assign_trainer, seed_user, session_for, test_email, try_pool,
};

fn profile_request(weight_kg: Option<f64>) -> SaveProfileRequest {
    SaveProfileRequest {
        height_cm: Some(180.0),
        weight_kg,
        date_of_birth: None,
        sex: None,
        activity_level: Some("moderate".to_string()),
        goal_text: Some("muscle gain".to_string()),
        target_calories: None,
        dietary_notes: None,
        medical_notes: None,
    }
}

#[tokio::test]
async fn profile_save_appends_weight_log_on_change() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let profiles = ProfileService::new(pool.clone());

    profiles
        .save_profile(member, profile_request(Some(80.0)))
        .await
        .expect("first save");
    // Same weight again: no new log row.
    profiles
        .save_profile(member, profile_request(Some(80.0)))
        .await
        .expect("second save");
    profiles
        .save_profile(member, profile_request(Some(79.0)))
        .await
        .expect("third save");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weight_logs WHERE member_id = $1")
        .bind(member)
        .fetch_one(&pool)
        .await
        .expect("count weight logs");

    assert_eq!(count, 2);
}

#[tokio::test]
async fn concurrent_saves_of_the_same_new_weight_log_it_once() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let profiles = ProfileService::new(pool.clone());
    profiles
        .save_profile(member, profile_request(Some(80.0)))
        .await
        .expect("initial save");

    // The row lock serializes the two saves, so the second observes the
    // committed 79 and skips the append.
    let (first, second) = tokio::join!(
        profiles.save_profile(member, profile_request(Some(79.0))),
        profiles.save_profile(member, profile_request(Some(79.0))),
    );
    first.expect("first concurrent save");
    second.expect("second concurrent save");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM weight_logs WHERE member_id = $1 AND weight_kg = 79",
    )
    .bind(member)
    .fetch_one(&pool)
    .await
    .expect("count weight logs");

    assert_eq!(count, 1);
}

#[tokio::test]
async fn creating_a_plan_deactivates_the_previous_one() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let nutritionist = seed_user(&pool, UserRole::Nutritionist).await;

    let notifications = NotificationService::new(pool.clone(), test_email());
    let plans = DietPlanService::new(pool.clone(), notifications);

    let request = |title: &str| CreateDietPlanRequest {
        title: title.to_string(),
        calories: 2000,
        protein_g: 144,
        carbs_g: 230,
        fat_g: 56,
        meals: Vec::new(),
    };

    let first = plans
        .create_plan(member, nutritionist, request("First plan"))
        .await
        .expect("first plan");
    let second = plans
        .create_plan(member, nutritionist, request("Second plan"))
        .await
        .expect("second plan");

    assert!(second.plan.is_active);

    let first_active: bool =
        sqlx::query_scalar("SELECT is_active FROM diet_plans WHERE id = $1")
            .bind(first.plan.id)
            .fetch_one(&pool)
            .await
            .expect("first plan row");
    assert!(!first_active);

    let active = plans
        .get_active_plan(member)
        .await
        .expect("active plan")
        .expect("plan exists");
    assert_eq!(active.plan.id, second.plan.id);
}

#[tokio::test]
async fn trainer_message_list_excludes_the_diet_thread() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let trainer = seed_user(&pool, UserRole::Trainer).await;
    let nutritionist = seed_user(&pool, UserRole::Nutritionist).await;
    assign_trainer(&pool, member, trainer).await;
    assign_nutritionist(&pool, member, nutritionist).await;

    let notifications = NotificationService::new(pool.clone(), test_email());
    let messages = MessageService::new(pool.clone(), notifications);
    messages
        .post_message(member, nutritionist, Discipline::Diet, "cut the evening snack")
        .await
        .expect("diet message");
    messages
        .post_message(member, trainer, Discipline::Workout, "add a fifth set")
        .await
        .expect("workout message");

    let access = AccessControl::new(pool.clone());
    let session = session_for(trainer, UserRole::Trainer);
    assert_matches!(
        access.authorize(&session, member, Discipline::Diet).await,
        Err(ApiError::Forbidden)
    );

    // The unfiltered list goes through the same visibility set, so the diet
    // thread stays out of a trainer's view.
    let visible = access
        .authorize_visible(&session, member)
        .await
        .expect("trainer has a visible set");
    let listed = messages
        .list_messages(member, &visible)
        .await
        .expect("list messages");

    assert!(!listed.is_empty());
    assert!(listed.iter().all(|m| m.discipline != "diet"));
}

#[tokio::test]
async fn default_diet_plan_from_profile_matches_heuristic() {
    let Some(pool) = try_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let member = seed_user(&pool, UserRole::Member).await;
    let profiles = ProfileService::new(pool.clone());
    profiles
        .save_profile(member, profile_request(Some(80.0)))
        .await
        .expect("profile save");

    let profile = profiles
        .get_profile(member)
        .await
        .expect("profile read")
        .expect("profile exists");
    let split = plan_generator::derive_macro_split(
        profile.goal_text.as_deref().unwrap_or(""),
        profile.weight_kg.expect("weight"),
        profile.target_calories,
    );
    let request = plan_generator::default_diet_plan(
        profile.goal_text.as_deref().unwrap_or(""),
        split,
    );

    let notifications = NotificationService::new(pool.clone(), test_email());
    let plans = DietPlanService::new(pool.clone(), notifications);
    let created = plans
        .create_plan(member, member, request)
        .await
        .expect("default plan");

    assert_eq!(created.plan.calories, 2000);
    assert_eq!(created.plan.protein_g, 144);
    assert_eq!(created.plan.fat_g, 56);
    assert_eq!(created.plan.carbs_g, 230);
    assert_eq!(created.meals.len(), 4);
}
