use anyhow::Result;
use chrono::Utc;
use futures::future::try_join_all;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    CreateMealLogRequest, CreateWeightLogRequest, CreateWorkoutLogRequest, LogRangeQuery,
    MealLog, MealLogDetail, MealLogItem, WeightLog, WorkoutLog, WorkoutLogDetail,
    WorkoutLogItem, MEAL_TYPES,
};

/// Append-only member logs: meals, workouts, weight.
#[derive(Debug, Clone)]
pub struct LogService {
    db: PgPool,
}

impl LogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_meal_log(
        &self,
        member_id: Uuid,
        request: CreateMealLogRequest,
    ) -> Result<MealLogDetail> {
        if !MEAL_TYPES.contains(&request.meal_type.as_str()) {
            anyhow::bail!("invalid meal type: {}", request.meal_type);
        }

        let logged_at = request.logged_at.unwrap_or_else(Utc::now);
        let mut tx = self.db.begin().await?;

        let log = sqlx::query_as::<_, MealLog>(
            "INSERT INTO meal_logs (id, member_id, logged_at, meal_type, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, member_id, logged_at, meal_type, notes",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(logged_at)
        .bind(&request.meal_type)
        .bind(&request.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in request.items {
            let item = sqlx::query_as::<_, MealLogItem>(
                "INSERT INTO meal_log_items (id, log_id, food_name, quantity, unit,
                                             calories, protein_g, carbs_g, fat_g)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 RETURNING id, log_id, food_name, quantity, unit, calories, protein_g,
                           carbs_g, fat_g",
            )
            .bind(Uuid::new_v4())
            .bind(log.id)
            .bind(&item.food_name)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(item.calories)
            .bind(item.protein_g)
            .bind(item.carbs_g)
            .bind(item.fat_g)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;

        Ok(MealLogDetail { log, items })
    }

    pub async fn list_meal_logs(
        &self,
        member_id: Uuid,
        query: &LogRangeQuery,
    ) -> Result<Vec<MealLogDetail>> {
        let (limit, offset) = limits(query);

        let logs = sqlx::query_as::<_, MealLog>(
            "SELECT id, member_id, logged_at, meal_type, notes
             FROM meal_logs
             WHERE member_id = $1
               AND ($2::timestamptz IS NULL OR logged_at >= $2)
               AND ($3::timestamptz IS NULL OR logged_at <= $3)
             ORDER BY logged_at DESC
             LIMIT $4 OFFSET $5",
        )
        .bind(member_id)
        .bind(query.from)
        .bind(query.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let details = try_join_all(logs.into_iter().map(|log| {
            let db = self.db.clone();
            async move {
                let items = sqlx::query_as::<_, MealLogItem>(
                    "SELECT id, log_id, food_name, quantity, unit, calories, protein_g, carbs_g, fat_g
                     FROM meal_log_items WHERE log_id = $1",
                )
                .bind(log.id)
                .fetch_all(&db)
                .await?;
                Ok::<_, anyhow::Error>(MealLogDetail { log, items })
            }
        }))
        .await?;

        Ok(details)
    }

    pub async fn create_workout_log(
        &self,
        member_id: Uuid,
        request: CreateWorkoutLogRequest,
    ) -> Result<WorkoutLogDetail> {
        let logged_at = request.logged_at.unwrap_or_else(Utc::now);
        let mut tx = self.db.begin().await?;

        let log = sqlx::query_as::<_, WorkoutLog>(
            "INSERT INTO workout_logs (id, member_id, logged_at, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING id, member_id, logged_at, notes",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(logged_at)
        .bind(&request.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in request.items {
            let item = sqlx::query_as::<_, WorkoutLogItem>(
                "INSERT INTO workout_log_items (id, log_id, exercise_name, sets, reps,
                                                weight_kg, duration_minutes)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING id, log_id, exercise_name, sets, reps, weight_kg, duration_minutes",
            )
            .bind(Uuid::new_v4())
            .bind(log.id)
            .bind(&item.exercise_name)
            .bind(item.sets)
            .bind(item.reps)
            .bind(item.weight_kg)
            .bind(item.duration_minutes)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;

        Ok(WorkoutLogDetail { log, items })
    }

    pub async fn list_workout_logs(
        &self,
        member_id: Uuid,
        query: &LogRangeQuery,
    ) -> Result<Vec<WorkoutLogDetail>> {
        let (limit, offset) = limits(query);

        let logs = sqlx::query_as::<_, WorkoutLog>(
            "SELECT id, member_id, logged_at, notes
             FROM workout_logs
             WHERE member_id = $1
               AND ($2::timestamptz IS NULL OR logged_at >= $2)
               AND ($3::timestamptz IS NULL OR logged_at <= $3)
             ORDER BY logged_at DESC
             LIMIT $4 OFFSET $5",
        )
        .bind(member_id)
        .bind(query.from)
        .bind(query.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let details = try_join_all(logs.into_iter().map(|log| {
            let db = self.db.clone();
            async move {
                let items = sqlx::query_as::<_, WorkoutLogItem>(
                    "SELECT id, log_id, exercise_name, sets, reps, weight_kg, duration_minutes
                     FROM workout_log_items WHERE log_id = $1",
                )
                .bind(log.id)
                .fetch_all(&db)
                .await?;
                Ok::<_, anyhow::Error>(WorkoutLogDetail { log, items })
            }
        }))
        .await?;

        Ok(details)
    }

    pub async fn create_weight_log(
        &self,
        member_id: Uuid,
        request: CreateWeightLogRequest,
    ) -> Result<WeightLog> {
        if request.weight_kg <= 0.0 || request.weight_kg > 650.0 {
            anyhow::bail!("weight_kg out of range");
        }

        let log = sqlx::query_as::<_, WeightLog>(
            "INSERT INTO weight_logs (id, member_id, logged_at, weight_kg)
             VALUES ($1, $2, $3, $4)
             RETURNING id, member_id, logged_at, weight_kg",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(request.logged_at.unwrap_or_else(Utc::now))
        .bind(request.weight_kg)
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    pub async fn list_weight_logs(
        &self,
        member_id: Uuid,
        query: &LogRangeQuery,
    ) -> Result<Vec<WeightLog>> {
        let (limit, offset) = limits(query);

        let logs = sqlx::query_as::<_, WeightLog>(
            "SELECT id, member_id, logged_at, weight_kg
             FROM weight_logs
             WHERE member_id = $1
               AND ($2::timestamptz IS NULL OR logged_at >= $2)
               AND ($3::timestamptz IS NULL OR logged_at <= $3)
             ORDER BY logged_at DESC
             LIMIT $4 OFFSET $5",
        )
        .bind(member_id)
        .bind(query.from)
        .bind(query.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }
}

fn limits(query: &LogRangeQuery) -> (i64, i64) {
    (query.limit.unwrap_or(50).min(200), query.offset.unwrap_or(0))
}
