use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    CreateDietPlanRequest, DietPlan, DietPlanDetail, DietPlanMeal, DietPlanMealDetail,
    DietPlanMealItem,
};
use crate::services::NotificationService;

#[derive(Debug, Clone)]
pub struct DietPlanService {
    db: PgPool,
    notifications: NotificationService,
}

impl DietPlanService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Create a plan and make it the member's single active one. Prior active
    /// plans are deactivated in the same transaction, so a failure anywhere
    /// leaves the old plan in place.
    pub async fn create_plan(
        &self,
        member_id: Uuid,
        created_by: Uuid,
        request: CreateDietPlanRequest,
    ) -> Result<DietPlanDetail> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE diet_plans SET is_active = false WHERE member_id = $1 AND is_active")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        let plan = sqlx::query_as::<_, DietPlan>(
            "INSERT INTO diet_plans (id, member_id, created_by, title, calories, protein_g,
                                     carbs_g, fat_g, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true)
             RETURNING id, member_id, created_by, title, calories, protein_g, carbs_g,
                       fat_g, is_active, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(created_by)
        .bind(&request.title)
        .bind(request.calories)
        .bind(request.protein_g)
        .bind(request.carbs_g)
        .bind(request.fat_g)
        .fetch_one(&mut *tx)
        .await?;

        let mut meals = Vec::with_capacity(request.meals.len());
        for (meal_pos, meal_req) in request.meals.into_iter().enumerate() {
            let meal = sqlx::query_as::<_, DietPlanMeal>(
                "INSERT INTO diet_plan_meals (id, plan_id, name, time_of_day, target_calories, position)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id, plan_id, name, time_of_day, target_calories, position",
            )
            .bind(Uuid::new_v4())
            .bind(plan.id)
            .bind(&meal_req.name)
            .bind(&meal_req.time_of_day)
            .bind(meal_req.target_calories)
            .bind(meal_pos as i32)
            .fetch_one(&mut *tx)
            .await?;

            let mut items = Vec::with_capacity(meal_req.items.len());
            for (item_pos, item) in meal_req.items.into_iter().enumerate() {
                let item = sqlx::query_as::<_, DietPlanMealItem>(
                    "INSERT INTO diet_plan_meal_items (id, meal_id, food_name, quantity, unit,
                                                       calories, protein_g, carbs_g, fat_g, position)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                     RETURNING id, meal_id, food_name, quantity, unit, calories, protein_g,
                               carbs_g, fat_g, position",
                )
                .bind(Uuid::new_v4())
                .bind(meal.id)
                .bind(&item.food_name)
                .bind(item.quantity)
                .bind(&item.unit)
                .bind(item.calories)
                .bind(item.protein_g)
                .bind(item.carbs_g)
                .bind(item.fat_g)
                .bind(item_pos as i32)
                .fetch_one(&mut *tx)
                .await?;
                items.push(item);
            }

            meals.push(DietPlanMealDetail { meal, items });
        }

        tx.commit().await?;

        if created_by != member_id {
            if let Err(err) = self
                .notifications
                .notify(
                    member_id,
                    "New diet plan",
                    &format!("A new diet plan \"{}\" is now active.", plan.title),
                )
                .await
            {
                tracing::warn!("failed to notify member {} of new plan: {}", member_id, err);
            }
        }

        Ok(DietPlanDetail { plan, meals })
    }

    /// The member's active plan with meals and items, if any.
    pub async fn get_active_plan(&self, member_id: Uuid) -> Result<Option<DietPlanDetail>> {
        let plan = sqlx::query_as::<_, DietPlan>(
            "SELECT id, member_id, created_by, title, calories, protein_g, carbs_g, fat_g,
                    is_active, created_at
             FROM diet_plans WHERE member_id = $1 AND is_active",
        )
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(plan) = plan else {
            return Ok(None);
        };

        let meals = sqlx::query_as::<_, DietPlanMeal>(
            "SELECT id, plan_id, name, time_of_day, target_calories, position
             FROM diet_plan_meals WHERE plan_id = $1 ORDER BY position",
        )
        .bind(plan.id)
        .fetch_all(&self.db)
        .await?;

        let mut detail_meals = Vec::with_capacity(meals.len());
        for meal in meals {
            let items = sqlx::query_as::<_, DietPlanMealItem>(
                "SELECT id, meal_id, food_name, quantity, unit, calories, protein_g, carbs_g,
                        fat_g, position
                 FROM diet_plan_meal_items WHERE meal_id = $1 ORDER BY position",
            )
            .bind(meal.id)
            .fetch_all(&self.db)
            .await?;
            detail_meals.push(DietPlanMealDetail { meal, items });
        }

        Ok(Some(DietPlanDetail {
            plan,
            meals: detail_meals,
        }))
    }
}
