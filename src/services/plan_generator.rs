//! Default-plan heuristics: pure functions from profile attributes to a
//! calorie/macro split and to diet/workout plan templates. Persistence
//! happens elsewhere, through the normal plan-creation transactions.

use serde::{Deserialize, Serialize};

use crate::models::{
    CreateDietPlanMeal, CreateDietPlanRequest, CreateWorkoutPlanDay, CreateWorkoutPlanExercise,
    CreateWorkoutPlanRequest,
};

pub const DEFAULT_CALORIES: i32 = 2000;
const FAT_CALORIE_SHARE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalClass {
    FatLoss,
    MuscleGain,
    Strength,
    Endurance,
    Flexibility,
    GeneralFitness,
}

impl GoalClass {
    /// Grams of protein per kg of body weight for this training goal.
    pub fn protein_per_kg(&self) -> f64 {
        match self {
            GoalClass::MuscleGain | GoalClass::Strength => 1.8,
            GoalClass::FatLoss | GoalClass::Endurance => 1.6,
            GoalClass::Flexibility | GoalClass::GeneralFitness => 1.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalClass::FatLoss => "fat_loss",
            GoalClass::MuscleGain => "muscle_gain",
            GoalClass::Strength => "strength",
            GoalClass::Endurance => "endurance",
            GoalClass::Flexibility => "flexibility",
            GoalClass::GeneralFitness => "general_fitness",
        }
    }
}

/// Classify free-text goal wording by keyword. Falls back to general fitness.
pub fn classify_goal(goal_text: &str) -> GoalClass {
    let text = goal_text.to_lowercase();

    let matches_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if matches_any(&["muscle", "bulk", "mass", "hypertrophy", "gain"]) {
        GoalClass::MuscleGain
    } else if matches_any(&["fat", "lose", "loss", "lean", "cut", "slim"]) {
        GoalClass::FatLoss
    } else if matches_any(&["strength", "strong", "power", "lift"]) {
        GoalClass::Strength
    } else if matches_any(&["endurance", "cardio", "stamina", "marathon", "run", "cycling"]) {
        GoalClass::Endurance
    } else if matches_any(&["flexib", "mobility", "yoga", "stretch"]) {
        GoalClass::Flexibility
    } else {
        GoalClass::GeneralFitness
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroSplit {
    pub calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

/// Derive a calorie/macro split from goal text, body weight and an optional
/// stored calorie target. Protein scales with body weight by goal class, fat
/// takes 25% of calories, carbs absorb the remainder (floored at zero).
pub fn derive_macro_split(
    goal_text: &str,
    weight_kg: f64,
    target_calories: Option<i32>,
) -> MacroSplit {
    let class = classify_goal(goal_text);
    let calories = target_calories.unwrap_or(DEFAULT_CALORIES);

    let protein_g = (weight_kg * class.protein_per_kg()).round() as i32;
    let fat_g = (calories as f64 * FAT_CALORIE_SHARE / 9.0).round() as i32;
    let carb_calories = calories - protein_g * 4 - fat_g * 9;
    let carbs_g = ((carb_calories as f64) / 4.0).round().max(0.0) as i32;

    MacroSplit {
        calories,
        protein_g,
        carbs_g,
        fat_g,
    }
}

/// Expand a macro split into a default diet plan: four meals with a fixed
/// calorie distribution.
pub fn default_diet_plan(goal_text: &str, split: MacroSplit) -> CreateDietPlanRequest {
    let class = classify_goal(goal_text);
    let meal = |name: &str, time: &str, share: f64| CreateDietPlanMeal {
        name: name.to_string(),
        time_of_day: Some(time.to_string()),
        target_calories: Some((split.calories as f64 * share).round() as i32),
        items: Vec::new(),
    };

    CreateDietPlanRequest {
        title: format!("Default {} diet plan", class.as_str().replace('_', " ")),
        calories: split.calories,
        protein_g: split.protein_g,
        carbs_g: split.carbs_g,
        fat_g: split.fat_g,
        meals: vec![
            meal("Breakfast", "08:00", 0.25),
            meal("Lunch", "12:30", 0.35),
            meal("Dinner", "19:00", 0.30),
            meal("Snack", "16:00", 0.10),
        ],
    }
}

/// Default workout split per goal class.
pub fn default_workout_plan(goal_text: &str) -> CreateWorkoutPlanRequest {
    let class = classify_goal(goal_text);

    let exercise = |name: &str, sets: i32, reps: i32, rest: i32| CreateWorkoutPlanExercise {
        name: name.to_string(),
        sets: Some(sets),
        reps: Some(reps),
        rest_seconds: Some(rest),
        notes: None,
    };

    let day = |dow: i32, focus: &str, exercises: Vec<CreateWorkoutPlanExercise>| {
        CreateWorkoutPlanDay {
            day_of_week: dow,
            focus: Some(focus.to_string()),
            exercises,
        }
    };

    let days = match class {
        GoalClass::MuscleGain => vec![
            day(1, "Upper body", vec![
                exercise("Bench press", 4, 10, 90),
                exercise("Barbell row", 4, 10, 90),
                exercise("Overhead press", 3, 12, 90),
            ]),
            day(2, "Lower body", vec![
                exercise("Back squat", 4, 10, 120),
                exercise("Romanian deadlift", 3, 12, 90),
                exercise("Leg press", 3, 12, 90),
            ]),
            day(4, "Upper body", vec![
                exercise("Incline dumbbell press", 4, 10, 90),
                exercise("Pull-up", 4, 8, 90),
                exercise("Lateral raise", 3, 15, 60),
            ]),
            day(5, "Lower body", vec![
                exercise("Front squat", 4, 8, 120),
                exercise("Hip thrust", 3, 12, 90),
                exercise("Calf raise", 4, 15, 60),
            ]),
        ],
        GoalClass::Strength => vec![
            day(1, "Full body", vec![
                exercise("Back squat", 5, 5, 180),
                exercise("Bench press", 5, 5, 180),
                exercise("Barbell row", 5, 5, 180),
            ]),
            day(3, "Full body", vec![
                exercise("Deadlift", 5, 5, 180),
                exercise("Overhead press", 5, 5, 180),
                exercise("Pull-up", 3, 8, 120),
            ]),
            day(5, "Full body", vec![
                exercise("Back squat", 5, 5, 180),
                exercise("Bench press", 5, 5, 180),
                exercise("Deadlift", 3, 5, 180),
            ]),
        ],
        GoalClass::FatLoss => vec![
            day(1, "Circuit", vec![
                exercise("Goblet squat", 3, 15, 45),
                exercise("Push-up", 3, 15, 45),
                exercise("Kettlebell swing", 3, 15, 45),
            ]),
            day(3, "Circuit", vec![
                exercise("Lunge", 3, 12, 45),
                exercise("Dumbbell row", 3, 15, 45),
                exercise("Mountain climber", 3, 20, 45),
            ]),
            day(5, "Cardio intervals", vec![
                exercise("Rowing intervals", 8, 1, 60),
                exercise("Bike sprints", 6, 1, 60),
            ]),
        ],
        GoalClass::Endurance => vec![
            day(1, "Steady cardio", vec![exercise("Easy run", 1, 1, 0)]),
            day(3, "Intervals", vec![exercise("Track intervals", 6, 1, 90)]),
            day(5, "Tempo", vec![exercise("Tempo run", 1, 1, 0)]),
            day(6, "Long session", vec![exercise("Long run", 1, 1, 0)]),
        ],
        GoalClass::Flexibility => vec![
            day(1, "Mobility", vec![
                exercise("Hip mobility flow", 2, 10, 30),
                exercise("Thoracic rotations", 2, 10, 30),
            ]),
            day(3, "Yoga", vec![exercise("Vinyasa sequence", 1, 1, 0)]),
            day(5, "Mobility", vec![
                exercise("Hamstring stretch series", 2, 10, 30),
                exercise("Shoulder dislocates", 2, 12, 30),
            ]),
        ],
        GoalClass::GeneralFitness => vec![
            day(1, "Full body", vec![
                exercise("Goblet squat", 3, 12, 60),
                exercise("Push-up", 3, 12, 60),
                exercise("Dumbbell row", 3, 12, 60),
            ]),
            day(3, "Cardio", vec![exercise("Brisk walk or jog", 1, 1, 0)]),
            day(5, "Full body", vec![
                exercise("Step-up", 3, 12, 60),
                exercise("Overhead press", 3, 12, 60),
                exercise("Plank", 3, 1, 60),
            ]),
        ],
    };

    CreateWorkoutPlanRequest {
        title: format!("Default {} workout plan", class.as_str().replace('_', " ")),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_goal_classification() {
        assert_eq!(classify_goal("I want to build muscle"), GoalClass::MuscleGain);
        assert_eq!(classify_goal("lose some fat"), GoalClass::FatLoss);
        assert_eq!(classify_goal("get STRONGER at lifting"), GoalClass::Strength);
        assert_eq!(classify_goal("train for a marathon"), GoalClass::Endurance);
        assert_eq!(classify_goal("improve flexibility"), GoalClass::Flexibility);
        assert_eq!(classify_goal("just be healthy"), GoalClass::GeneralFitness);
        assert_eq!(classify_goal(""), GoalClass::GeneralFitness);
    }

    #[test]
    fn test_muscle_gain_worked_example() {
        // goal="muscle gain", weight=80kg, no stored target
        let split = derive_macro_split("muscle gain", 80.0, None);

        assert_eq!(split.calories, 2000);
        assert_eq!(split.protein_g, 144);
        assert_eq!(split.fat_g, 56);
        // (2000 - 576 - 504) / 4
        assert_eq!(split.carbs_g, 230);
    }

    #[test]
    fn test_split_is_pure_and_idempotent() {
        let a = derive_macro_split("endurance running", 65.5, Some(2400));
        let b = derive_macro_split("endurance running", 65.5, Some(2400));
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_resums_to_calorie_target() {
        for (goal, weight, calories) in [
            ("muscle gain", 80.0, None),
            ("fat loss", 95.0, Some(1800)),
            ("flexibility", 60.0, Some(2200)),
            ("strength", 110.0, Some(3200)),
        ] {
            let split = derive_macro_split(goal, weight, calories);
            let total = split.protein_g * 4 + split.carbs_g * 4 + split.fat_g * 9;
            // Gram rounding leaves at most a few kcal of slack
            assert!(
                (total - split.calories).abs() <= 4,
                "{} kcal split resums to {}",
                split.calories,
                total
            );
        }
    }

    #[test]
    fn test_carbs_floor_at_zero() {
        // Heavy lifter with a very low calorie target: protein + fat exceed
        // the budget and carbs clamp to zero instead of going negative.
        let split = derive_macro_split("strength", 150.0, Some(1000));
        assert_eq!(split.carbs_g, 0);
    }

    #[test]
    fn test_protein_scale_by_class() {
        let gain = derive_macro_split("muscle gain", 100.0, None);
        let loss = derive_macro_split("fat loss", 100.0, None);
        let general = derive_macro_split("stay healthy", 100.0, None);

        assert_eq!(gain.protein_g, 180);
        assert_eq!(loss.protein_g, 160);
        assert_eq!(general.protein_g, 140);
    }

    #[test]
    fn test_default_diet_plan_meal_distribution() {
        let split = derive_macro_split("fat loss", 80.0, Some(2000));
        let plan = default_diet_plan("fat loss", split);

        assert_eq!(plan.meals.len(), 4);
        let meal_calories: i32 = plan.meals.iter().filter_map(|m| m.target_calories).sum();
        assert_eq!(meal_calories, 2000);
    }

    #[test]
    fn test_default_workout_plan_shapes() {
        let muscle = default_workout_plan("build muscle");
        assert_eq!(muscle.days.len(), 4);

        let strength = default_workout_plan("powerlifting strength");
        assert_eq!(strength.days.len(), 3);
        assert_eq!(strength.days[0].exercises[0].sets, Some(5));

        let endurance = default_workout_plan("marathon");
        assert_eq!(endurance.days.len(), 4);

        for plan in [&muscle, &strength, &endurance] {
            for day in &plan.days {
                assert!((0..7).contains(&day.day_of_week));
                assert!(!day.exercises.is_empty());
            }
        }
    }
}
