//! Daily score, workout history and the small derived numbers on the
//! dashboard. Every function here is total: missing data counts as zero.

use crate::dates::{date_key, epoch_millis, parse_day_key};
use crate::models::{
    Food, FoodHistory, Medication, TodaySummary, WeightLog, WorkoutHistory, WorkoutLogItem,
    WorkoutMeta, WorkoutTask,
};
use crate::history;
use crate::schedule::{self, is_completed_today};
use crate::store::Snapshot;
use chrono::NaiveDateTime;
use serde_json::Value;

pub const STEP_GOAL: f64 = 10_000.0;
const CALORIE_WEIGHT: f64 = 40.0;
const STEP_WEIGHT: f64 = 40.0;
const MEDICATION_WEIGHT: f64 = 20.0;
/// 0.04 kcal per step, kept as a fraction so flooring is exact.
const CALORIES_PER_HUNDRED_STEPS: u64 = 4;
pub const ESTIMATE_NAME: &str = "Missed Day Estimate ✨";

fn capped_ratio(value: f64, goal: f64) -> f64 {
    if goal.is_nan() || goal <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / goal).clamp(0.0, 1.0)
}

/// Composite 0–100 adherence score.
pub fn daily_score(
    calories: f64,
    calorie_goal: f64,
    steps: u32,
    meds: &[Medication],
    surgery_mode: bool,
    now: NaiveDateTime,
) -> u32 {
    let calorie_part = capped_ratio(calories, calorie_goal) * CALORIE_WEIGHT;
    let step_part = capped_ratio(f64::from(steps), STEP_GOAL) * STEP_WEIGHT;

    let mut applicable = 0usize;
    let mut taken = 0usize;
    for med in schedule::applicable(meds, surgery_mode) {
        applicable += 1;
        taken += usize::from(is_completed_today(med, now));
    }
    // Nothing to take is not penalized.
    let med_part = if applicable == 0 {
        MEDICATION_WEIGHT
    } else {
        taken as f64 / applicable as f64 * MEDICATION_WEIGHT
    };

    (calorie_part + step_part + med_part).round().clamp(0.0, 100.0) as u32
}

pub fn total_calories(foods: &[Food]) -> f64 {
    foods.iter().map(|food| food.calories).filter(|c| c.is_finite()).sum()
}

pub fn total_protein(foods: &[Food]) -> f64 {
    foods.iter().map(|food| food.protein).filter(|p| p.is_finite()).sum()
}

/// Steps burn a flat rate; the routine burns its estimate in proportion to completion.
pub fn calories_burned(steps: u32, meta: &WorkoutMeta, tasks: &[WorkoutTask]) -> u64 {
    let from_steps = u64::from(steps) * CALORIES_PER_HUNDRED_STEPS / 100;
    let completed = tasks.iter().filter(|task| task.completed).count();
    let progress = if tasks.is_empty() {
        0.0
    } else {
        completed as f64 / tasks.len() as f64
    };
    let routine = if meta.total_calories.is_finite() {
        meta.total_calories.max(0.0)
    } else {
        0.0
    };
    from_steps + (routine * progress).floor() as u64
}

pub fn motivation(steps: u32, tasks: &[WorkoutTask]) -> &'static str {
    let steps = f64::from(steps);
    if steps > STEP_GOAL {
        "Overachiever energy! You are literally glowing. ✨🔥"
    } else if !tasks.is_empty() && tasks.iter().all(|task| task.completed) {
        "Snatched waist, heavy glutes. You are sculpting art. 🦢"
    } else if steps > 5000.0 {
        "Walking queen! You just burned off that Matcha. 🍵"
    } else {
        "A little movement fixes the mood. Just 5 minutes?"
    }
}

pub fn today_summary(snapshot: &Snapshot, now: NaiveDateTime) -> TodaySummary {
    let date = date_key(now.date());
    let foods = snapshot.foods_on(&date);
    let calories = total_calories(foods);
    TodaySummary {
        score: daily_score(
            calories,
            snapshot.goals.calories,
            snapshot.steps,
            &snapshot.meds,
            snapshot.surgery_mode,
            now,
        ),
        calories,
        protein: total_protein(foods),
        goals: snapshot.goals,
        steps: snapshot.steps,
        calories_burned: calories_burned(snapshot.steps, &snapshot.workout_meta, &snapshot.workouts),
        latest_weight: history::latest_weight(&snapshot.weights),
        surgery_mode: snapshot.surgery_mode,
        next_up: schedule::next_up(&snapshot.meds, snapshot.surgery_mode, now).cloned(),
        compliance: schedule::compliance(
            &snapshot.meds,
            &snapshot.skincare,
            snapshot.surgery_mode,
            now,
        ),
        motivation: motivation(snapshot.steps, &snapshot.workouts),
        date,
    }
}

/// Flips one task of the routine and returns it as it is now.
fn flip_task(tasks: &mut [WorkoutTask], id: &str) -> Option<WorkoutTask> {
    let task = tasks.iter_mut().find(|task| task.id == id)?;
    task.completed = !task.completed;
    Some(task.clone())
}

/// Mirrors a task's completion into today's history.
///
/// Entries are matched by exercise name, not id, so two exercises sharing a
/// name share one history slot. At most one entry per name per day.
fn record_completion(history: &mut WorkoutHistory, task: &WorkoutTask, now: NaiveDateTime) {
    let day = date_key(now.date());
    if !task.completed {
        if let Some(entries) = history.get_mut(&day) {
            entries.retain(|entry| entry.name != task.name);
        }
        return;
    }
    let entries = history.entry(day).or_default();
    if !entries.iter().any(|entry| entry.name == task.name) {
        entries.push(WorkoutLogItem {
            id: task.id.clone(),
            name: task.name.clone(),
            reps: task.reps.clone(),
            completed_at: epoch_millis(now),
        });
    }
}

/// Flips a task and mirrors it into history. Returns the task as it is now.
pub fn toggle_workout(
    tasks: &mut [WorkoutTask],
    history: &mut WorkoutHistory,
    id: &str,
    now: NaiveDateTime,
) -> Option<WorkoutTask> {
    let task = flip_task(tasks, id)?;
    record_completion(history, &task, now);
    Some(task)
}

/// Accepts a number or numeric string; anything else is ignored.
pub fn parse_weight(raw: &Value) -> Option<f64> {
    let weight = match raw {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    (weight.is_finite() && weight > 0.0).then_some(weight)
}

/// Whole, non-negative step counts only; anything else is ignored.
pub fn parse_steps(raw: &Value) -> Option<u32> {
    match raw {
        Value::Number(number) => number.as_u64().and_then(|steps| u32::try_from(steps).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// One entry per day, later values win, kept in date order.
pub fn upsert_weight(logs: &mut Vec<WeightLog>, day: &str, weight: f64) {
    match logs.iter_mut().find(|log| log.date == day) {
        Some(log) => log.weight = weight,
        None => logs.push(WeightLog {
            date: day.to_string(),
            weight,
        }),
    }
    logs.sort_by_key(|log| parse_day_key(&log.date));
}

pub fn log_food(history: &mut FoodHistory, day: &str, food: Food) {
    history.entry(day.to_string()).or_default().push(food);
}

/// Removes the entry at `index` for `day`; out-of-range indexes change nothing.
pub fn delete_food(history: &mut FoodHistory, day: &str, index: usize) -> Option<Food> {
    let entries = history.get_mut(day)?;
    if index >= entries.len() {
        return None;
    }
    Some(entries.remove(index))
}

/// Logs a rough calorie figure for a day that was not tracked.
pub fn add_estimate(history: &mut FoodHistory, day: &str, raw: &str, id: String) -> Option<Food> {
    let calories: f64 = raw.trim().parse().ok()?;
    if !calories.is_finite() || calories < 0.0 {
        return None;
    }
    let food = Food {
        id,
        name: ESTIMATE_NAME.to_string(),
        calories: calories.trunc(),
        protein: 0.0,
        carbs: Some(0.0),
        fats: Some(0.0),
        fiber: Some(0.0),
        meal_type: None,
    };
    log_food(history, day, food.clone());
    Some(food)
}
