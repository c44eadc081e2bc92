use crate::dates::{self, date_key, parse_day_key};
use crate::errors::AppError;
use crate::history::{self, GraphMetric};
use crate::models::{
    AskRequest, BodyMetrics, ConfirmQuery, DayView, EstimateRequest, Food, FoodInput, GraphPoint,
    GraphQuery, Goals, Medication, MedicationInput, RefineRequest, RitualStatus, SkincareInput,
    SkincareItem, SkinFrequency, StepsRequest, SurgeryApplyRequest, SurgeryModeRequest,
    TodaySummary, TriageRequest, WeekSummary, WeightLog, WeightRequest, WorkoutDesignRequest,
    WorkoutInput, WorkoutMeta, WorkoutPlanInput, WorkoutTask,
};
use crate::notify::{NotificationBoard, build_board};
use crate::oracle::{Forecast, InlineImage, MealAnalysis, MealIdea, MealIdeas, TriageProposal, WorkoutProposal};
use crate::schedule;
use crate::score;
use crate::state::AppState;
use crate::store::{Document, keys};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{
        Html,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::NaiveDate;
use futures::{Stream, stream};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

const DEFAULT_DOSE: &str = "1 unit";
const DEFAULT_BRAND: &str = "Generic";
const DEFAULT_REPS: &str = "1x10";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let now = dates::now();
    let snapshot = state.store.snapshot().await;
    let summary = score::today_summary(&snapshot, now);
    let board = build_board(now, &snapshot);
    Html(render_index(&summary, &board))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodaySummary>, AppError> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(score::today_summary(&snapshot, dates::now())))
}

pub async fn get_notifications(
    State(state): State<AppState>,
) -> Result<Json<NotificationBoard>, AppError> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(build_board(dates::now(), &snapshot)))
}

/// Pushes the watcher's board now and again whenever it changes.
pub async fn notification_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = stream::unfold((state.board.clone(), true), |(mut board, first)| async move {
        if !first && board.changed().await.is_err() {
            return None;
        }
        let current = board.borrow_and_update().clone();
        let event = Event::default().event("notifications").json_data(&current);
        Some((event, (board, false)))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn get_rituals(State(state): State<AppState>) -> Result<Json<Vec<RitualStatus>>, AppError> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(schedule::statuses(
        &snapshot.meds,
        &snapshot.skincare,
        snapshot.surgery_mode,
        dates::now(),
    )))
}

// Medications

pub async fn list_meds(State(state): State<AppState>) -> Result<Json<Vec<Medication>>, AppError> {
    Ok(Json(state.store.get(&keys::MEDS).await))
}

pub async fn add_med(
    State(state): State<AppState>,
    Json(payload): Json<MedicationInput>,
) -> Result<Json<Medication>, AppError> {
    let med = Medication {
        id: new_id(),
        name: required(&payload.name, "name")?,
        ..medication_fields(payload)
    };
    let created = med.clone();
    state.store.update(&keys::MEDS, |meds| meds.push(med)).await?;
    info!(id = %created.id, name = %created.name, "medication added");
    Ok(Json(created))
}

pub async fn update_med(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MedicationInput>,
) -> Result<Json<Medication>, AppError> {
    let name = required(&payload.name, "name")?;
    let fields = medication_fields(payload);
    let updated = state
        .store
        .update(&keys::MEDS, |meds| {
            let med = meds.iter_mut().find(|med| med.id == id)?;
            *med = Medication {
                id: med.id.clone(),
                name,
                surgery_safe: med.surgery_safe,
                last_taken_date: med.last_taken_date,
                ..fields
            };
            Some(med.clone())
        })
        .await?;
    updated
        .map(Json)
        .ok_or_else(|| AppError::not_found("medication", &id))
}

pub async fn delete_med(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Medication>>, AppError> {
    let remaining = state
        .store
        .update(&keys::MEDS, |meds| {
            let before = meds.len();
            meds.retain(|med| med.id != id);
            (meds.len() != before).then(|| meds.clone())
        })
        .await?;
    remaining
        .map(Json)
        .ok_or_else(|| AppError::not_found("medication", &id))
}

pub async fn toggle_med(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Medication>, AppError> {
    let surgery_mode = state.store.get(&keys::SURGERY_MODE).await;
    let now = dates::now();
    let toggled = state
        .store
        .update(&keys::MEDS, |meds| {
            let med = meds
                .iter_mut()
                .find(|med| med.id == id)
                .ok_or_else(|| AppError::not_found("medication", &id))?;
            if surgery_mode && !med.surgery_safe {
                return Err(AppError::bad_request(format!(
                    "{} is paused while surgery mode is on",
                    med.name
                )));
            }
            schedule::toggle_completion(med, now);
            Ok(med.clone())
        })
        .await??;
    info!(id = %toggled.id, taken = schedule::is_completed_today(&toggled, now), "medication toggled");
    Ok(Json(toggled))
}

// Skincare

pub async fn list_skincare(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkincareItem>>, AppError> {
    Ok(Json(state.store.get(&keys::SKINCARE).await))
}

pub async fn add_skincare(
    State(state): State<AppState>,
    Json(payload): Json<SkincareInput>,
) -> Result<Json<SkincareItem>, AppError> {
    let item = SkincareItem {
        id: new_id(),
        name: required(&payload.name, "name")?,
        ..skincare_fields(payload)
    };
    let created = item.clone();
    state
        .store
        .update(&keys::SKINCARE, |items| items.push(item))
        .await?;
    info!(id = %created.id, name = %created.name, "skincare item added");
    Ok(Json(created))
}

pub async fn update_skincare(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SkincareInput>,
) -> Result<Json<SkincareItem>, AppError> {
    let name = required(&payload.name, "name")?;
    let fields = skincare_fields(payload);
    let updated = state
        .store
        .update(&keys::SKINCARE, |items| {
            let item = items.iter_mut().find(|item| item.id == id)?;
            *item = SkincareItem {
                id: item.id.clone(),
                name,
                last_used_date: item.last_used_date,
                ..fields
            };
            Some(item.clone())
        })
        .await?;
    updated
        .map(Json)
        .ok_or_else(|| AppError::not_found("skincare item", &id))
}

pub async fn delete_skincare(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SkincareItem>>, AppError> {
    let remaining = state
        .store
        .update(&keys::SKINCARE, |items| {
            let before = items.len();
            items.retain(|item| item.id != id);
            (items.len() != before).then(|| items.clone())
        })
        .await?;
    remaining
        .map(Json)
        .ok_or_else(|| AppError::not_found("skincare item", &id))
}

pub async fn toggle_skincare(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SkincareItem>, AppError> {
    let now = dates::now();
    let toggled = state
        .store
        .update(&keys::SKINCARE, |items| {
            let item = items.iter_mut().find(|item| item.id == id)?;
            schedule::toggle_completion(item, now);
            Some(item.clone())
        })
        .await?
        .ok_or_else(|| AppError::not_found("skincare item", &id))?;
    info!(id = %toggled.id, used = schedule::is_completed_today(&toggled, now), "skincare toggled");
    Ok(Json(toggled))
}

// Daily metrics

#[derive(Debug, Serialize)]
pub struct StepsResponse {
    pub steps: u32,
}

/// Negative counts are ignored and leave the stored value as it was.
pub async fn set_steps(
    State(state): State<AppState>,
    Json(payload): Json<StepsRequest>,
) -> Result<Json<StepsResponse>, AppError> {
    let Some(steps) = score::parse_steps(&payload.steps) else {
        let steps = state.store.get(&keys::STEPS).await;
        return Ok(Json(StepsResponse { steps }));
    };
    state.store.set(&keys::STEPS, &steps).await?;
    Ok(Json(StepsResponse { steps }))
}

pub async fn get_goals(State(state): State<AppState>) -> Result<Json<Goals>, AppError> {
    Ok(Json(state.store.get(&keys::GOALS).await))
}

pub async fn put_goals(
    State(state): State<AppState>,
    Json(goals): Json<Goals>,
) -> Result<Json<Goals>, AppError> {
    if !goals.calories.is_finite() || goals.calories <= 0.0 {
        return Err(AppError::bad_request("calorie goal must be positive"));
    }
    if !goals.protein.is_finite() || goals.protein < 0.0 {
        return Err(AppError::bad_request("protein goal must not be negative"));
    }
    state.store.set(&keys::GOALS, &goals).await?;
    Ok(Json(goals))
}

pub async fn get_body(State(state): State<AppState>) -> Result<Json<BodyMetrics>, AppError> {
    Ok(Json(state.store.get(&keys::BODY).await))
}

pub async fn put_body(
    State(state): State<AppState>,
    Json(body): Json<BodyMetrics>,
) -> Result<Json<BodyMetrics>, AppError> {
    state.store.set(&keys::BODY, &body).await?;
    Ok(Json(body))
}

/// Records today's weight. Unparseable values are ignored.
pub async fn log_weight(
    State(state): State<AppState>,
    Json(payload): Json<WeightRequest>,
) -> Result<Json<Vec<WeightLog>>, AppError> {
    let Some(weight) = score::parse_weight(&payload.weight) else {
        return Ok(Json(state.store.get(&keys::WEIGHTS).await));
    };
    let today = today();
    let logs = state
        .store
        .update(&keys::WEIGHTS, |logs| {
            score::upsert_weight(logs, &today, weight);
            logs.clone()
        })
        .await?;
    info!(date = %today, weight, "weight logged");
    Ok(Json(logs))
}

// Meals

pub async fn log_meal(
    State(state): State<AppState>,
    Json(payload): Json<FoodInput>,
) -> Result<Json<Food>, AppError> {
    let day = match payload.date.as_deref() {
        Some(raw) => date_key(day_param(raw)?),
        None => today(),
    };
    let food = food_from_input(payload)?;
    let logged = food.clone();
    state
        .store
        .update(&keys::FOOD_HISTORY, |history| {
            score::log_food(history, &day, food)
        })
        .await?;
    info!(date = %day, name = %logged.name, calories = logged.calories, "meal logged");
    Ok(Json(logged))
}

pub async fn delete_meal(
    State(state): State<AppState>,
    Path((date, index)): Path<(String, usize)>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<Food>, AppError> {
    if !query.confirm {
        return Err(AppError::bad_request("removing an entry requires confirm=true"));
    }
    let day = date_key(day_param(&date)?);
    let removed = state
        .store
        .update(&keys::FOOD_HISTORY, |history| {
            score::delete_food(history, &day, index)
        })
        .await?
        .ok_or_else(|| AppError::not_found("entry", &format!("{day}/{index}")))?;
    info!(date = %day, name = %removed.name, "meal removed");
    Ok(Json(removed))
}

/// Non-numeric input is ignored and answers `null`.
pub async fn estimate_meal(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<Option<Food>>, AppError> {
    let day = date_key(day_param(&date)?);
    let id = new_id();
    let logged = state
        .store
        .update(&keys::FOOD_HISTORY, |history| {
            score::add_estimate(history, &day, &payload.calories, id)
        })
        .await?;
    Ok(Json(logged))
}

// Pantry

pub async fn list_pantry(State(state): State<AppState>) -> Result<Json<Vec<Food>>, AppError> {
    Ok(Json(state.store.get(&keys::PANTRY).await))
}

pub async fn add_pantry(
    State(state): State<AppState>,
    Json(payload): Json<FoodInput>,
) -> Result<Json<Food>, AppError> {
    let mut food = food_from_input(payload)?;
    food.carbs.get_or_insert(0.0);
    food.fats.get_or_insert(0.0);
    food.fiber.get_or_insert(0.0);
    let saved = food.clone();
    state.store.update(&keys::PANTRY, |pantry| pantry.push(food)).await?;
    Ok(Json(saved))
}

pub async fn delete_pantry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Food>>, AppError> {
    state
        .store
        .update(&keys::PANTRY, |pantry| {
            if !pantry.iter().any(|food| food.id == id) {
                return Err(AppError::not_found("pantry food", &id));
            }
            if pantry.len() <= 1 {
                return Err(AppError::bad_request("the pantry must keep at least one food"));
            }
            pantry.retain(|food| food.id != id);
            Ok(pantry.clone())
        })
        .await?
        .map(Json)
}

// Workouts

#[derive(Debug, Serialize)]
pub struct WorkoutPlan {
    pub meta: WorkoutMeta,
    pub exercises: Vec<WorkoutTask>,
}

pub async fn list_workouts(State(state): State<AppState>) -> Result<Json<WorkoutPlan>, AppError> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(WorkoutPlan {
        meta: snapshot.workout_meta,
        exercises: snapshot.workouts,
    }))
}

pub async fn add_workout(
    State(state): State<AppState>,
    Json(payload): Json<WorkoutInput>,
) -> Result<Json<WorkoutTask>, AppError> {
    let task = task_from_input(payload)?;
    let created = task.clone();
    state.store.update(&keys::WORKOUTS, |tasks| tasks.push(task)).await?;
    Ok(Json(created))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<WorkoutTask>>, AppError> {
    state
        .store
        .update(&keys::WORKOUTS, |tasks| {
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            (tasks.len() != before).then(|| tasks.clone())
        })
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("exercise", &id))
}

/// Flips an exercise and mirrors it into today's workout history.
pub async fn toggle_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutTask>, AppError> {
    let now = dates::now();
    let task = state
        .store
        .update_pair(&keys::WORKOUTS, &keys::WORKOUT_HISTORY, |tasks, history| {
            score::toggle_workout(tasks, history, &id, now)
        })
        .await?
        .ok_or_else(|| AppError::not_found("exercise", &id))?;
    info!(name = %task.name, completed = task.completed, "exercise toggled");
    Ok(Json(task))
}

/// Replaces the routine with a confirmed plan. Completion flags start cleared.
pub async fn save_plan(
    State(state): State<AppState>,
    Json(payload): Json<WorkoutPlanInput>,
) -> Result<Json<WorkoutPlan>, AppError> {
    let exercises = payload
        .exercises
        .into_iter()
        .map(task_from_input)
        .collect::<Result<Vec<_>, _>>()?;
    if exercises.is_empty() {
        return Err(AppError::bad_request("a plan needs at least one exercise"));
    }
    let mut meta = payload.meta;
    meta.schedule.retain(|day| dates::is_weekday_code(day));
    if meta.schedule.is_empty() {
        meta.schedule = WorkoutMeta::default().schedule;
    }

    state.store.set(&keys::WORKOUTS, &exercises).await?;
    state.store.set(&keys::WORKOUT_META, &meta).await?;
    info!(title = %meta.title, exercises = exercises.len(), "workout plan saved");
    Ok(Json(WorkoutPlan { meta, exercises }))
}

// History

pub async fn history_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayView>, AppError> {
    let day = day_param(&date)?;
    let snapshot = state.store.snapshot().await;
    Ok(Json(history::day_view(day, dates::now().date(), &snapshot)))
}

pub async fn history_week(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<WeekSummary>, AppError> {
    let day = day_param(&date)?;
    let snapshot = state.store.snapshot().await;
    Ok(Json(history::week_summary(
        day,
        dates::now().date(),
        &snapshot.food_history,
        snapshot.goals.calories,
    )))
}

pub async fn get_graph(
    State(state): State<AppState>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<Vec<GraphPoint>>, AppError> {
    let metric = GraphMetric::parse(query.metric.as_deref())
        .ok_or_else(|| AppError::bad_request("metric must be 'calories' or 'weight'"))?;
    let snapshot = state.store.snapshot().await;
    Ok(Json(history::graph(metric, dates::now().date(), &snapshot)))
}

pub async fn export(State(state): State<AppState>) -> Result<Json<Document>, AppError> {
    Ok(Json(state.store.export().await))
}

// Surgery

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgeryStatus {
    pub enabled: bool,
    pub note: String,
    pub meds: Vec<Medication>,
}

pub async fn set_surgery(
    State(state): State<AppState>,
    Json(payload): Json<SurgeryModeRequest>,
) -> Result<Json<SurgeryStatus>, AppError> {
    state.store.set(&keys::SURGERY_MODE, &payload.enabled).await?;
    if let Some(note) = payload.note {
        state.store.set(&keys::SURGERY_NOTE, &note).await?;
    }
    info!(enabled = payload.enabled, "surgery mode set");
    surgery_status(&state).await.map(Json)
}

/// Commits a reviewed triage: flags unsafe meds and turns surgery mode on.
pub async fn apply_surgery(
    State(state): State<AppState>,
    Json(payload): Json<SurgeryApplyRequest>,
) -> Result<Json<SurgeryStatus>, AppError> {
    let flagged = state
        .store
        .update(&keys::MEDS, |meds| {
            schedule::apply_surgery_triage(meds, &payload.unsafe_ids)
        })
        .await?;
    if let Some(note) = payload.summary_note.filter(|note| !note.trim().is_empty()) {
        state.store.set(&keys::SURGERY_NOTE, &note).await?;
    }
    state.store.set(&keys::SURGERY_MODE, &true).await?;
    info!(flagged, "surgery triage applied");
    surgery_status(&state).await.map(Json)
}

async fn surgery_status(state: &AppState) -> Result<SurgeryStatus, AppError> {
    let snapshot = state.store.snapshot().await;
    Ok(SurgeryStatus {
        enabled: snapshot.surgery_mode,
        note: snapshot.surgery_note,
        meds: snapshot.meds,
    })
}

// Oracle

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

pub async fn oracle_ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let question = required(&payload.question, "question")?;
    let answer = state.oracle.ask(&question).await?;
    Ok(Json(AskResponse { answer }))
}

pub async fn oracle_meal(
    State(state): State<AppState>,
    Json(image): Json<InlineImage>,
) -> Result<Json<MealAnalysis>, AppError> {
    if image.data.trim().is_empty() || !image.mime_type.starts_with("image/") {
        return Err(AppError::bad_request("an image is required"));
    }
    Ok(Json(state.oracle.analyze_meal(image).await?))
}

pub async fn oracle_refine(
    State(state): State<AppState>,
    Json(payload): Json<RefineRequest>,
) -> Result<Json<MealAnalysis>, AppError> {
    let correction = required(&payload.correction, "correction")?;
    Ok(Json(state.oracle.refine_meal(&payload.original, &correction).await?))
}

pub async fn oracle_ideas(State(state): State<AppState>) -> Result<Json<MealIdeas>, AppError> {
    let (remaining, goal, pantry) = remaining_calories(&state).await;
    Ok(Json(state.oracle.suggest_meals(remaining, goal, &pantry).await?))
}

pub async fn oracle_twist(State(state): State<AppState>) -> Result<Json<MealIdea>, AppError> {
    let (remaining, _, _) = remaining_calories(&state).await;
    Ok(Json(state.oracle.suggest_twist(remaining).await?))
}

pub async fn oracle_workout(
    State(state): State<AppState>,
    Json(payload): Json<WorkoutDesignRequest>,
) -> Result<Json<WorkoutProposal>, AppError> {
    let request = required(&payload.request, "request")?;
    let snapshot = state.store.snapshot().await;
    Ok(Json(
        state
            .oracle
            .design_workout(&request, &snapshot.workout_meta, &snapshot.workouts)
            .await?,
    ))
}

pub async fn oracle_forecast(State(state): State<AppState>) -> Result<Json<Forecast>, AppError> {
    let weights = state.store.get(&keys::WEIGHTS).await;
    Ok(Json(state.oracle.forecast_weight(&weights).await?))
}

pub async fn oracle_surgery(
    State(state): State<AppState>,
    Json(payload): Json<TriageRequest>,
) -> Result<Json<TriageProposal>, AppError> {
    let meds = state.store.get(&keys::MEDS).await;
    if meds.is_empty() {
        return Err(AppError::bad_request("there are no medications to review"));
    }
    Ok(Json(state.oracle.triage_surgery(&meds, &payload.note).await?))
}

async fn remaining_calories(state: &AppState) -> (f64, f64, Vec<Food>) {
    let snapshot = state.store.snapshot().await;
    let eaten = score::total_calories(snapshot.foods_on(&today()));
    let goal = snapshot.goals.calories;
    ((goal - eaten).max(0.0), goal, snapshot.pantry)
}

// Helpers

fn today() -> String {
    date_key(dates::now().date())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn day_param(raw: &str) -> Result<NaiveDate, AppError> {
    parse_day_key(raw).ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Everything but identity and completion state.
fn medication_fields(input: MedicationInput) -> Medication {
    Medication {
        id: String::new(),
        name: input.name,
        dose: non_blank(input.dose).unwrap_or_else(|| DEFAULT_DOSE.to_string()),
        kind: input.kind,
        frequency: input.frequency,
        time_of_day: input.time_of_day,
        instructions: non_blank(input.instructions),
        warning_label: non_blank(input.warning_label),
        surgery_safe: true,
        last_taken_date: None,
    }
}

fn skincare_fields(input: SkincareInput) -> SkincareItem {
    let specific_days = match input.frequency {
        SkinFrequency::SpecificDays => Some(
            input
                .specific_days
                .into_iter()
                .filter(|day| dates::is_weekday_code(day))
                .collect(),
        ),
        _ => None,
    };
    SkincareItem {
        id: String::new(),
        name: input.name,
        brand: non_blank(input.brand).unwrap_or_else(|| DEFAULT_BRAND.to_string()),
        active_ingredient: non_blank(input.active_ingredient),
        note: non_blank(input.note),
        time_of_day: input.time_of_day,
        last_used_date: None,
        frequency: input.frequency,
        specific_days,
    }
}

fn food_from_input(input: FoodInput) -> Result<Food, AppError> {
    let name = required(&input.name, "name")?;
    if !input.calories.is_finite() || input.calories < 0.0 {
        return Err(AppError::bad_request("calories must be a non-negative number"));
    }
    if !input.protein.is_finite() || input.protein < 0.0 {
        return Err(AppError::bad_request("protein must be a non-negative number"));
    }
    Ok(Food {
        id: new_id(),
        name,
        calories: input.calories,
        protein: input.protein,
        carbs: input.carbs,
        fats: input.fats,
        fiber: input.fiber,
        meal_type: input.meal_type,
    })
}

fn task_from_input(input: WorkoutInput) -> Result<WorkoutTask, AppError> {
    Ok(WorkoutTask {
        id: new_id(),
        name: required(&input.name, "name")?,
        reps: non_blank(input.reps).unwrap_or_else(|| DEFAULT_REPS.to_string()),
        completed: false,
    })
}
