use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Nutrition log, keyed by day.
pub type FoodHistory = BTreeMap<String, Vec<Food>>;
/// Completed exercises, keyed by day.
pub type WorkoutHistory = BTreeMap<String, Vec<WorkoutLogItem>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TimeOfDay {
    #[default]
    Morning,
    Midday,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MedicationType {
    #[serde(rename = "HRT", alias = "Hrt")]
    Hrt,
    #[default]
    Supplement,
    Pain,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MedFrequency {
    #[default]
    Daily,
    #[serde(rename = "Every Other Day", alias = "EveryOtherDay")]
    EveryOtherDay,
    #[serde(rename = "As Needed", alias = "AsNeeded")]
    AsNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SkinFrequency {
    #[default]
    Daily,
    #[serde(rename = "Every Other Day", alias = "EveryOtherDay")]
    EveryOtherDay,
    #[serde(rename = "Specific Days", alias = "SpecificDays")]
    SpecificDays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(rename = "type", default)]
    pub kind: MedicationType,
    #[serde(default)]
    pub frequency: MedFrequency,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_label: Option<String>,
    #[serde(default = "default_true")]
    pub surgery_safe: bool,
    #[serde(default, with = "crate::dates::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_taken_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkincareItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_ingredient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default, with = "crate::dates::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_used_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub frequency: SkinFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_days: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_meal_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub meal_type: Option<MealType>,
}

impl Food {
    pub fn is_meal(&self, meal: MealType, keyword: &str) -> bool {
        self.meal_type == Some(meal) || self.name.to_lowercase().contains(keyword)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLogItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub reps: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub completed_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutMeta {
    pub title: String,
    #[serde(default)]
    pub total_calories: f64,
    #[serde(default = "default_schedule")]
    pub schedule: Vec<String>,
}

impl Default for WorkoutMeta {
    fn default() -> Self {
        Self {
            title: "Glute Glow Routine".to_string(),
            total_calories: 150.0,
            schedule: default_schedule(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightLog {
    pub date: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default = "default_calorie_goal")]
    pub calories: f64,
    #[serde(default = "default_protein_goal")]
    pub protein: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: default_calorie_goal(),
            protein: default_protein_goal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyMetrics {
    pub height: String,
    pub waist: String,
    pub bust: String,
    pub hips: String,
    pub shoe_size: String,
}

pub fn default_routine() -> Vec<WorkoutTask> {
    [
        ("1", "Glute Bridges", "3x15"),
        ("2", "Clamshells", "3x20"),
        ("3", "Donkey Kicks", "3x15"),
        ("4", "Vacuum Hold", "30 secs"),
    ]
    .into_iter()
    .map(|(id, name, reps)| WorkoutTask {
        id: id.to_string(),
        name: name.to_string(),
        reps: reps.to_string(),
        completed: false,
    })
    .collect()
}

pub fn default_pantry() -> Vec<Food> {
    [
        ("1", "Siomai (4pcs)", 350.0, 12.0, 30.0, 18.0, 1.0),
        ("2", "Fried Tilapia", 200.0, 24.0, 0.0, 10.0, 0.0),
        ("3", "White Rice (1 cup)", 200.0, 4.0, 44.0, 0.5, 0.5),
        ("4", "Boiled Egg", 70.0, 6.0, 0.5, 5.0, 0.0),
        ("5", "Protein Bar", 180.0, 20.0, 22.0, 6.0, 10.0),
        ("6", "Chicken Breast", 165.0, 31.0, 0.0, 3.6, 0.0),
        ("7", "Dumplings", 250.0, 8.0, 32.0, 9.0, 1.0),
    ]
    .into_iter()
    .map(|(id, name, calories, protein, carbs, fats, fiber)| Food {
        id: id.to_string(),
        name: name.to_string(),
        calories,
        protein,
        carbs: Some(carbs),
        fats: Some(fats),
        fiber: Some(fiber),
        meal_type: None,
    })
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> Vec<String> {
    vec!["Mon".to_string(), "Wed".to_string(), "Fri".to_string()]
}

fn default_calorie_goal() -> f64 {
    1300.0
}

fn default_protein_goal() -> f64 {
    100.0
}

fn lenient_meal_type<'de, D>(deserializer: D) -> Result<Option<MealType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|value| value.as_str()).and_then(|value| match value.trim() {
        "Breakfast" => Some(MealType::Breakfast),
        "Lunch" => Some(MealType::Lunch),
        "Dinner" => Some(MealType::Dinner),
        "Snack" => Some(MealType::Snack),
        _ => None,
    }))
}

// Requests

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationInput {
    pub name: String,
    #[serde(default)]
    pub dose: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MedicationType,
    #[serde(default)]
    pub frequency: MedFrequency,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub warning_label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkincareInput {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub active_ingredient: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub frequency: SkinFrequency,
    #[serde(default)]
    pub specific_days: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodInput {
    pub name: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fats: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StepsRequest {
    #[serde(default)]
    pub steps: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    pub weight: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub calories: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutInput {
    pub name: String,
    #[serde(default)]
    pub reps: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanInput {
    pub meta: WorkoutMeta,
    pub exercises: Vec<WorkoutInput>,
}

#[derive(Debug, Deserialize)]
pub struct SurgeryModeRequest {
    pub enabled: bool,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgeryApplyRequest {
    pub unsafe_ids: Vec<String>,
    #[serde(default)]
    pub summary_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub metric: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub original: crate::oracle::MealAnalysis,
    pub correction: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutDesignRequest {
    pub request: String,
}

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    #[serde(default)]
    pub note: String,
}

// Responses

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySummary {
    pub date: String,
    pub score: u32,
    pub calories: f64,
    pub protein: f64,
    pub goals: Goals,
    pub steps: u32,
    pub calories_burned: u64,
    pub latest_weight: Option<f64>,
    pub surgery_mode: bool,
    pub next_up: Option<Medication>,
    pub compliance: f64,
    pub motivation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RitualStatus {
    pub id: String,
    pub name: String,
    pub is_medication: bool,
    pub time_of_day: TimeOfDay,
    pub state: crate::schedule::DueState,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPoint {
    pub date: String,
    pub day: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: String,
    pub weight: f64,
    #[serde(default)]
    pub is_predicted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekDay {
    pub date: String,
    pub day: &'static str,
    pub calories: f64,
    pub over_goal: bool,
    pub is_future: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub days: Vec<WeekDay>,
    pub total_calories: f64,
    pub days_counted: u8,
    pub avg_calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    pub date: String,
    pub is_today: bool,
    pub foods: Vec<Food>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub workouts: Vec<WorkoutLogItem>,
    pub weight: Option<f64>,
    pub previous: String,
    pub next: String,
}
