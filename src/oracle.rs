//! Text-generation adapter behind the AI features.
//!
//! Every feature returns a proposal for the caller to review. Nothing here
//! writes to the store.

use crate::dates::is_weekday_code;
use crate::history::{forecast_series, recent_weights};
use crate::models::{ForecastPoint, Food, Medication, WeightLog, WorkoutMeta, WorkoutTask};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODELS: [&str; 3] = [
    "gemini-3-pro-preview",
    "gemini-3-flash-preview",
    "gemini-2.5-flash",
];

const FORECAST_CONTEXT: usize = 10;
const DEFAULT_TRIAGE_NOTE: &str = "Medications updated based on general surgical guidelines.";

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("no API key configured")]
    MissingKey,

    #[error("no models configured")]
    NoModels,

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model {model} answered {status}: {body}")]
    Status {
        model: String,
        status: u16,
        body: String,
    },

    #[error("empty answer")]
    Empty,

    #[error("unreadable answer: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<InlineImage>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: InlineImage) -> Self {
        Self {
            text: text.into(),
            image: Some(image),
        }
    }
}

/// A hosted model that turns a prompt into text.
pub trait TextModel: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
    ) -> impl Future<Output = Result<String, OracleError>> + Send;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl TextModel for GeminiClient {
    async fn generate(&self, model: &str, prompt: &Prompt) -> Result<String, OracleError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(OracleError::MissingKey);
        };

        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &prompt.image {
            parts.push(serde_json::json!({
                "inline_data": { "mime_type": image.mime_type, "data": image.data }
            }));
        }
        parts.push(serde_json::json!({ "text": prompt.text }));

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(&serde_json::json!({
                "contents": [{ "role": "user", "parts": parts }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                model: model.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.text())
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Strips markdown code fences and parses the remaining JSON.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, OracleError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim()).map_err(|err| OracleError::Malformed(err.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default, rename = "dietary_feedback", alias = "dietaryFeedback")]
    pub dietary_feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealIdea {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealIdeas {
    pub standard: MealIdea,
    pub twist: MealIdea,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseIdea {
    pub name: String,
    #[serde(default)]
    pub reps: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutProposal {
    #[serde(default)]
    pub routine_title: String,
    #[serde(default)]
    pub total_estimated_calories: f64,
    #[serde(default)]
    pub schedule: Vec<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseIdea>,
    #[serde(default)]
    pub ai_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct ForecastAnswer {
    #[serde(default)]
    predictions: Vec<ForecastPoint>,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageProposal {
    /// Medication names (or fragments) to pause.
    #[serde(default)]
    pub unsafe_ids: Vec<String>,
    #[serde(default)]
    pub summary_note: String,
}

/// Ordered model fallback plus the feature prompts.
pub struct Oracle<M> {
    model: M,
    models: Vec<String>,
}

impl<M: TextModel> Oracle<M> {
    pub fn new(model: M, models: Vec<String>) -> Self {
        Self { model, models }
    }

    /// Tries each model in order and returns the first non-empty answer.
    pub async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError> {
        let mut last_error = OracleError::NoModels;
        for name in &self.models {
            match self.model.generate(name, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(model = %name, "oracle answered");
                    return Ok(text);
                }
                Ok(_) => {
                    warn!(model = %name, "model returned an empty answer");
                    last_error = OracleError::Empty;
                }
                Err(OracleError::MissingKey) => return Err(OracleError::MissingKey),
                Err(err) => {
                    warn!(model = %name, "model failed: {err}");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    async fn structured<T: DeserializeOwned>(&self, prompt: &Prompt) -> Result<T, OracleError> {
        let text = self.complete(prompt).await?;
        parse_structured(&text)
    }

    pub async fn ask(&self, question: &str) -> Result<String, OracleError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(OracleError::Malformed("question is empty".into()));
        }
        let prompt = format!(
            "You are a sophisticated, \"Coquette\" aesthetic fitness, health, and beauty expert. \
             Your tone is supportive, elegant, and knowledgeable (like a ballet instructor or a \
             high-end wellness coach).\n\nUser Question: \"{question}\"\n\nProvide a concise, \
             helpful, and scientifically accurate answer (max 150 words). Use an occasional \
             emoji (🦢, 🎀, ✨) but keep it readable."
        );
        let answer = self.complete(&Prompt::text(prompt)).await?;
        Ok(answer.trim().to_string())
    }

    pub async fn analyze_meal(&self, image: InlineImage) -> Result<MealAnalysis, OracleError> {
        let prompt = Prompt::with_image(
            "Identify this food. Return JSON: { \"name\": \"string\", \"calories\": number, \
             \"protein\": number, \"carbs\": number, \"fats\": number, \"fiber\": number, \
             \"summary\": \"string\", \"dietary_feedback\": \"string\" }",
            image,
        );
        self.structured(&prompt).await
    }

    pub async fn refine_meal(
        &self,
        original: &MealAnalysis,
        correction: &str,
    ) -> Result<MealAnalysis, OracleError> {
        let original = serde_json::to_string(original)
            .map_err(|err| OracleError::Malformed(err.to_string()))?;
        let prompt = format!(
            "Original: {original}. Correction: \"{}\". Update JSON.",
            correction.trim()
        );
        self.structured(&Prompt::text(prompt)).await
    }

    pub async fn suggest_meals(
        &self,
        remaining_calories: f64,
        calorie_goal: f64,
        pantry: &[Food],
    ) -> Result<MealIdeas, OracleError> {
        let pantry_list = pantry
            .iter()
            .map(|food| food.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            "I have {remaining} calories left today (Goal: {goal}). Pantry: [{pantry_list}]. \
             Generate TWO meal options. Return JSON: {{ \"standard\": {{ \"name\": \"\", \
             \"calories\": 0, \"protein\": 0, \"description\": \"\", \"ingredients\": [] }}, \
             \"twist\": {{ \"name\": \"\", \"calories\": 0, \"protein\": 0, \"description\": \"\", \
             \"ingredients\": [] }} }}",
            remaining = remaining_calories.round(),
            goal = calorie_goal.round(),
        );
        self.structured(&Prompt::text(prompt)).await
    }

    /// A single replacement for the adventurous suggestion.
    pub async fn suggest_twist(&self, remaining_calories: f64) -> Result<MealIdea, OracleError> {
        let prompt = format!(
            "Give me a NEW twist meal option < {} cals. Return JSON: {{ \"name\": \"\", \
             \"calories\": 0, \"protein\": 0, \"description\": \"\", \"ingredients\": [] }}",
            remaining_calories.round()
        );
        self.structured(&Prompt::text(prompt)).await
    }

    pub async fn design_workout(
        &self,
        request: &str,
        meta: &WorkoutMeta,
        tasks: &[WorkoutTask],
    ) -> Result<WorkoutProposal, OracleError> {
        let context = serde_json::json!({
            "currentTitle": meta.title,
            "currentSchedule": meta.schedule,
            "currentExercises": tasks
                .iter()
                .map(|task| serde_json::json!({ "name": task.name, "reps": task.reps }))
                .collect::<Vec<_>>(),
        });
        let prompt = format!(
            "You are a coquette, high-fashion personal trainer AI.\n\
             User wants to edit/create a workout.\n\
             Context: {context}\n\
             User Request: \"{}\"\n\n\
             Task:\n\
             1. Create a new routine based on the request.\n\
             2. Determine the BEST schedule (days of week) for this routine based on user \
             constraints. Use these exact codes: [\"Mon\", \"Tue\", \"Wed\", \"Thu\", \"Fri\", \
             \"Sat\", \"Sun\"].\n\
             3. Estimate the TOTAL calories burned if the user completes this entire routine \
             (be realistic).\n\
             4. Provide a short, supportive, sassy response message.\n\n\
             Output JSON ONLY:\n\
             {{ \"routineTitle\": \"string\", \"totalEstimatedCalories\": number, \
             \"schedule\": [\"string\"], \"exercises\": [ {{ \"name\": \"string\", \"reps\": \
             \"string\" }} ], \"aiMessage\": \"string\" }}",
            request.trim()
        );
        let mut proposal: WorkoutProposal = self.structured(&Prompt::text(prompt)).await?;
        proposal.schedule.retain(|day| is_weekday_code(day));
        if proposal.schedule.is_empty() {
            proposal.schedule = WorkoutMeta::default().schedule;
        }
        proposal.exercises.retain(|exercise| !exercise.name.trim().is_empty());
        if proposal.routine_title.trim().is_empty() {
            proposal.routine_title = meta.title.clone();
        }
        Ok(proposal)
    }

    pub async fn forecast_weight(&self, weights: &[WeightLog]) -> Result<Forecast, OracleError> {
        let recent = recent_weights(weights, FORECAST_CONTEXT);
        let history = serde_json::to_string(recent)
            .map_err(|err| OracleError::Malformed(err.to_string()))?;
        let prompt = format!(
            "Act as a fitness data analyst.\n\
             Based on this weight history: {history}.\n\n\
             1. Predict the weight for the next 4 weeks (one data point per week) assuming a \
             healthy, consistent trend continues.\n\
             2. If there is not enough data (less than 2 points), assume a standard 0.5kg loss \
             per week from the last weight.\n\
             3. Provide a short, motivating \"Coquette\" aesthetic summary (max 20 words).\n\n\
             Return JSON ONLY:\n\
             {{ \"predictions\": [ {{ \"date\": \"YYYY-MM-DD\", \"weight\": number }} ], \
             \"summary\": \"string\" }}"
        );
        let answer: ForecastAnswer = self.structured(&Prompt::text(prompt)).await?;
        Ok(Forecast {
            points: forecast_series(recent, answer.predictions),
            summary: answer.summary,
        })
    }

    pub async fn triage_surgery(
        &self,
        meds: &[Medication],
        note: &str,
    ) -> Result<TriageProposal, OracleError> {
        let med_list = meds
            .iter()
            .map(|med| format!("- {} ({})", med.name, med.dose))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "I am a transwoman patient undergoing surgery soon (general anesthesia).\n\
             Patient's Specific Surgery & Doctor's Notes: \"{}\"\n\
             Review my current medication list:\n{med_list}\n\
             Identify medications that are typically STOPPED 1-2 weeks before surgery due to \
             bleeding risks (e.g. Vitamin E, Fish Oil, Aspirin) or blood clot risks (e.g. \
             Estrogen/HRT interactions with anesthesia).\n\
             Return a JSON object with:\n\
             1. \"unsafeIds\": Array of strings containing the names of meds to pause (match \
             names from list roughly).\n\
             2. \"summaryNote\": A short, caring doctor's note (max 30 words) explaining what \
             was paused and why based on the specific context.",
            note.trim()
        );
        let mut proposal: TriageProposal = self.structured(&Prompt::text(prompt)).await?;
        if proposal.summary_note.trim().is_empty() {
            proposal.summary_note = DEFAULT_TRIAGE_NOTE.to_string();
        }
        Ok(proposal)
    }
}
