//! Durable document store.
//!
//! The whole application state is one JSON object mapping record names to
//! values, written back to disk after every mutation. Readers never fail:
//! an absent or malformed record reads as its default. Every write is
//! announced on a broadcast channel so observers can recompute.

use crate::dates::{date_key, parse_day_key};
use crate::errors::AppError;
use crate::models::{
    BodyMetrics, Food, FoodHistory, Goals, Medication, SkincareItem, WeightLog, WorkoutHistory,
    WorkoutMeta, WorkoutTask, default_pantry, default_routine,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::{
    fs,
    sync::{Mutex, broadcast},
};
use tracing::{debug, error, warn};

pub type Document = BTreeMap<String, Value>;

const CHANGE_CAPACITY: usize = 64;

/// A named record together with how to decode it and what it defaults to.
pub struct Key<T> {
    pub name: &'static str,
    fallback: fn() -> T,
    decode: fn(&Value) -> Option<T>,
}

impl<T: DeserializeOwned> Key<T> {
    const fn new(name: &'static str, fallback: fn() -> T) -> Self {
        Self {
            name,
            fallback,
            decode: decode_json::<T>,
        }
    }
}

impl<T> Key<T> {
    const fn with_decoder(
        name: &'static str,
        fallback: fn() -> T,
        decode: fn(&Value) -> Option<T>,
    ) -> Self {
        Self {
            name,
            fallback,
            decode,
        }
    }

    pub fn read(&self, document: &Document) -> T {
        let Some(raw) = document.get(self.name) else {
            return (self.fallback)();
        };
        match (self.decode)(raw) {
            Some(value) => value,
            None => {
                warn!(key = self.name, "malformed record, reading as default");
                (self.fallback)()
            }
        }
    }
}

pub mod keys {
    use super::*;

    pub const MEDS: Key<Vec<Medication>> = Key::with_decoder("meds", Vec::new, decode_list);
    pub const SKINCARE: Key<Vec<SkincareItem>> =
        Key::with_decoder("skincare", Vec::new, decode_list);
    pub const FOOD_HISTORY: Key<FoodHistory> =
        Key::with_decoder("history", FoodHistory::new, decode_day_map::<Food>);
    pub const WORKOUT_HISTORY: Key<WorkoutHistory> =
        Key::with_decoder("workout_history", WorkoutHistory::new, decode_day_map);
    pub const WORKOUTS: Key<Vec<WorkoutTask>> =
        Key::with_decoder("workouts", default_routine, decode_routine);
    pub const WORKOUT_META: Key<WorkoutMeta> = Key::new("workout_meta", WorkoutMeta::default);
    pub const WEIGHTS: Key<Vec<WeightLog>> =
        Key::with_decoder("weight_history", Vec::new, decode_weights);
    pub const GOALS: Key<Goals> = Key::new("goals", Goals::default);
    pub const SURGERY_MODE: Key<bool> =
        Key::with_decoder("surgery_mode", bool::default, decode_flag);
    pub const SURGERY_NOTE: Key<String> = Key::new("surgery_note", String::new);
    pub const STEPS: Key<u32> = Key::with_decoder("steps", u32::default, crate::score::parse_steps);
    pub const PANTRY: Key<Vec<Food>> = Key::with_decoder("pantry", default_pantry, decode_list);
    pub const BODY: Key<BodyMetrics> = Key::new("body", BodyMetrics::default);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
}

/// Typed view of the document at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub meds: Vec<Medication>,
    pub skincare: Vec<SkincareItem>,
    pub food_history: FoodHistory,
    pub workout_history: WorkoutHistory,
    pub workouts: Vec<WorkoutTask>,
    pub workout_meta: WorkoutMeta,
    pub weights: Vec<WeightLog>,
    pub goals: Goals,
    pub surgery_mode: bool,
    pub surgery_note: String,
    pub steps: u32,
    pub pantry: Vec<Food>,
    pub body: BodyMetrics,
}

impl Snapshot {
    pub fn from_document(document: &Document) -> Self {
        Self {
            meds: keys::MEDS.read(document),
            skincare: keys::SKINCARE.read(document),
            food_history: keys::FOOD_HISTORY.read(document),
            workout_history: keys::WORKOUT_HISTORY.read(document),
            workouts: keys::WORKOUTS.read(document),
            workout_meta: keys::WORKOUT_META.read(document),
            weights: keys::WEIGHTS.read(document),
            goals: keys::GOALS.read(document),
            surgery_mode: keys::SURGERY_MODE.read(document),
            surgery_note: keys::SURGERY_NOTE.read(document),
            steps: keys::STEPS.read(document),
            pantry: keys::PANTRY.read(document),
            body: keys::BODY.read(document),
        }
    }

    pub fn foods_on(&self, day: &str) -> &[Food] {
        self.food_history.get(day).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn workouts_on(&self, day: &str) -> &[crate::models::WorkoutLogItem] {
        self.workout_history
            .get(day)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

pub struct Store {
    path: Option<PathBuf>,
    document: Mutex<Document>,
    changes: broadcast::Sender<StoreChange>,
}

impl Store {
    /// Opens the document at `path`, starting empty when it is missing or unreadable.
    pub async fn open(path: PathBuf) -> Self {
        let document = load_document(&path).await;
        Self::build(Some(path), document)
    }

    /// A store that never touches disk.
    pub fn in_memory(document: Document) -> Self {
        Self::build(None, document)
    }

    fn build(path: Option<PathBuf>, document: Document) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            path,
            document: Mutex::new(document),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    pub async fn get<T>(&self, key: &Key<T>) -> T {
        let document = self.document.lock().await;
        key.read(&document)
    }

    pub async fn snapshot(&self) -> Snapshot {
        let document = self.document.lock().await;
        Snapshot::from_document(&document)
    }

    pub async fn export(&self) -> Document {
        self.document.lock().await.clone()
    }

    pub async fn set<T: Serialize>(&self, key: &Key<T>, value: &T) -> Result<(), AppError> {
        let encoded = serde_json::to_value(value).map_err(AppError::internal)?;
        let mut document = self.document.lock().await;
        document.insert(key.name.to_string(), encoded);
        self.commit(&[key.name], &document).await
    }

    /// Read-modify-write of a single record under the store lock.
    pub async fn update<T, R, F>(&self, key: &Key<T>, apply: F) -> Result<R, AppError>
    where
        T: Serialize,
        F: FnOnce(&mut T) -> R,
    {
        let mut document = self.document.lock().await;
        let mut value = key.read(&document);
        let result = apply(&mut value);
        let encoded = serde_json::to_value(&value).map_err(AppError::internal)?;
        document.insert(key.name.to_string(), encoded);
        self.commit(&[key.name], &document).await?;
        Ok(result)
    }

    /// Read-modify-write of two records that land on disk in one write.
    pub async fn update_pair<A, B, R, F>(
        &self,
        first: &Key<A>,
        second: &Key<B>,
        apply: F,
    ) -> Result<R, AppError>
    where
        A: Serialize,
        B: Serialize,
        F: FnOnce(&mut A, &mut B) -> R,
    {
        let mut document = self.document.lock().await;
        let mut a = first.read(&document);
        let mut b = second.read(&document);
        let result = apply(&mut a, &mut b);
        let encoded_a = serde_json::to_value(&a).map_err(AppError::internal)?;
        let encoded_b = serde_json::to_value(&b).map_err(AppError::internal)?;
        document.insert(first.name.to_string(), encoded_a);
        document.insert(second.name.to_string(), encoded_b);
        self.commit(&[first.name, second.name], &document).await?;
        Ok(result)
    }

    async fn commit(&self, keys: &[&str], document: &Document) -> Result<(), AppError> {
        if let Some(path) = &self.path {
            persist_document(path, document).await?;
        }
        for key in keys {
            debug!(key, "record written");
            // No subscribers is fine.
            let _ = self.changes.send(StoreChange {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

pub async fn load_document(path: &Path) -> Document {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Document::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Document::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Document::default()
        }
    }
}

pub async fn persist_document(path: &Path, document: &Document) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(document).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

fn decode_json<T: DeserializeOwned>(raw: &Value) -> Option<T> {
    T::deserialize(raw).ok()
}

/// Keeps the entries that decode; a bad entry never takes its neighbours with it.
fn decode_list<T: DeserializeOwned>(raw: &Value) -> Option<Vec<T>> {
    let Value::Array(entries) = raw else {
        return None;
    };
    let decoded = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(index, "skipping malformed entry: {err}");
                None
            }
        })
        .collect();
    Some(decoded)
}

/// Re-keys day maps to zero-padded dates, merging entries that collide.
fn decode_day_map<T: DeserializeOwned>(raw: &Value) -> Option<BTreeMap<String, Vec<T>>> {
    let Value::Object(days) = raw else {
        return None;
    };
    let mut normalized: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for (key, entries) in days {
        let Some(entries) = decode_list(entries) else {
            warn!(day = %key, "skipping malformed day");
            continue;
        };
        let key = parse_day_key(key).map(date_key).unwrap_or_else(|| key.clone());
        normalized.entry(key).or_default().extend(entries);
    }
    Some(normalized)
}

fn decode_routine(raw: &Value) -> Option<Vec<WorkoutTask>> {
    let tasks: Vec<WorkoutTask> = decode_list(raw)?;
    if tasks.is_empty() {
        return Some(default_routine());
    }
    Some(tasks)
}

fn decode_weights(raw: &Value) -> Option<Vec<WeightLog>> {
    let logs: Vec<WeightLog> = decode_list(raw)?;
    let mut by_day: BTreeMap<String, f64> = BTreeMap::new();
    for log in logs {
        let date = parse_day_key(&log.date).map(date_key).unwrap_or(log.date);
        by_day.insert(date, log.weight);
    }
    Some(
        by_day
            .into_iter()
            .map(|(date, weight)| WeightLog { date, weight })
            .collect(),
    )
}

fn decode_flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MedFrequency, TimeOfDay};
    use serde_json::json;

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("ritual_diary_{tag}_{}_{}.json", std::process::id(), nanos));
        path
    }

    #[test]
    fn absent_and_malformed_records_read_as_default() {
        let mut document = Document::new();
        document.insert("meds".into(), json!("not a list"));
        document.insert("steps".into(), json!("5000"));
        document.insert("surgery_mode".into(), json!("true"));

        let snapshot = Snapshot::from_document(&document);
        assert!(snapshot.meds.is_empty());
        assert_eq!(snapshot.steps, 5000);
        assert!(snapshot.surgery_mode);
        assert_eq!(snapshot.goals, Goals::default());
        assert_eq!(snapshot.workouts, default_routine());
        assert_eq!(snapshot.pantry.len(), 7);
    }

    #[test]
    fn day_maps_are_normalized_and_weights_sorted() {
        let mut document = Document::new();
        document.insert(
            "history".into(),
            json!({
                "2026-3-5": [{ "name": "Toast", "calories": 120, "protein": 4 }],
                "2026-03-05": [{ "name": "Soup", "calories": 200, "protein": 8, "mealType": "Lunch" }]
            }),
        );
        document.insert(
            "weight_history".into(),
            json!([
                { "date": "2026-03-07", "weight": 70.1 },
                { "date": "2026-3-1", "weight": 71.0 }
            ]),
        );

        let snapshot = Snapshot::from_document(&document);
        assert_eq!(snapshot.foods_on("2026-03-05").len(), 2);
        let dates: Vec<_> = snapshot.weights.iter().map(|w| w.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-03-01", "2026-03-07"]);
    }

    #[test]
    fn legacy_spellings_and_empty_timestamps_decode() {
        let mut document = Document::new();
        document.insert(
            "meds".into(),
            json!([{
                "id": "4", "name": "Androcur", "dose": "25mg", "type": "HRT",
                "frequency": "Every Other Day", "timeOfDay": "Night",
                "surgerySafe": true, "lastTakenDate": ""
            }]),
        );

        let snapshot = Snapshot::from_document(&document);
        let med = &snapshot.meds[0];
        assert_eq!(med.frequency, MedFrequency::EveryOtherDay);
        assert_eq!(med.time_of_day, TimeOfDay::Night);
        assert_eq!(med.last_taken_date, None);
    }

    #[tokio::test]
    async fn one_bad_entry_does_not_erase_its_list() {
        let mut document = Document::new();
        document.insert(
            "meds".into(),
            json!([
                { "id": "1", "name": "Estradiol", "dose": "2mg", "type": "HRT",
                  "frequency": "Daily", "timeOfDay": "Morning", "surgerySafe": false },
                { "id": "2", "dose": "1 tab", "type": "Supplement",
                  "frequency": "Daily", "timeOfDay": "Night", "surgerySafe": true },
                { "id": "3", "name": "Vitamin D", "dose": "1 tab", "type": "Supplement",
                  "frequency": "Daily", "timeOfDay": "Morning", "surgerySafe": true }
            ]),
        );
        document.insert(
            "history".into(),
            json!({ "2026-03-05": [{ "name": "Soup", "calories": 200, "protein": 8 }, { "calories": "lots" }] }),
        );
        let store = Store::in_memory(document);

        let names: Vec<String> = store
            .get(&keys::MEDS)
            .await
            .into_iter()
            .map(|med| med.name)
            .collect();
        assert_eq!(names, vec!["Estradiol", "Vitamin D"]);

        store
            .update(&keys::MEDS, |meds| {
                let mut extra = meds[1].clone();
                extra.id = "4".to_string();
                meds.push(extra);
            })
            .await
            .expect("append med");
        let exported = store.export().await;
        assert_eq!(exported["meds"].as_array().map(Vec::len), Some(3));
        assert_eq!(store.snapshot().await.foods_on("2026-03-05").len(), 1);
    }

    #[tokio::test]
    async fn document_round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let store = Store::open(path.clone()).await;
        store
            .update(&keys::STEPS, |steps| *steps = 4200)
            .await
            .expect("write steps");
        store
            .set(&keys::GOALS, &Goals { calories: 1500.0, protein: 90.0 })
            .await
            .expect("write goals");
        let before = store.export().await;

        let reopened = Store::open(path.clone()).await;
        assert_eq!(reopened.export().await, before);
        assert_eq!(reopened.get(&keys::STEPS).await, 4200);
        assert_eq!(reopened.get(&keys::GOALS).await.calories, 1500.0);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn writes_are_broadcast() {
        let store = Store::in_memory(Document::new());
        let mut changes = store.subscribe();
        store
            .set(&keys::SURGERY_MODE, &true)
            .await
            .expect("write flag");
        let change = changes.recv().await.expect("change event");
        assert_eq!(change.key, "surgery_mode");
    }

    #[tokio::test]
    async fn paired_update_writes_both_records_at_once() {
        let path = temp_path("pair");
        let store = Store::open(path.clone()).await;
        let mut changes = store.subscribe();
        store
            .update_pair(&keys::STEPS, &keys::SURGERY_NOTE, |steps, note| {
                *steps = 900;
                note.push_str("pre-op");
            })
            .await
            .expect("write pair");

        let first = changes.recv().await.expect("first change");
        let second = changes.recv().await.expect("second change");
        assert_eq!((first.key.as_str(), second.key.as_str()), ("steps", "surgery_note"));

        let reopened = Store::open(path.clone()).await;
        assert_eq!(reopened.get(&keys::STEPS).await, 900);
        assert_eq!(reopened.get(&keys::SURGERY_NOTE).await, "pre-op");

        let _ = std::fs::remove_file(path);
    }
}
