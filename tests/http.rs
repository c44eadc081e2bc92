use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Today {
    date: String,
    score: u32,
    steps: u32,
    #[serde(default)]
    latest_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Medication {
    id: String,
    name: String,
    #[serde(default)]
    last_taken_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeightLog {
    date: String,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct Food {
    id: String,
    name: String,
    calories: f64,
}

#[derive(Debug, Deserialize)]
struct WorkoutTask {
    id: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct LogItem {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DayView {
    foods: Vec<Food>,
    workouts: Vec<LogItem>,
}

#[derive(Debug, Deserialize)]
struct Board {
    missed_count: usize,
    upcoming_count: usize,
    missed: Vec<serde_json::Value>,
    upcoming: Vec<serde_json::Value>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("ritual_diary_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_ritual_diary"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .env_remove("GEMINI_API_KEY")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json<T: serde::de::DeserializeOwned>(client: &Client, url: String) -> T {
    let response = client.get(url).send().await.unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_today_reports_a_bounded_score() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today: Today = get_json(&client, format!("{}/api/today", server.base_url)).await;
    assert!(today.score <= 100);
    assert_eq!(today.date.len(), 10);

    let response = client
        .put(format!("{}/api/steps", server.base_url))
        .json(&serde_json::json!({ "steps": 5000 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    for ignored in [serde_json::json!(-20), serde_json::json!("abc"), serde_json::json!(5000.5)] {
        let response = client
            .put(format!("{}/api/steps", server.base_url))
            .json(&serde_json::json!({ "steps": ignored }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let today: Today = get_json(&client, format!("{}/api/today", server.base_url)).await;
    assert_eq!(today.steps, 5000);
}

#[tokio::test]
async fn http_medication_toggle_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let med: Medication = client
        .post(format!("{}/api/meds", server.base_url))
        .json(&serde_json::json!({
            "name": "Vitamin C",
            "dose": "500mg",
            "type": "Supplement",
            "frequency": "Daily",
            "timeOfDay": "Morning"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(med.name, "Vitamin C");
    assert!(med.last_taken_date.is_none());

    let toggle = format!("{}/api/meds/{}/toggle", server.base_url, med.id);
    let taken: Medication = client.post(&toggle).send().await.unwrap().json().await.unwrap();
    assert!(taken.last_taken_date.is_some());

    let untaken: Medication = client.post(&toggle).send().await.unwrap().json().await.unwrap();
    assert!(untaken.last_taken_date.is_none());

    let missing = client
        .post(format!("{}/api/meds/nope/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_notifications_are_split_by_kind() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let board: Board = get_json(&client, format!("{}/api/notifications", server.base_url)).await;
    assert_eq!(board.missed_count, board.missed.len());
    assert_eq!(board.upcoming_count, board.upcoming.len());
}

#[tokio::test]
async fn http_weight_keeps_one_entry_per_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let today: Today = get_json(&client, format!("{}/api/today", server.base_url)).await;

    for weight in [serde_json::json!(70.5), serde_json::json!("69.9"), serde_json::json!("heavy")] {
        let response = client
            .post(format!("{}/api/weight", server.base_url))
            .json(&serde_json::json!({ "weight": weight }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let logs: Vec<WeightLog> = client
        .post(format!("{}/api/weight", server.base_url))
        .json(&serde_json::json!({ "weight": null }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let todays: Vec<&WeightLog> = logs.iter().filter(|log| log.date == today.date).collect();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays[0].weight, 69.9);

    let today: Today = get_json(&client, format!("{}/api/today", server.base_url)).await;
    assert_eq!(today.latest_weight, Some(69.9));
}

#[tokio::test]
async fn http_meal_delete_requires_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let food: Food = client
        .post(format!("{}/api/meals", server.base_url))
        .json(&serde_json::json!({
            "name": "Chicken Adobo",
            "calories": 420,
            "protein": 32,
            "date": "2020-01-06"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!food.id.is_empty());

    let day: DayView = get_json(&client, format!("{}/api/history/2020-01-06", server.base_url)).await;
    assert_eq!(day.foods.len(), 1);
    assert_eq!(day.foods[0].calories, 420.0);

    let unconfirmed = client
        .delete(format!("{}/api/meals/2020-01-06/0", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(unconfirmed.status(), reqwest::StatusCode::BAD_REQUEST);

    let removed: Food = client
        .delete(format!("{}/api/meals/2020-01-06/0?confirm=true", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(removed.name, "Chicken Adobo");

    let gone = client
        .delete(format!("{}/api/meals/2020-01-06/0?confirm=true", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_missed_day_estimate_is_logged() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let estimate: Food = client
        .post(format!("{}/api/meals/2020-02-03/estimate", server.base_url))
        .json(&serde_json::json!({ "calories": "1800" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(estimate.calories, 1800.0);

    let ignored: Option<Food> = client
        .post(format!("{}/api/meals/2020-02-03/estimate", server.base_url))
        .json(&serde_json::json!({ "calories": "lots" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(ignored.is_none());

    let day: DayView = get_json(&client, format!("{}/api/history/2020-02-03", server.base_url)).await;
    assert_eq!(day.foods.len(), 1);
}

#[tokio::test]
async fn http_workout_toggle_logs_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let task: WorkoutTask = client
        .post(format!("{}/api/workouts", server.base_url))
        .json(&serde_json::json!({ "name": "Plank", "reps": "60 secs" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!task.completed);

    let toggle = format!("{}/api/workouts/{}/toggle", server.base_url, task.id);
    for expected in [true, false, true] {
        let toggled: WorkoutTask = client.post(&toggle).send().await.unwrap().json().await.unwrap();
        assert_eq!(toggled.completed, expected);
    }

    let today: Today = get_json(&client, format!("{}/api/today", server.base_url)).await;
    let day: DayView =
        get_json(&client, format!("{}/api/history/{}", server.base_url, today.date)).await;
    assert_eq!(day.workouts.iter().filter(|item| item.name == "Plank").count(), 1);
}

#[tokio::test]
async fn http_pantry_keeps_its_last_food() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let pantry: Vec<Food> = get_json(&client, format!("{}/api/pantry", server.base_url)).await;
    assert!(!pantry.is_empty());

    let (last, rest) = pantry.split_last().unwrap();
    for food in rest {
        let response = client
            .delete(format!("{}/api/pantry/{}", server.base_url, food.id))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let refused = client
        .delete(format!("{}/api/pantry/{}", server.base_url, last.id))
        .send()
        .await
        .unwrap();
    assert_eq!(refused.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_oracle_without_key_is_a_gateway_error() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/oracle/ask", server.base_url))
        .json(&serde_json::json!({ "question": "Is matcha hydrating?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    let message = response.text().await.unwrap();
    assert!(message.contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn http_dashboard_renders() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Ritual Diary"));
    assert!(!html.contains("{{"));
}
