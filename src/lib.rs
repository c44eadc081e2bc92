pub mod app;
pub mod config;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod notify;
pub mod oracle;
pub mod schedule;
pub mod score;
pub mod state;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::Store;
