use crate::notify::NotificationBoard;
use crate::oracle::{GeminiClient, Oracle};
use crate::store::Store;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub oracle: Arc<Oracle<GeminiClient>>,
    pub board: watch::Receiver<NotificationBoard>,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        oracle: Oracle<GeminiClient>,
        board: watch::Receiver<NotificationBoard>,
    ) -> Self {
        Self {
            store,
            oracle: Arc::new(oracle),
            board,
        }
    }
}
