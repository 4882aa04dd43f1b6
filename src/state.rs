use crate::models::Dataset;
use std::sync::Arc;

/// The dataset is an immutable snapshot taken at startup; handlers
/// share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }
}
