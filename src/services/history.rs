//! History read surface

use crate::{
    error::AppResult,
    models::history::{HistoryEntry, HistoryFilter},
    repository::Repository,
};

#[derive(Clone)]
pub struct HistoryService {
    repository: Repository,
}

impl HistoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Entries sorted by timestamp descending
    pub async fn list(&self, filter: HistoryFilter) -> AppResult<Vec<HistoryEntry>> {
        self.repository.history.list(&filter).await
    }
}
