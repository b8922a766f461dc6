//! Application state for the HTTP server.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::db::repository::FullRepository;
use crate::services::Selection;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store shared by every request; each edit builds its own registry over it
    pub repository: Arc<dyn FullRepository>,
    /// One write lock per (day, group); edits of a shift run one at a time
    shift_locks: Arc<Mutex<HashMap<Selection, Arc<tokio::sync::Mutex<()>>>>>,
}

impl AppState {
    /// Create a new application state with the given repository.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            shift_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Lock serializing the load-check-write cycle of one shift.
    ///
    /// The conflict check reads the stored assignments, so two edits of the
    /// same shift must not interleave between that read and the upsert.
    pub fn shift_lock(&self, selection: Selection) -> Arc<tokio::sync::Mutex<()>> {
        self.shift_locks
            .lock()
            .entry(selection)
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::models::{ShiftGroup, Weekday};

    #[test]
    fn test_shift_lock_is_shared_per_selection() {
        let state = AppState::new(Arc::new(LocalRepository::new()));
        let monday_a = Selection {
            day: Weekday::Monday,
            group: ShiftGroup::A,
        };
        let monday_b = Selection {
            day: Weekday::Monday,
            group: ShiftGroup::B,
        };

        assert!(Arc::ptr_eq(
            &state.shift_lock(monday_a),
            &state.shift_lock(monday_a)
        ));
        assert!(!Arc::ptr_eq(
            &state.shift_lock(monday_a),
            &state.shift_lock(monday_b)
        ));
    }
}
