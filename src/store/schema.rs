use serde::{Deserialize, Serialize};

use crate::progress::ProgressState;

const SCHEMA_VERSION: u32 = 1;

/// On-disk wrapper for the one record the game persists: the learner's
/// ProgressState.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    pub progress: ProgressState,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            progress: ProgressState::default(),
        }
    }
}

impl ProgressData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
