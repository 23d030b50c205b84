//! Shared application state.

use std::sync::Arc;

use crate::delivery::ArtifactStore;
use crate::store::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AccountStore>,
    pub artifacts: Arc<ArtifactStore>,
    /// Bound on a single transform's execution, in milliseconds.
    pub timeout_ms: u64,
}
