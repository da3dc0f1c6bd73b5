//! Error taxonomy for the synchronization engine.
//!
//! Decode errors live in [`crate::decode`] and store errors in
//! [`crate::remote`], next to the components that raise them; this module
//! holds the surface the mutation API exposes to callers.

use crate::remote::StoreError;

/// Errors returned by the mutation operations of [`crate::TaskStore`].
///
/// Transport-level subscription failures never appear here — they degrade the
/// read model (empty task list, not loading) and are logged instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A mutation was attempted with no authenticated identity. Rejected
    /// before any store call is made.
    #[error("authentication required")]
    AuthRequired,

    /// The store rejected a create/update/delete. Propagated verbatim.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One or more deletes in a bulk clear were rejected. Deletes that
    /// succeeded are not rolled back.
    #[error("clear failed for {} of the issued deletes", failures.len())]
    ClearFailed {
        /// Task id and cause for every rejected delete.
        failures: Vec<(String, StoreError)>,
    },
}
