//! Remote placement sync: the network boundary a committed move goes through.
//!
//! One call per committed move. No batching, no dedupe, no retry; any error
//! means "not persisted" and the controller rolls the board back.

mod error;
mod http;

pub use error::SyncError;
pub use http::HttpSync;

use crate::engine::Placement;
use async_trait::async_trait;

/// Persists the placement of a single moved assignment.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    async fn persist(&self, placement: &Placement) -> Result<(), SyncError>;
}

#[async_trait]
impl<T: RemoteSync + ?Sized> RemoteSync for std::sync::Arc<T> {
    async fn persist(&self, placement: &Placement) -> Result<(), SyncError> {
        (**self).persist(placement).await
    }
}
