use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewWish, Wish};

pub mod remote;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Wish store endpoint is not configured")]
    NotConfigured,

    #[error("Wish store unreachable: {0}")]
    Unreachable(String),

    #[error("Wish store rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Wish store returned an unreadable reply: {0}")]
    InvalidReply(String),
}

/// The system of record for guest wishes.
///
/// Append-only writes plus a full read. Implementations assign the id of
/// every appended wish and return the list newest first, ordered by their
/// own insertion order.
#[async_trait]
pub trait WishStore: Send + Sync {
    async fn append_wish(&self, wish: &NewWish) -> Result<(), StoreError>;

    async fn list_wishes(&self) -> Result<Vec<Wish>, StoreError>;
}
