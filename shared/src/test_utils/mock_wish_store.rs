use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{NewWish, Wish};
use crate::store::{StoreError, WishStore};

/// In-memory wish store with the remote sheet's semantics: ids derived from
/// the append instant, listing newest first.
#[derive(Default)]
pub struct MockWishStore {
    rows: Mutex<Vec<Wish>>,
    last_id: Mutex<i64>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockWishStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds rows in insertion order (oldest first).
    pub fn with_wishes(wishes: Vec<Wish>) -> Self {
        let store = Self::default();
        *store.rows.lock().unwrap() = wishes;
        store
    }

    /// Makes every following call fail as if the sheet were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls that reached the store.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_id(&self) -> String {
        let mut last = self.last_id.lock().unwrap();
        let id = Utc::now().timestamp_millis().max(*last + 1);
        *last = id;
        id.to_string()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 500,
                detail: "Internal server error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WishStore for MockWishStore {
    async fn append_wish(&self, wish: &NewWish) -> Result<(), StoreError> {
        self.check_available()?;
        let id = self.next_id();
        self.rows.lock().unwrap().push(wish.clone().into_wish(id));
        Ok(())
    }

    async fn list_wishes(&self) -> Result<Vec<Wish>, StoreError> {
        self.check_available()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().cloned().collect())
    }
}
