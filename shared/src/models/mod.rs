use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attendance answer attached to every wish
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WishStatus {
    #[default]
    Going,
    Maybe,
    #[serde(rename = "Not Going", alias = "NotGoing")]
    NotGoing,
}

impl WishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishStatus::Going => "Going",
            WishStatus::Maybe => "Maybe",
            WishStatus::NotGoing => "Not Going",
        }
    }
}

impl std::fmt::Display for WishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored guest wish, one row in the remote sheet
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Wish {
    pub id: String,
    pub name: String,
    pub message: String,
    pub status: WishStatus,
    pub timestamp: DateTime<Utc>,
}

/// A validated submission, forwarded to the store as-is
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewWish {
    pub name: String,
    pub message: String,
    pub status: WishStatus,
    pub timestamp: DateTime<Utc>,
}

impl NewWish {
    /// Materializes the wish the store keeps for this submission.
    pub fn into_wish(self, id: String) -> Wish {
        Wish {
            id,
            name: self.name,
            message: self.message,
            status: self.status,
            timestamp: self.timestamp,
        }
    }
}

/// Wish ids are the submission instant in epoch milliseconds.
pub fn wish_id_at(at: DateTime<Utc>) -> String {
    at.timestamp_millis().to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WishList {
    pub wishes: Vec<Wish>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubmitWishResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
}
