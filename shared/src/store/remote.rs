use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use reqwest::Client;
use serde::Deserialize;

use super::{StoreError, WishStore};
use crate::models::{NewWish, Wish, WishStatus};

/// Spreadsheet-backed web app holding one row per wish.
///
/// `GET` lists every row newest first, `POST` appends one row. The web app
/// answers HTTP 200 even when it fails, so the body is inspected too.
#[derive(Clone, Debug)]
pub struct RemoteWishStore {
    client: Client,
    endpoint: Option<String>,
}

/// Reply to an append
#[derive(Debug, Deserialize)]
struct AppendReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListReply {
    #[serde(default)]
    wishes: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    error: Option<String>,
}

/// Sheet rows come back either as mapped objects or as raw cell arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SheetRow {
    Record {
        id: Cell,
        name: Cell,
        message: Cell,
        status: WishStatus,
        timestamp: DateTime<Utc>,
    },
    Cells(Cell, Cell, Cell, WishStatus, DateTime<Utc>),
}

/// A text cell. Sheets turns numeric-looking input into numbers, so both
/// are accepted and rendered back as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Cell {
    fn into_string(self) -> String {
        match self {
            Cell::Text(text) => text,
            Cell::Number(number) => number.to_string(),
            Cell::Bool(flag) => flag.to_string(),
        }
    }
}

impl From<SheetRow> for Wish {
    fn from(row: SheetRow) -> Self {
        let (id, name, message, status, timestamp) = match row {
            SheetRow::Record {
                id,
                name,
                message,
                status,
                timestamp,
            } => (id, name, message, status, timestamp),
            SheetRow::Cells(id, name, message, status, timestamp) => {
                (id, name, message, status, timestamp)
            }
        };
        Wish {
            id: id.into_string(),
            name: name.into_string(),
            message: message.into_string(),
            status,
            timestamp,
        }
    }
}

/// Decodes rows one at a time; a row that does not fit is logged and left out.
fn decode_rows(rows: Vec<serde_json::Value>) -> Vec<Wish> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<SheetRow>(row) {
            Ok(row) => Some(Wish::from(row)),
            Err(e) => {
                warn!("Skipping unreadable wish row {}: {}", index, e);
                None
            }
        })
        .collect()
}

impl RemoteWishStore {
    /// Builds a store with its own HTTP client. `timeout` bounds every
    /// upstream call; `None` waits indefinitely.
    pub fn new(endpoint: Option<String>, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: Option<String>) -> Self {
        let endpoint = endpoint.filter(|url| !url.trim().is_empty());
        Self { client, endpoint }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn endpoint(&self) -> Result<&str, StoreError> {
        self.endpoint.as_deref().ok_or_else(|| {
            error!("Missing wish store URL");
            StoreError::NotConfigured
        })
    }
}

#[async_trait]
impl WishStore for RemoteWishStore {
    async fn append_wish(&self, wish: &NewWish) -> Result<(), StoreError> {
        let endpoint = self.endpoint()?;

        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(wish)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach wish store: {}", e);
                StoreError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Wish store returned error status {}: {}", status, detail);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let reply: AppendReply = response.json().await.map_err(|e| {
            error!("Failed to parse wish store reply: {}", e);
            StoreError::InvalidReply(e.to_string())
        })?;

        if let Some(detail) = reply.error {
            error!("Wish store refused the wish: {}", detail);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }
        if !reply.success {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                detail: "reply did not report success".to_string(),
            });
        }

        info!("Appended wish from {} to the wish store", wish.name);
        Ok(())
    }

    async fn list_wishes(&self) -> Result<Vec<Wish>, StoreError> {
        let endpoint = self.endpoint()?;

        let response = self.client.get(endpoint).send().await.map_err(|e| {
            error!("Failed to reach wish store: {}", e);
            StoreError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Wish store returned error status {}: {}", status, detail);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let reply: ListReply = response.json().await.map_err(|e| {
            error!("Failed to parse wish store reply: {}", e);
            StoreError::InvalidReply(e.to_string())
        })?;

        if let Some(detail) = reply.error {
            error!("Wish store failed to list wishes: {}", detail);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let rows = reply
            .wishes
            .ok_or_else(|| StoreError::InvalidReply("missing `wishes` field".to_string()))?;

        let total = rows.len();
        let wishes = decode_rows(rows);
        info!("Fetched {} of {} wish rows from the wish store", wishes.len(), total);
        Ok(wishes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;
    use serde_json::json;

    fn sample_wish() -> NewWish {
        NewWish {
            name: "Laura Andini".to_string(),
            message: "Happy Wedding!".to_string(),
            status: WishStatus::Going,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
        }
    }

    fn store_for(server: &mockito::ServerGuard) -> RemoteWishStore {
        RemoteWishStore::new(Some(format!("{}/exec", server.url())), None).unwrap()
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_without_network() {
        let store = RemoteWishStore::new(None, None).unwrap();
        assert!(!store.is_configured());

        assert!(matches!(
            store.append_wish(&sample_wish()).await,
            Err(StoreError::NotConfigured)
        ));
        assert!(matches!(
            store.list_wishes().await,
            Err(StoreError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_blank_endpoint_counts_as_unconfigured() {
        let store = RemoteWishStore::new(Some("  ".to_string()), None).unwrap();
        assert!(!store.is_configured());
    }

    #[tokio::test]
    async fn test_append_forwards_payload_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/exec")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "name": "Laura Andini",
                "message": "Happy Wedding!",
                "status": "Going",
                "timestamp": "2026-03-01T08:30:00Z"
            })))
            .with_status(200)
            .with_body(r#"{"success":true,"message":"Wish saved successfully"}"#)
            .expect(1)
            .create_async()
            .await;

        store_for(&server).append_wish(&sample_wish()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_append_error_body_is_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/exec")
            .with_status(200)
            .with_body(r#"{"error":"Sheet not found"}"#)
            .create_async()
            .await;

        let err = store_for(&server)
            .append_wish(&sample_wish())
            .await
            .unwrap_err();
        match err {
            StoreError::Rejected { status, detail } => {
                assert_eq!(status, 200);
                assert_eq!(detail, "Sheet not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_append_non_success_status_is_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/exec")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = store_for(&server)
            .append_wish(&sample_wish())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_list_accepts_records_and_cell_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exec")
            .with_status(200)
            .with_body(
                json!({
                    "wishes": [
                        {
                            "id": "1774000000000",
                            "name": "Rina",
                            "message": "Barakallah",
                            "status": "Not Going",
                            "timestamp": "2026-03-20T09:46:40.000Z"
                        },
                        [1773000000000u64, "Budi", "Selamat", "Maybe", "2026-03-08T20:00:00.000Z"]
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let wishes = store_for(&server).list_wishes().await.unwrap();
        assert_eq!(wishes.len(), 2);
        assert_eq!(wishes[0].id, "1774000000000");
        assert_eq!(wishes[0].status, WishStatus::NotGoing);
        assert_eq!(wishes[1].id, "1773000000000");
        assert_eq!(wishes[1].name, "Budi");
        assert_eq!(
            wishes[1].timestamp,
            Utc.with_ymd_and_hms(2026, 3, 8, 20, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_error_body_is_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exec")
            .with_status(200)
            .with_body(r#"{"error":"Internal server error"}"#)
            .create_async()
            .await;

        let err = store_for(&server).list_wishes().await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_list_garbage_is_invalid_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exec")
            .with_status(200)
            .with_body("<html>moved</html>")
            .create_async()
            .await;

        let err = store_for(&server).list_wishes().await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidReply(_)));
    }

    #[tokio::test]
    async fn test_unreachable_store() {
        let store = RemoteWishStore::new(Some("http://127.0.0.1:9/exec".to_string()), None).unwrap();
        let err = store.list_wishes().await.unwrap_err();
        assert!(matches!(err, StoreError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_list_renders_numeric_cells_as_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exec")
            .with_status(200)
            .with_body(
                json!({
                    "wishes": [
                        {
                            "id": 1774000000000u64,
                            "name": "Rina",
                            "message": "Barakallah",
                            "status": "Going",
                            "timestamp": "2026-03-20T09:46:40.000Z"
                        },
                        {
                            "id": 1773900000000u64,
                            "name": 123,
                            "message": 100,
                            "status": "Maybe",
                            "timestamp": "2026-03-19T06:00:00.000Z"
                        },
                        [1773800000000u64, "Dewi", 2.5, "Going", "2026-03-18T06:00:00.000Z"]
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let wishes = store_for(&server).list_wishes().await.unwrap();
        assert_eq!(wishes.len(), 3);
        assert_eq!(wishes[1].name, "123");
        assert_eq!(wishes[1].message, "100");
        assert_eq!(wishes[2].message, "2.5");
    }

    #[tokio::test]
    async fn test_list_skips_unreadable_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exec")
            .with_status(200)
            .with_body(
                json!({
                    "wishes": [
                        ["1", "Rina", "Barakallah", "Going", "2026-03-20T09:46:40.000Z"],
                        ["2", "Budi", "Selamat", "Someday", "2026-03-19T06:00:00.000Z"],
                        ["3", "Dewi"],
                        ["4", "Sari", "Sakinah", "Not Going", "2026-03-17T06:00:00.000Z"]
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let wishes = store_for(&server).list_wishes().await.unwrap();
        let ids: Vec<&str> = wishes.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[tokio::test]
    async fn test_list_without_wishes_field_is_invalid_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exec")
            .with_status(200)
            .with_body(r#"{"result":"ok"}"#)
            .create_async()
            .await;

        let err = store_for(&server).list_wishes().await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidReply(_)));
    }

    #[tokio::test]
    async fn test_append_without_success_flag_is_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/exec")
            .with_status(200)
            .with_body(r#"{"message":"queued"}"#)
            .create_async()
            .await;

        let err = store_for(&server)
            .append_wish(&sample_wish())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 200, .. }));

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/exec")
            .with_status(200)
            .with_body(r#"{"success":false}"#)
            .create_async()
            .await;
        assert!(matches!(
            store_for(&server).append_wish(&sample_wish()).await,
            Err(StoreError::Rejected { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_slow_store_times_out_as_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let store = RemoteWishStore::new(
            Some(format!("http://{}/exec", addr)),
            Some(Duration::from_millis(200)),
        )
        .unwrap();
        let err = store.list_wishes().await.unwrap_err();
        assert!(matches!(err, StoreError::Unreachable(_)));
    }
}
