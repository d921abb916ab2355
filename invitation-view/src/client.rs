use std::future::Future;

use log::{debug, error, info};
use reqwest::{Client, Response};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use wedding_shared::models::{ErrorResponse, NewWish, SubmitWishResponse, Wish, WishList};

use crate::view::{Action, Effect};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("proxy answered {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Browser-side client for the wish proxy
#[derive(Clone, Debug)]
pub struct WishClient {
    http: Client,
    base_url: String,
}

impl WishClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// GET /api/get-wishes
    pub async fn list_wishes(&self, cancel: &CancellationToken) -> Result<Vec<Wish>, ClientError> {
        let url = format!("{}/api/get-wishes", self.base_url);
        let response = cancellable(cancel, self.http.get(&url).send()).await?;
        let response = check_status(response, cancel).await?;
        let list: WishList = cancellable(cancel, response.json()).await?;
        Ok(list.wishes)
    }

    /// POST /api/submit-wish
    pub async fn submit_wish(
        &self,
        wish: &NewWish,
        cancel: &CancellationToken,
    ) -> Result<SubmitWishResponse, ClientError> {
        let url = format!("{}/api/submit-wish", self.base_url);
        let response = cancellable(cancel, self.http.post(&url).json(wish).send()).await?;
        let response = check_status(response, cancel).await?;
        Ok(cancellable(cancel, response.json()).await?)
    }

    /// Carries out a view effect that needs the network or a timer and
    /// returns the action to feed back into the view. Presentation effects
    /// yield `None`, as does anything cancelled by `cancel`.
    pub async fn perform(&self, effect: Effect, cancel: &CancellationToken) -> Option<Action> {
        match effect {
            Effect::FetchWishes => match self.list_wishes(cancel).await {
                Ok(wishes) => Some(Action::WishesLoaded(wishes)),
                Err(ClientError::Cancelled) => None,
                Err(e) => Some(Action::WishesFailed(e.to_string())),
            },
            Effect::SubmitWish(wish) => match self.submit_wish(&wish, cancel).await {
                Ok(_) => Some(Action::SubmitSucceeded(wish)),
                Err(ClientError::Cancelled) => None,
                Err(e) => Some(Action::SubmitFailed(e.to_string())),
            },
            Effect::Schedule { delay, action } => {
                tokio::select! {
                    _ = cancel.cancelled() => None,
                    _ = tokio::time::sleep(delay) => Some(*action),
                }
            }
            Effect::PlayAudio
            | Effect::PauseAudio
            | Effect::ScrollTo(_)
            | Effect::Alert(_) => None,
        }
    }
}

async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    tokio::select! {
        _ = cancel.cancelled() => {
            debug!("Wish request cancelled");
            Err(ClientError::Cancelled)
        }
        result = request => Ok(result?),
    }
}

async fn check_status(
    response: Response,
    cancel: &CancellationToken,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        info!("Wish proxy answered {}", status);
        return Ok(response);
    }

    let body = match cancellable(cancel, response.text()).await {
        Ok(body) => body,
        Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
        Err(_) => String::new(),
    };
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    error!("Wish proxy returned error status {}: {}", status, message);
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;
    use wedding_shared::models::WishStatus;

    fn new_wish() -> NewWish {
        NewWish {
            name: "Sari".into(),
            message: "Semoga sakinah".into(),
            status: WishStatus::Going,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn lists_wishes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/get-wishes")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "wishes": [{
                        "id": "42",
                        "name": "Sari",
                        "message": "Semoga sakinah",
                        "status": "Maybe",
                        "timestamp": "2026-03-02T01:00:00Z"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = WishClient::new(format!("{}/", server.url()));
        let wishes = client.list_wishes(&CancellationToken::new()).await.unwrap();
        assert_eq!(wishes.len(), 1);
        assert_eq!(wishes[0].status, WishStatus::Maybe);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn submits_wish_and_feeds_back_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/submit-wish")
            .match_body(Matcher::PartialJson(json!({ "name": "Sari", "status": "Going" })))
            .with_status(200)
            .with_body(r#"{"success":true,"message":"Wish saved successfully"}"#)
            .create_async()
            .await;

        let client = WishClient::new(server.url());
        let action = client
            .perform(Effect::SubmitWish(new_wish()), &CancellationToken::new())
            .await;
        assert_eq!(action, Some(Action::SubmitSucceeded(new_wish())));
    }

    #[tokio::test]
    async fn rejected_submission_surfaces_proxy_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/submit-wish")
            .with_status(400)
            .with_body(r#"{"error":"Name and message are required"}"#)
            .create_async()
            .await;

        let client = WishClient::new(server.url());
        let err = client
            .submit_wish(&new_wish(), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Name and message are required");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let action = client
            .perform(Effect::SubmitWish(new_wish()), &CancellationToken::new())
            .await;
        assert!(matches!(action, Some(Action::SubmitFailed(_))));
    }

    #[tokio::test]
    async fn cancelled_fetch_yields_nothing() {
        let server = mockito::Server::new_async().await;
        let client = WishClient::new(server.url());
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            client.list_wishes(&cancel).await,
            Err(ClientError::Cancelled)
        ));
        assert_eq!(client.perform(Effect::FetchWishes, &cancel).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_actions_fire_after_delay() {
        let client = WishClient::new("http://127.0.0.1:9");
        let action = client
            .perform(
                Effect::Schedule {
                    delay: Duration::from_secs(3),
                    action: Box::new(Action::HighlightExpired("7".into())),
                },
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(action, Some(Action::HighlightExpired("7".into())));

        assert_eq!(client.perform(Effect::PlayAudio, &CancellationToken::new()).await, None);
    }

    #[tokio::test]
    async fn cancel_aborts_error_body_read() {
        use tokio::io::AsyncWriteExt;

        // Sends the status line of a failure, then stalls before the body
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket
                    .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\n\r\n{")
                    .await;
                held.push(socket);
            }
        });

        let client = WishClient::new(format!("http://{}", addr));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), client.list_wishes(&cancel))
            .await
            .expect("cancellation should end the request");
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
