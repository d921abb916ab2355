use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use log::info;
use std::sync::Arc;
use wedding_shared::models::{MessageResponse, SubmitWishResponse, WishList};
use wedding_shared::store::WishStore;

use crate::error::{AppError, Result};
use crate::models::SubmitWishRequest;

// GET /api/get-wishes
pub async fn get_wishes<S>(State(store): State<Arc<S>>) -> Result<Json<WishList>>
where
    S: WishStore,
{
    let wishes = store
        .list_wishes()
        .await
        .map_err(|e| AppError::from_store(e, "Failed to fetch wishes"))?;

    info!("Returning {} wishes", wishes.len());
    Ok(Json(WishList { wishes }))
}

// POST /api/submit-wish
// The body is parsed by hand so that an unreadable payload becomes a JSON 400
// regardless of the Content-Type header.
pub async fn submit_wish<S>(
    State(store): State<Arc<S>>,
    body: Bytes,
) -> Result<Json<SubmitWishResponse>>
where
    S: WishStore,
{
    let request: SubmitWishRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::MalformedRequest(e.to_string()))?;

    let wish = request.validate(Utc::now())?;

    store
        .append_wish(&wish)
        .await
        .map_err(|e| AppError::from_store(e, "Failed to save wish"))?;

    info!("Saved wish from {} ({})", wish.name, wish.status);
    Ok(Json(SubmitWishResponse {
        success: true,
        message: "Wish saved successfully".to_string(),
    }))
}

// OPTIONS on either endpoint
pub async fn preflight() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "OK".to_string(),
    })
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
