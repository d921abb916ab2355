use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServiceConfig;
use crate::handlers::wish_handlers::{get_wishes, method_not_allowed, preflight, submit_wish};
use wedding_shared::store::{remote::RemoteWishStore, StoreError, WishStore};

/// Creates a router backed by the remote spreadsheet store
pub fn create_router(config: &ServiceConfig) -> Result<Router, StoreError> {
    match &config.script_url {
        Some(_) => info!("Creating router with remote wish store"),
        None => warn!("GOOGLE_SCRIPT_URL is not set; every wish request will fail"),
    }

    let store = Arc::new(RemoteWishStore::new(
        config.script_url.clone(),
        config.upstream_timeout,
    )?);

    Ok(create_router_with_store(
        store,
        &config.prefix,
        config.allowed_origins.clone(),
    ))
}

/// Creates a router with a given store implementation
pub fn create_router_with_store<S>(
    store: Arc<S>,
    prefix: &str,
    allowed_origins: Vec<String>,
) -> Router
where
    S: WishStore + 'static,
{
    info!("Setting up API routes with prefix: '{}'", prefix);

    // Permissive CORS, as the page may be served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Logging middleware to trace all requests
    async fn logging_middleware(
        State(allowed_origins): State<Arc<Vec<String>>>,
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        if let Some(origin) = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
        {
            if !allowed_origins.iter().any(|allowed| allowed == origin) {
                warn!("Request from unlisted origin: {}", origin);
            }
        }
        next.run(req).await
    }

    let api_routes = Router::new()
        .route(
            "/api/get-wishes",
            get(get_wishes::<S>)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/submit-wish",
            post(submit_wish::<S>)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(store);

    let router = if prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(prefix, api_routes)
    };

    let allowed_origins = Arc::new(allowed_origins);
    router
        .fallback(|req: Request| async move {
            warn!("No route matched for: {} {}", req.method(), req.uri());
            (
                axum::http::StatusCode::NOT_FOUND,
                "The requested resource was not found".to_string(),
            )
        })
        .layer(cors)
        .layer(middleware::from_fn_with_state(
            allowed_origins,
            logging_middleware,
        ))
}
