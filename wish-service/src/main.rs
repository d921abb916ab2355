use log::info;

mod config;
mod error;
mod handlers;
mod models;
mod routes;


use config::ServiceConfig;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    // Load a local .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize env_logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Wish Service");

    let config = ServiceConfig::from_env();
    let app = routes::create_router(&config)?;

    if std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        info!("Running as a Lambda function");
        lambda_http::run(app).await?;
    } else {
        let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, app).await?;
    }

    Ok(())
}
