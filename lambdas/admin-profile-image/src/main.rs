use lambda_http::{run, service_fn, Error, Request};
use profile_shared::{config::Config, AppState};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_http::tracing::init_default_subscriber();

    // Initialize config and AWS clients once at startup
    let config = Config::from_env();
    let sdk_config = aws_config::load_from_env().await;

    tracing::info!(
        "Starting admin profile image lambda - table: {} bucket: {}",
        config.table_name,
        config.bucket_name
    );

    let state = AppState::from_aws(config, &sdk_config);

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
