use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

mod config;
mod event_handler;
use config::Config;
use event_handler::function_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env().inspect_err(|err| tracing::error!("{err:#}"))?;
    let config = Arc::new(config);

    run(service_fn(move |event: LambdaEvent<Value>| {
        let config = Arc::clone(&config);
        async move { function_handler(config, event).await }
    }))
    .await
}
