use lambda_runtime::{tracing, Context, Error, LambdaEvent};
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;

/// Renders the two lines logged for an invocation: the payload as compact
/// JSON, then the context's debug form.
pub(crate) fn log_lines<E: Serialize>(
    payload: &E,
    context: &Context,
) -> Result<(String, String), serde_json::Error> {
    let payload = serde_json::to_string(payload)?;
    Ok((payload, format!("{context:?}")))
}

/// Logs the invocation and answers with the configured greeting. The response
/// never depends on the event or context.
pub(crate) async fn function_handler<E: Serialize>(
    config: Arc<Config>,
    event: LambdaEvent<E>,
) -> Result<String, Error> {
    let (payload, context) = event.into_parts();
    let (payload, context) = log_lines(&payload, &context)?;

    tracing::info!("{payload}");
    tracing::info!("{context}");

    Ok(config.response())
}
