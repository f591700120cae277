use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{KioskError, Result};
use super::payload::RequestPayload;
use super::response::ResponseEnvelope;
use super::transport::HttpTransport;

/// Inference endpoint and credential issued by the most recent discovery call
#[derive(Clone, PartialEq)]
pub struct PipelineBundle {
    pub inference_endpoint: String,
    pub inference_credential: String,
    /// Full discovery response the bundle was taken from
    pub raw: Value,
}

impl PipelineBundle {
    fn is_usable(&self) -> bool {
        !self.inference_endpoint.trim().is_empty() && !self.inference_credential.trim().is_empty()
    }
}

impl std::fmt::Debug for PipelineBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBundle")
            .field("inference_endpoint", &self.inference_endpoint)
            .field("inference_credential", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Issues inference calls against the endpoint held in a bundle
pub struct InferenceExecutor {
    transport: Arc<dyn HttpTransport>,
}

impl InferenceExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Run one inference call and return the decoded envelope untouched
    pub async fn execute(&self, payload: &RequestPayload, bundle: Option<&PipelineBundle>) -> Result<ResponseEnvelope> {
        let bundle = bundle
            .filter(|b| b.is_usable())
            .ok_or(KioskError::BundleNotInitialized)?;

        debug!("Running inference for tasks {:?}", payload.task_types());

        let headers = vec![("Authorization".to_string(), bundle.inference_credential.clone())];
        let body = serde_json::to_value(payload)?;
        let reply = self.transport.post_json(&bundle.inference_endpoint, headers, body).await?;

        if !reply.is_success() {
            warn!("Inference call returned status {}", reply.status);
            return Err(KioskError::InferenceFailed {
                status: reply.status,
                body: reply.body,
            });
        }

        let envelope: ResponseEnvelope = serde_json::from_str(&reply.body)
            .map_err(|e| KioskError::MalformedResponse(format!("inference reply is not valid JSON: {}", e)))?;

        info!("Inference completed with {} task results", envelope.len());
        Ok(envelope)
    }
}
