use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::{KioskError, Result};
use super::executor::PipelineBundle;
use super::payload::DiscoveryRequest;
use super::task::{TaskDescriptor, TaskType};
use super::transport::HttpTransport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEntry {
    service_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseConfig {
    #[serde(default)]
    config: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InferenceApiKey {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InferenceEndpoint {
    callback_url: String,
    inference_api_key: InferenceApiKey,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryResponse {
    #[serde(default)]
    pipeline_response_config: Vec<ResponseConfig>,
    #[serde(rename = "pipelineInferenceAPIEndPoint")]
    pipeline_inference_api_end_point: Option<InferenceEndpoint>,
}

/// Outcome of a discovery call: the resolved task plus the freshly issued bundle
#[derive(Debug, Clone)]
pub struct Resolution {
    pub descriptor: TaskDescriptor,
    pub bundle: PipelineBundle,
}

/// Asks the control plane which backend service handles a task
pub struct ConfigResolver {
    transport: Arc<dyn HttpTransport>,
    credentials: Credentials,
    endpoint: String,
    voice_gender: String,
}

impl ConfigResolver {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Credentials,
        endpoint: impl Into<String>,
        voice_gender: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            credentials,
            endpoint: endpoint.into(),
            voice_gender: voice_gender.into(),
        }
    }

    pub fn pipeline_id(&self) -> &str {
        &self.credentials.pipeline_id
    }

    /// Resolve a task type for the given language pair
    pub async fn resolve(&self, task_type: TaskType, source: &str, target: &str) -> Result<Resolution> {
        let descriptor = TaskDescriptor::new(task_type, source, target, &self.voice_gender);
        let request = DiscoveryRequest::new(descriptor.clone(), &self.credentials.pipeline_id);

        debug!("Discovering service for {} ({} -> {}) at {}", task_type, source, target, self.endpoint);

        let headers = vec![
            ("ulcaApiKey".to_string(), self.credentials.api_key.clone()),
            ("userID".to_string(), self.credentials.user_id.clone()),
        ];
        let reply = self
            .transport
            .post_json(&self.endpoint, headers, serde_json::to_value(&request)?)
            .await?;

        if !reply.is_success() {
            warn!(
                "Discovery for {} failed with status {} (pipeline {})",
                task_type, reply.status, self.credentials.pipeline_id
            );
            return Err(KioskError::ResolverUnavailable {
                status: reply.status,
                body: reply.body,
            });
        }

        let raw: Value = serde_json::from_str(&reply.body)
            .map_err(|e| KioskError::MalformedResponse(format!("discovery reply is not valid JSON: {}", e)))?;
        let parsed: DiscoveryResponse = serde_json::from_value(raw.clone())
            .map_err(|e| KioskError::MalformedResponse(format!("discovery reply: {}", e)))?;

        let service_id = parsed
            .pipeline_response_config
            .into_iter()
            .next()
            .and_then(|entry| entry.config.into_iter().next())
            .and_then(|entry| entry.service_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| KioskError::MalformedResponse(format!("no service id offered for {}", task_type)))?;

        let endpoint = parsed.pipeline_inference_api_end_point.ok_or_else(|| {
            KioskError::MalformedResponse("discovery reply has no inference endpoint".to_string())
        })?;

        info!("Resolved {} ({} -> {}) to service {}", task_type, source, target, service_id);

        Ok(Resolution {
            descriptor: descriptor.with_service_id(service_id),
            bundle: PipelineBundle {
                inference_endpoint: endpoint.callback_url,
                inference_credential: endpoint.inference_api_key.value,
                raw,
            },
        })
    }
}
