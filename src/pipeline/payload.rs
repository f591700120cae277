use serde::{Deserialize, Serialize};

use crate::error::{KioskError, Result};
use super::task::{TaskDescriptor, TaskType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequestConfig {
    pub pipeline_id: String,
}

/// Body of a control-plane discovery call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    pub pipeline_tasks: Vec<TaskDescriptor>,
    pub pipeline_request_config: PipelineRequestConfig,
}

impl DiscoveryRequest {
    pub fn new(task: TaskDescriptor, pipeline_id: &str) -> Self {
        Self {
            pipeline_tasks: vec![task],
            pipeline_request_config: PipelineRequestConfig {
                pipeline_id: pipeline_id.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioItem {
    pub audio_content: String,
}

/// `inputData` block of an inference request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputData {
    Text { input: Vec<TextItem> },
    Audio { audio: Vec<AudioItem> },
}

/// Literal input handed to a pipeline by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineInput {
    Text(String),
    /// Base64 encoded audio
    Audio(String),
}

impl PipelineInput {
    fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }

    fn into_input_data(self) -> InputData {
        match self {
            Self::Text(source) => InputData::Text { input: vec![TextItem { source }] },
            Self::Audio(audio_content) => InputData::Audio { audio: vec![AudioItem { audio_content }] },
        }
    }
}

/// Body of an inference call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub pipeline_tasks: Vec<TaskDescriptor>,
    pub pipeline_request_config: PipelineRequestConfig,
    pub input_data: InputData,
}

impl RequestPayload {
    pub fn task_types(&self) -> Vec<TaskType> {
        self.pipeline_tasks.iter().map(|t| t.task_type).collect()
    }
}

/// Assembles inference request bodies. Pure; performs no I/O.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    pipeline_id: String,
}

impl PayloadBuilder {
    pub fn new(pipeline_id: impl Into<String>) -> Self {
        Self { pipeline_id: pipeline_id.into() }
    }

    /// Wrap resolved descriptors and input into an inference request.
    ///
    /// Descriptor order is kept as given; the server runs tasks in that order
    /// and answers with one result per task at the same position.
    pub fn build(&self, tasks: Vec<TaskDescriptor>, input: PipelineInput) -> Result<RequestPayload> {
        let first = tasks
            .first()
            .ok_or_else(|| KioskError::InvalidInput("pipeline has no tasks".to_string()))?;

        if let Some(unresolved) = tasks.iter().find(|t| !t.is_resolved()) {
            return Err(KioskError::PipelineNotConfigured(unresolved.task_type));
        }

        if first.task_type.takes_audio() != input.is_audio() {
            let expected = if first.task_type.takes_audio() { "audio" } else { "text" };
            return Err(KioskError::InvalidInput(format!(
                "pipeline starting with '{}' expects {} input",
                first.task_type, expected
            )));
        }

        Ok(RequestPayload {
            pipeline_tasks: tasks,
            pipeline_request_config: PipelineRequestConfig {
                pipeline_id: self.pipeline_id.clone(),
            },
            input_data: input.into_input_data(),
        })
    }
}
