use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KioskError, Result};
use super::task::TaskType;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextOutputItem {
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioOutputItem {
    pub audio_content: String,
}

#[derive(Debug, Deserialize)]
struct TextOutputBlock {
    #[serde(default)]
    output: Vec<TextOutputItem>,
}

#[derive(Debug, Deserialize)]
struct AudioOutputBlock {
    #[serde(default)]
    audio: Vec<AudioOutputItem>,
}

/// Result of a single pipeline stage, shaped by the stage's task type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
    Text(Vec<TextOutputItem>),
    Audio(Vec<AudioOutputItem>),
}

impl TaskOutput {
    /// Decode a raw stage result according to the task that produced it
    pub fn decode(task_type: TaskType, raw: &Value) -> Result<Self> {
        match task_type {
            TaskType::Recognition | TaskType::Translation => Ok(Self::Text(decode_text(task_type, raw)?)),
            TaskType::Synthesis => Ok(Self::Audio(decode_audio(raw)?)),
        }
    }
}

fn decode_text(task_type: TaskType, raw: &Value) -> Result<Vec<TextOutputItem>> {
    let block: TextOutputBlock = serde_json::from_value(raw.clone())
        .map_err(|e| KioskError::MalformedResponse(format!("{} output: {}", task_type, e)))?;
    Ok(block.output)
}

fn decode_audio(raw: &Value) -> Result<Vec<AudioOutputItem>> {
    let block: AudioOutputBlock = serde_json::from_value(raw.clone())
        .map_err(|e| KioskError::MalformedResponse(format!("{} output: {}", TaskType::Synthesis, e)))?;
    Ok(block.audio)
}

/// Decoded inference reply; one entry per requested task, in request order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub pipeline_response: Vec<Value>,
}

impl ResponseEnvelope {
    pub fn len(&self) -> usize {
        self.pipeline_response.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline_response.is_empty()
    }

    /// Decode the stage at `index` as output of `task_type`
    pub fn task_output(&self, index: usize, task_type: TaskType) -> Result<TaskOutput> {
        TaskOutput::decode(task_type, self.stage(index)?)
    }

    /// Source-language text produced by a recognition stage
    pub fn recognized_text(&self, index: usize) -> Result<String> {
        self.text_field(index, TaskType::Recognition, |item| item.source)
    }

    /// Target-language text produced by a translation stage
    pub fn translated_text(&self, index: usize) -> Result<String> {
        self.text_field(index, TaskType::Translation, |item| item.target)
    }

    /// Base64 audio produced by a synthesis stage
    pub fn synthesized_audio(&self, index: usize) -> Result<String> {
        let audio = match self.task_output(index, TaskType::Synthesis)? {
            TaskOutput::Audio(items) => items.into_iter().next().map(|item| item.audio_content),
            TaskOutput::Text(_) => None,
        };
        audio.ok_or_else(|| KioskError::MalformedResponse(format!("no audio at position {}", index)))
    }

    fn stage(&self, index: usize) -> Result<&Value> {
        self.pipeline_response.get(index).ok_or_else(|| {
            KioskError::MalformedResponse(format!(
                "expected a result at position {} but response has {}",
                index,
                self.pipeline_response.len()
            ))
        })
    }

    fn text_field<F>(&self, index: usize, task_type: TaskType, pick: F) -> Result<String>
    where
        F: FnOnce(TextOutputItem) -> Option<String>,
    {
        let text = match self.task_output(index, task_type)? {
            TaskOutput::Text(items) => items.into_iter().next().and_then(pick),
            TaskOutput::Audio(_) => None,
        };
        text.ok_or_else(|| KioskError::MalformedResponse(format!("no {} text at position {}", task_type, index)))
    }
}
