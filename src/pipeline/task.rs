use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KioskError;

/// Kind of work a pipeline stage performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Speech recognition: audio in, source-language text out
    #[serde(rename = "asr")]
    Recognition,
    /// Text translation from source to target language
    #[serde(rename = "translation")]
    Translation,
    /// Speech synthesis: text in, audio out
    #[serde(rename = "tts")]
    Synthesis,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Recognition, TaskType::Translation, TaskType::Synthesis];

    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recognition => "asr",
            Self::Translation => "translation",
            Self::Synthesis => "tts",
        }
    }

    /// Whether this task consumes audio rather than text
    pub fn takes_audio(&self) -> bool {
        matches!(self, Self::Recognition)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asr" | "recognition" => Ok(Self::Recognition),
            "translation" | "nmt" => Ok(Self::Translation),
            "tts" | "synthesis" => Ok(Self::Synthesis),
            _ => Err(KioskError::InvalidTaskType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePair {
    pub source_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub language: LanguagePair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

/// One stage of a pipeline request, as sent to both discovery and inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub task_type: TaskType,
    pub config: TaskConfig,
}

impl TaskDescriptor {
    /// Build the unresolved descriptor for a task type and language pair.
    ///
    /// Only translation carries the target language; synthesis speaks the
    /// source language with the given voice.
    pub fn new(task_type: TaskType, source: &str, target: &str, voice_gender: &str) -> Self {
        let target_language = match task_type {
            TaskType::Translation => Some(target.to_string()),
            _ => None,
        };
        let gender = match task_type {
            TaskType::Synthesis => Some(voice_gender.to_string()),
            _ => None,
        };

        Self {
            task_type,
            config: TaskConfig {
                language: LanguagePair {
                    source_language: source.to_string(),
                    target_language,
                },
                gender,
                service_id: None,
            },
        }
    }

    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.config.service_id = Some(service_id.into());
        self
    }

    pub fn service_id(&self) -> Option<&str> {
        self.config.service_id.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.service_id().is_some_and(|id| !id.is_empty())
    }
}
