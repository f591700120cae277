use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, Credentials};
use crate::enquiry::{EnquiryKind, CLOSING_PROMPT};
use crate::error::{KioskError, Result};
use crate::pipeline::TaskType;
use crate::translator::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Staff,
    Customer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub at: DateTime<Utc>,
    pub speaker: Speaker,
    pub original: String,
    pub translated: String,
}

/// Running record of one counter conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub staff_language: String,
    pub customer_language: String,
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(staff_language: &str, customer_language: &str) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            staff_language: staff_language.to_string(),
            customer_language: customer_language.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, speaker: Speaker, original: &str, translated: &str) {
        self.entries.push(TranscriptEntry {
            at: Utc::now(),
            speaker,
            original: original.to_string(),
            translated: translated.to_string(),
        });
    }

    /// Write the transcript as `<session id>.json` under `dir`
    pub async fn save<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let path = dir.join(format!("{}.json", self.session_id));
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).await?;

        info!("Transcript saved to {}", path.display());
        Ok(path)
    }
}

/// Customer reply after recognition, translation and re-synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Recognized text in the customer's language
    pub recognized: String,
    /// Translation for the staff
    pub translated: String,
    /// Base64 audio of the translation, spoken in the staff's language
    pub audio: String,
}

/// Counter conversation between staff and a customer.
///
/// Holds one translator per direction. Every call resolves the tasks it
/// needs right before using them.
pub struct Counter {
    enquiry: EnquiryKind,
    staff: Translator,
    customer: Translator,
    transcript: Transcript,
}

impl Counter {
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let staff = Translator::new(
            credentials,
            config.service.clone(),
            &config.counter.staff_language,
            &config.counter.customer_language,
        )?;
        Ok(Self::with_translator(staff, config.counter.enquiry))
    }

    /// Build around a staff -> customer translator; the reverse direction is derived from it
    pub fn with_translator(staff: Translator, enquiry: EnquiryKind) -> Self {
        let customer = staff.reversed();
        let transcript = Transcript::new(staff.source_language(), staff.target_language());
        Self {
            enquiry,
            staff,
            customer,
            transcript,
        }
    }

    pub fn enquiry(&self) -> EnquiryKind {
        self.enquiry
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Heading of the question list in the customer's language
    pub async fn translate_heading(&mut self) -> Result<String> {
        self.staff.resolve(TaskType::Translation).await?;
        self.staff.translate(self.enquiry.heading()).await
    }

    /// Closing invitation for further questions, in the customer's language
    pub async fn closing_prompt(&mut self) -> Result<String> {
        self.staff.resolve(TaskType::Translation).await?;
        self.staff.translate(CLOSING_PROMPT).await
    }

    /// Translate question `number` (1-based) for the customer
    pub async fn ask_question(&mut self, number: usize) -> Result<String> {
        let question = self.enquiry.question(number).ok_or_else(|| {
            KioskError::Config(format!(
                "Question {} does not exist; {} has {} questions",
                number,
                self.enquiry.heading(),
                self.enquiry.questions().len()
            ))
        })?;

        self.staff.resolve(TaskType::Translation).await?;
        let translated = self.staff.translate(question).await?;
        self.transcript.record(Speaker::Staff, question, &translated);
        Ok(translated)
    }

    /// Speak customer-language text aloud; returns base64 audio
    pub async fn speak_to_customer(&mut self, text: &str) -> Result<String> {
        self.customer.resolve(TaskType::Synthesis).await?;
        self.customer.synthesize(text).await
    }

    /// Recognize a recorded customer answer and render it for the staff
    pub async fn process_answer(&mut self, audio_base64: &str) -> Result<AnswerOutcome> {
        self.customer.resolve(TaskType::Recognition).await?;
        let recognized = self.customer.recognize(audio_base64).await?;

        self.customer.resolve(TaskType::Translation).await?;
        let translated = self.customer.translate(&recognized).await?;

        self.staff.resolve(TaskType::Synthesis).await?;
        let audio = self.staff.synthesize(&translated).await?;

        self.transcript.record(Speaker::Customer, &recognized, &translated);
        info!("Processed customer answer ({} chars recognized)", recognized.chars().count());

        Ok(AnswerOutcome {
            recognized,
            translated,
            audio,
        })
    }
}
