use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{Credentials, ServiceConfig};
use crate::error::{KioskError, Result};
use crate::pipeline::{
    ConfigResolver, HttpTransport, InferenceExecutor, PayloadBuilder, PipelineBundle, PipelineInput,
    ReqwestTransport, ResponseEnvelope, TaskDescriptor, TaskType,
};

const RECOGNIZE: &[TaskType] = &[TaskType::Recognition];
const TRANSLATE: &[TaskType] = &[TaskType::Translation];
const SYNTHESIZE: &[TaskType] = &[TaskType::Synthesis];
const RECOGNIZE_TRANSLATE: &[TaskType] = &[TaskType::Recognition, TaskType::Translation];
const TRANSLATE_SYNTHESIZE: &[TaskType] = &[TaskType::Translation, TaskType::Synthesis];
const SPEECH_TO_SPEECH: &[TaskType] = &[TaskType::Recognition, TaskType::Translation, TaskType::Synthesis];

/// Speech/text translator for one conversation direction.
///
/// Each `resolve` call replaces the stored bundle, so the inference endpoint
/// always belongs to the task resolved last. Resolve every task of a chain,
/// in chain order, right before invoking the chained operation; an operation
/// whose last task does not own the current bundle is refused.
pub struct Translator {
    source_language: String,
    target_language: String,
    resolver: ConfigResolver,
    builder: PayloadBuilder,
    executor: InferenceExecutor,
    resolved: HashMap<TaskType, TaskDescriptor>,
    /// Current bundle and the task type whose resolution issued it
    bundle: Option<(TaskType, PipelineBundle)>,
    transport: Arc<dyn HttpTransport>,
    credentials: Credentials,
    service: ServiceConfig,
}

impl Translator {
    pub fn new(credentials: Credentials, service: ServiceConfig, source: &str, target: &str) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(service.timeout_secs))?;
        Ok(Self::with_transport(Arc::new(transport), credentials, service, source, target))
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        credentials: Credentials,
        service: ServiceConfig,
        source: &str,
        target: &str,
    ) -> Self {
        let resolver = ConfigResolver::new(
            transport.clone(),
            credentials.clone(),
            service.discovery_endpoint.clone(),
            service.voice_gender.clone(),
        );
        let builder = PayloadBuilder::new(credentials.pipeline_id.clone());
        let executor = InferenceExecutor::new(transport.clone());

        Self {
            source_language: source.to_string(),
            target_language: target.to_string(),
            resolver,
            builder,
            executor,
            resolved: HashMap::new(),
            bundle: None,
            transport,
            credentials,
            service,
        }
    }

    /// Fresh, unresolved translator for the opposite direction
    pub fn reversed(&self) -> Self {
        Self::with_transport(
            self.transport.clone(),
            self.credentials.clone(),
            self.service.clone(),
            &self.target_language,
            &self.source_language,
        )
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Bundle from the most recent successful resolution
    pub fn bundle(&self) -> Option<&PipelineBundle> {
        self.bundle.as_ref().map(|(_, bundle)| bundle)
    }

    /// Task type whose resolution issued the current bundle
    pub fn bundle_owner(&self) -> Option<TaskType> {
        self.bundle.as_ref().map(|(owner, _)| *owner)
    }

    /// Resolve the service for a task type and make its bundle current
    pub async fn resolve(&mut self, task_type: TaskType) -> Result<TaskDescriptor> {
        let resolution = self
            .resolver
            .resolve(task_type, &self.source_language, &self.target_language)
            .await?;

        self.bundle = Some((task_type, resolution.bundle));
        self.resolved.insert(task_type, resolution.descriptor.clone());
        Ok(resolution.descriptor)
    }

    /// Resolve a task type given by name; unknown names fail before any request
    pub async fn resolve_named(&mut self, task_type: &str) -> Result<TaskDescriptor> {
        let task_type: TaskType = task_type.parse()?;
        self.resolve(task_type).await
    }

    /// Resolve several task types in the given order
    pub async fn resolve_chain(&mut self, chain: &[TaskType]) -> Result<Vec<TaskDescriptor>> {
        let mut descriptors = Vec::with_capacity(chain.len());
        for task_type in chain {
            descriptors.push(self.resolve(*task_type).await?);
        }
        Ok(descriptors)
    }

    /// Try discovery for every task type and report the outcome of each
    pub async fn probe(&mut self) -> Vec<(TaskType, Result<TaskDescriptor>)> {
        let mut outcomes = Vec::with_capacity(TaskType::ALL.len());
        for task_type in TaskType::ALL {
            outcomes.push((task_type, self.resolve(task_type).await));
        }
        outcomes
    }

    /// Speech to source-language text
    pub async fn recognize(&self, audio_base64: &str) -> Result<String> {
        let envelope = self.run(RECOGNIZE, PipelineInput::Audio(audio_base64.to_string())).await?;
        envelope.recognized_text(RECOGNIZE.len() - 1)
    }

    /// Source-language text to target-language text
    pub async fn translate(&self, text: &str) -> Result<String> {
        let envelope = self.run(TRANSLATE, PipelineInput::Text(text.to_string())).await?;
        envelope.translated_text(TRANSLATE.len() - 1)
    }

    /// Text to base64 audio, spoken in the source language
    pub async fn synthesize(&self, text: &str) -> Result<String> {
        let envelope = self.run(SYNTHESIZE, PipelineInput::Text(text.to_string())).await?;
        envelope.synthesized_audio(SYNTHESIZE.len() - 1)
    }

    /// Speech to target-language text in one inference call
    pub async fn recognize_and_translate(&self, audio_base64: &str) -> Result<String> {
        let envelope = self
            .run(RECOGNIZE_TRANSLATE, PipelineInput::Audio(audio_base64.to_string()))
            .await?;
        envelope.translated_text(RECOGNIZE_TRANSLATE.len() - 1)
    }

    /// Text to target-language speech in one inference call
    pub async fn translate_and_synthesize(&self, text: &str) -> Result<String> {
        let envelope = self
            .run(TRANSLATE_SYNTHESIZE, PipelineInput::Text(text.to_string()))
            .await?;
        envelope.synthesized_audio(TRANSLATE_SYNTHESIZE.len() - 1)
    }

    /// Speech to target-language speech in one inference call
    pub async fn full_duplex_speech(&self, audio_base64: &str) -> Result<String> {
        let envelope = self
            .run(SPEECH_TO_SPEECH, PipelineInput::Audio(audio_base64.to_string()))
            .await?;
        envelope.synthesized_audio(SPEECH_TO_SPEECH.len() - 1)
    }

    async fn run(&self, chain: &[TaskType], input: PipelineInput) -> Result<ResponseEnvelope> {
        let tasks = chain
            .iter()
            .map(|task_type| {
                self.resolved
                    .get(task_type)
                    .cloned()
                    .ok_or(KioskError::PipelineNotConfigured(*task_type))
            })
            .collect::<Result<Vec<_>>>()?;

        // The inference endpoint must come from resolving the chain's last task
        if let Some(last) = chain.last() {
            if self.bundle_owner() != Some(*last) {
                return Err(KioskError::PipelineNotConfigured(*last));
            }
        }

        debug!(
            "Running {:?} for {} -> {}",
            chain, self.source_language, self.target_language
        );

        let payload = self.builder.build(tasks, input)?;
        let envelope = self.executor.execute(&payload, self.bundle()).await?;

        if envelope.len() < chain.len() {
            return Err(KioskError::MalformedResponse(format!(
                "expected {} task results, got {}",
                chain.len(),
                envelope.len()
            )));
        }

        info!("Pipeline {:?} completed", chain);
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::resolver::tests::{discovery_body, DISCOVERY_URL};
    use crate::pipeline::transport::{HttpReply, MockHttpTransport};
    use mockall::Sequence;
    use serde_json::json;

    fn service() -> ServiceConfig {
        ServiceConfig {
            discovery_endpoint: DISCOVERY_URL.to_string(),
            ..ServiceConfig::default()
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("user-1", "key-1", "pipe-1").unwrap()
    }

    fn translator(transport: MockHttpTransport) -> Translator {
        Translator::with_transport(Arc::new(transport), credentials(), service(), "hi", "en")
    }

    /// Expect one discovery call for `task`, answered with a bundle unique to it
    fn expect_discovery(transport: &mut MockHttpTransport, seq: &mut Sequence, task: &'static str) {
        transport
            .expect_post_json()
            .withf(move |url, _, body| url == DISCOVERY_URL && body["pipelineTasks"][0]["taskType"] == task)
            .times(1)
            .in_sequence(seq)
            .returning(move |_, _, _| {
                Ok(HttpReply::new(
                    200,
                    discovery_body(
                        &format!("{}-svc", task),
                        &format!("https://infer/{}", task),
                        &format!("{}-key", task),
                    ),
                ))
            });
    }

    #[tokio::test]
    async fn test_translate_reads_first_target() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "translation");
        transport
            .expect_post_json()
            .withf(|url, headers, body| {
                url == "https://infer/translation"
                    && headers.contains(&("Authorization".to_string(), "translation-key".to_string()))
                    && body["pipelineTasks"][0]["config"]["serviceId"] == "translation-svc"
                    && body["inputData"]["input"][0]["source"] == "hello"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(HttpReply::new(
                    200,
                    json!({"pipelineResponse": [{"output": [{"source": "hello", "target": "namaste"}]}]}).to_string(),
                ))
            });

        let mut translator = translator(transport);
        translator.resolve(TaskType::Translation).await.unwrap();
        assert_eq!(translator.translate("hello").await.unwrap(), "namaste");
    }

    #[tokio::test]
    async fn test_operation_before_resolution_skips_network() {
        let mut transport = MockHttpTransport::new();
        transport.expect_post_json().never();
        let translator = translator(transport);

        let err = translator.translate("hello").await.unwrap_err();
        assert!(matches!(err, KioskError::PipelineNotConfigured(TaskType::Translation)));

        let err = translator.full_duplex_speech("QUFB").await.unwrap_err();
        assert!(matches!(err, KioskError::PipelineNotConfigured(TaskType::Recognition)));
        assert!(translator.bundle().is_none());
    }

    #[tokio::test]
    async fn test_chain_requires_every_task_resolved() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "translation");

        let mut translator = translator(transport);
        translator.resolve(TaskType::Translation).await.unwrap();

        let err = translator.translate_and_synthesize("hello").await.unwrap_err();
        assert!(matches!(err, KioskError::PipelineNotConfigured(TaskType::Synthesis)));
    }

    #[tokio::test]
    async fn test_invalid_task_name_skips_network() {
        let mut transport = MockHttpTransport::new();
        transport.expect_post_json().never();
        let mut translator = translator(transport);

        let err = translator.resolve_named("summarize").await.unwrap_err();
        assert!(matches!(err, KioskError::InvalidTaskType(name) if name == "summarize"));
    }

    #[tokio::test]
    async fn test_full_duplex_speech_call_sequence() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "asr");
        expect_discovery(&mut transport, &mut seq, "translation");
        expect_discovery(&mut transport, &mut seq, "tts");
        transport
            .expect_post_json()
            .withf(|url, headers, body| {
                let tasks: Vec<&str> = body["pipelineTasks"]
                    .as_array()
                    .map(|t| t.iter().filter_map(|d| d["taskType"].as_str()).collect())
                    .unwrap_or_default();
                url == "https://infer/tts"
                    && headers.contains(&("Authorization".to_string(), "tts-key".to_string()))
                    && tasks == ["asr", "translation", "tts"]
                    && body["inputData"]["audio"][0]["audioContent"] == "QUFB"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(HttpReply::new(
                    200,
                    json!({"pipelineResponse": [
                        {"output": [{"source": "naam"}]},
                        {"output": [{"source": "naam", "target": "name"}]},
                        {"audio": [{"audioContent": "U1BFRUNI"}]}
                    ]})
                    .to_string(),
                ))
            });

        let mut translator = translator(transport);
        translator.resolve_chain(SPEECH_TO_SPEECH).await.unwrap();
        assert_eq!(translator.full_duplex_speech("QUFB").await.unwrap(), "U1BFRUNI");
    }

    #[tokio::test]
    async fn test_recognize_and_translate_reads_last_position() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "asr");
        expect_discovery(&mut transport, &mut seq, "translation");
        transport
            .expect_post_json()
            .withf(|url, _, _| url == "https://infer/translation")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(HttpReply::new(
                    200,
                    json!({"pipelineResponse": [
                        {"output": [{"source": "naam", "target": "from first stage"}]},
                        {"output": [{"source": "naam", "target": "name"}]}
                    ]})
                    .to_string(),
                ))
            });

        let mut translator = translator(transport);
        translator.resolve(TaskType::Recognition).await.unwrap();
        translator.resolve(TaskType::Translation).await.unwrap();

        let text = translator.recognize_and_translate("QUFB").await.unwrap();
        assert_eq!(text, "name");
        assert_eq!(RECOGNIZE_TRANSLATE.len() - 1, 1);
    }

    #[tokio::test]
    async fn test_last_resolution_owns_bundle() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "tts");
        expect_discovery(&mut transport, &mut seq, "translation");

        let mut translator = translator(transport);
        translator.resolve(TaskType::Synthesis).await.unwrap();
        translator.resolve(TaskType::Translation).await.unwrap();

        let bundle = translator.bundle().unwrap();
        assert_eq!(bundle.inference_endpoint, "https://infer/translation");
        assert_eq!(bundle.inference_credential, "translation-key");
    }

    #[tokio::test]
    async fn test_short_response_is_malformed() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "translation");
        expect_discovery(&mut transport, &mut seq, "tts");
        transport
            .expect_post_json()
            .withf(|url, _, _| url == "https://infer/tts")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(HttpReply::new(200, json!({"pipelineResponse": [{"output": [{"target": "x"}]}]}).to_string()))
            });

        let mut translator = translator(transport);
        translator.resolve_chain(TRANSLATE_SYNTHESIZE).await.unwrap();

        let err = translator.translate_and_synthesize("hello").await.unwrap_err();
        assert!(matches!(err, KioskError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_failed_resolution_keeps_previous_bundle() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "asr");
        transport
            .expect_post_json()
            .withf(|_, _, body| body["pipelineTasks"][0]["taskType"] == "translation")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(HttpReply::new(500, "upstream down")));

        let mut translator = translator(transport);
        translator.resolve(TaskType::Recognition).await.unwrap();

        let err = translator.resolve(TaskType::Translation).await.unwrap_err();
        assert!(matches!(err, KioskError::ResolverUnavailable { status: 500, .. }));
        assert_eq!(translator.bundle().unwrap().inference_endpoint, "https://infer/asr");
    }

    #[tokio::test]
    async fn test_probe_reports_each_task() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "asr");
        transport
            .expect_post_json()
            .withf(|_, _, body| body["pipelineTasks"][0]["taskType"] == "translation")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(HttpReply::new(400, "language pair not supported")));
        expect_discovery(&mut transport, &mut seq, "tts");

        let mut translator = translator(transport);
        let outcomes = translator.probe().await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].1.is_ok());
        assert!(matches!(outcomes[1], (TaskType::Translation, Err(KioskError::ResolverUnavailable { status: 400, .. }))));
        assert_eq!(outcomes[2].1.as_ref().unwrap().service_id(), Some("tts-svc"));
    }

    #[tokio::test]
    async fn test_operation_refuses_bundle_of_other_task() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "translation");
        expect_discovery(&mut transport, &mut seq, "tts");

        let mut translator = translator(transport);
        translator.resolve(TaskType::Translation).await.unwrap();
        translator.resolve(TaskType::Synthesis).await.unwrap();
        assert_eq!(translator.bundle_owner(), Some(TaskType::Synthesis));

        let err = translator.translate("hello").await.unwrap_err();
        assert!(matches!(err, KioskError::PipelineNotConfigured(TaskType::Translation)));

        let err = translator.recognize_and_translate("QUFB").await.unwrap_err();
        assert!(matches!(err, KioskError::PipelineNotConfigured(TaskType::Recognition)));
    }

    #[tokio::test]
    async fn test_chain_resolved_out_of_order_is_refused() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "tts");
        expect_discovery(&mut transport, &mut seq, "translation");

        let mut translator = translator(transport);
        translator.resolve(TaskType::Synthesis).await.unwrap();
        translator.resolve(TaskType::Translation).await.unwrap();

        let err = translator.translate_and_synthesize("hello").await.unwrap_err();
        assert!(matches!(err, KioskError::PipelineNotConfigured(TaskType::Synthesis)));
    }

    #[tokio::test]
    async fn test_translate_and_synthesize_reads_last_position() {
        let mut transport = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_discovery(&mut transport, &mut seq, "translation");
        expect_discovery(&mut transport, &mut seq, "tts");
        transport
            .expect_post_json()
            .withf(|url, headers, body| {
                url == "https://infer/tts"
                    && headers.contains(&("Authorization".to_string(), "tts-key".to_string()))
                    && body["pipelineTasks"][0]["taskType"] == "translation"
                    && body["pipelineTasks"][1]["taskType"] == "tts"
                    && body["inputData"]["input"][0]["source"] == "hello"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(HttpReply::new(
                    200,
                    json!({"pipelineResponse": [
                        {"output": [{"source": "hello", "target": "namaste"}], "audio": [{"audioContent": "REVDT1k="}]},
                        {"audio": [{"audioContent": "QUJD"}]}
                    ]})
                    .to_string(),
                ))
            });

        let mut translator = translator(transport);
        translator.resolve_chain(TRANSLATE_SYNTHESIZE).await.unwrap();

        let audio = translator.translate_and_synthesize("hello").await.unwrap();
        assert_eq!(audio, "QUJD");
        assert_eq!(TRANSLATE_SYNTHESIZE.len() - 1, 1);
    }

    #[test]
    fn test_reversed_swaps_languages() {
        let translator = translator(MockHttpTransport::new());
        let reversed = translator.reversed();
        assert_eq!(reversed.source_language(), "en");
        assert_eq!(reversed.target_language(), "hi");
        assert!(reversed.bundle().is_none());
    }
}
