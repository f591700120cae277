// Client for the hosted speech pipeline
//
// A request goes through three stages:
// - resolver: ask the control plane which service handles a task, receiving
//   an inference endpoint and credential (the bundle)
// - payload: wrap resolved tasks and the literal input into a request body
// - executor: post the body to the bundle's endpoint and decode the reply

pub mod task;
pub mod transport;
pub mod payload;
pub mod response;
pub mod executor;
pub mod resolver;

pub use task::{LanguagePair, TaskConfig, TaskDescriptor, TaskType};
pub use transport::{HttpReply, HttpTransport, ReqwestTransport};
pub use payload::{InputData, PayloadBuilder, PipelineInput, RequestPayload};
pub use response::{ResponseEnvelope, TaskOutput};
pub use executor::{InferenceExecutor, PipelineBundle};
pub use resolver::{ConfigResolver, Resolution};
