//! AI provider integration: messages, streaming, providers and the gateway

pub mod gateway;
pub mod messages;
pub mod provider_types;
pub mod providers;
pub mod sse_decoder;
pub mod streaming;

pub use gateway::ProviderGateway;
pub use messages::{ChatMessage, ChatResponse, MessageRole};
pub use provider_types::{ProviderEndpoint, ProviderKind};
pub use providers::{ChatProvider, ProviderInstance};
pub use streaming::{ChatStream, StreamChunk, collect_stream};
