//! Upstream part search: the web-search-enabled language model that
//! returns vendor offers as structured JSON.

pub mod openai_client;
pub mod prompt;
pub mod response;

use async_trait::async_trait;
use serde_json::Value;

use wiretronic_models::ReasoningEffort;
use wiretronic_utils::WiretronicResult;

pub use openai_client::OpenAiClient;
pub use prompt::{build_prompt, DEFAULT_PROMPT};
pub use response::decode_response;

/// One research call against the upstream model.
///
/// Returns the raw response envelope; [`decode_response`] turns it into
/// offers.
#[async_trait]
pub trait PartSearch: Send + Sync {
    async fn search(&self, prompt: &str, effort: ReasoningEffort, api_key: &str) -> WiretronicResult<Value>;
}
