use std::time::Duration;

use serde_json::Value;

use crate::{
    config::AgentConfig,
    error::Result,
    services::chat_client::ChatClient,
    tools::FunctionFactory,
};

/// Default shopping-assistant instructions used when no override is given
pub const DEFAULT_INSTRUCTIONS: &str = "You are a friendly shopping assistant. When a user asks about products, use the get_product_data tool to fetch items. Your response should be in conversational language, as if you're chatting casually. Use phrases like 'I recommend', 'Here are a few suggestions', etc. Format product names in quotes. Use bullet points for listing multiple items. Avoid a robotic tone; be elegant and warm. When you are ready to give the final response, you MUST call the `final_answer` tool with an `answer` string instead of replying directly.";

/// Main agent
#[derive(Debug)]
pub struct Agent {
    chat_client: ChatClient,
    function_factory: FunctionFactory,
    model: String,
    instructions: String,
    max_iterations: usize,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl Agent {
    pub fn new(config: AgentConfig, function_factory: FunctionFactory) -> Self {
        let mut chat_client = ChatClient::new(config.api_key);
        chat_client.set_base_url(config.base_url);

        Self {
            chat_client,
            function_factory,
            model: config.model,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            max_iterations: config.max_iterations,
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        }
    }

    /// Build an agent from `GEMINI_*` environment variables with an empty
    /// tool set; register tools on the factory before calling for real use.
    pub fn from_env() -> Result<Self> {
        let config = AgentConfig::from_env()?;
        Ok(Self::new(config, FunctionFactory::new()))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.chat_client.set_base_url(base_url);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn function_factory(&self) -> &FunctionFactory {
        &self.function_factory
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn instructions(&self) -> &str {
        &self.instructions
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub(crate) fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) async fn make_raw_request(&self, request_body: &Value) -> Result<Value> {
        self.chat_client
            .chat_completion(request_body, self.timeout)
            .await
    }
}
