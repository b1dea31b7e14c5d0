//! LLM backends for the estimation call.
//!
//! `LlmClient` is the seam the estimator is generic over. `OpenAiClient`
//! talks to any chat-completions endpoint that supports forced function
//! calling: the request carries one tool, `Probability`, whose parameters are
//! the `EstimateResponse` schema, and `tool_choice` pins the model to it.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::EstimationError;
use super::schema::{EstimateResponse, RESPONSE_NAME, RESPONSE_SCHEMA};
use crate::config::Config;

/// A structured-output-capable model endpoint.
pub trait LlmClient: Send + Sync {
    /// Send the prompt and return the schema-shaped arguments of the
    /// model's `Probability` call.
    fn request_estimate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<EstimateResponse, EstimationError>> + Send;
}

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    organization: Option<String>,
    model: String,
}

impl OpenAiClient {
    /// An empty `api_key` builds a keyless client whose requests fail with
    /// `MissingApiKey`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EstimationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EstimationError::Client)?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: Some(api_key.into()).filter(|k| !k.is_empty()),
            organization: None,
            model: model.into(),
        })
    }

    /// Build from configuration. A missing API key is not an error here: cached
    /// results stay reachable, and only an actual model request fails.
    pub fn from_config(config: &Config) -> Result<Self, EstimationError> {
        let mut client = Self::new(
            &config.base_url,
            config.api_key.clone().unwrap_or_default(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        client.organization = config.organization.clone();
        Ok(client)
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request body for one estimation prompt.
    pub fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            tools: vec![Tool {
                kind: "function",
                function: FunctionDef {
                    name: RESPONSE_NAME,
                    description: "Report the estimated probabilities and the reasoning behind them",
                    parameters: &RESPONSE_SCHEMA,
                },
            }],
            tool_choice: ToolChoice {
                kind: "function",
                function: NamedFunction { name: RESPONSE_NAME },
            },
        }
    }
}

impl LlmClient for OpenAiClient {
    async fn request_estimate(&self, prompt: &str) -> Result<EstimateResponse, EstimationError> {
        let api_key = self.api_key.as_deref().ok_or(EstimationError::MissingApiKey)?;
        debug!(model = %self.model, endpoint = %self.endpoint, "requesting estimate");

        let mut request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt));
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let http_err = |source| EstimationError::Http {
            url: self.endpoint.clone(),
            source,
        };
        let response = request.send().await.map_err(http_err)?;
        let status = response.status();
        let body = response.text().await.map_err(http_err)?;

        if !status.is_success() {
            return Err(EstimationError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let completion: ChatCompletion = serde_json::from_str(&body)?;
        extract_response(completion)
    }
}

/// Pull the `Probability` arguments out of a completion.
///
/// Looks at `tool_calls` first and falls back to the legacy single
/// `function_call` field.
pub fn extract_response(completion: ChatCompletion) -> Result<EstimateResponse, EstimationError> {
    let message = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(EstimationError::MissingToolCall(RESPONSE_NAME))?;

    let call = message
        .tool_calls
        .into_iter()
        .flatten()
        .map(|call| call.function)
        .chain(message.function_call)
        .find(|call| call.name == RESPONSE_NAME)
        .ok_or(EstimationError::MissingToolCall(RESPONSE_NAME))?;

    Ok(serde_json::from_str(&call.arguments)?)
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    function: FunctionDef<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    function: NamedFunction<'a>,
}

#[derive(Debug, Serialize)]
struct NamedFunction<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGS: &str = r#"{\"prior\":\"0.3\",\"likelihood\":\"0.8\",\"alternativeLikelihood\":\"0.1\",\"likelihoodChainOfThought\":\"l\",\"alternativeLikelihoodChainOfThought\":\"a\",\"priorChainOfThought\":\"p\"}"#;

    fn completion(json: &str) -> ChatCompletion {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_from_tool_calls() {
        let body = format!(
            r#"{{"choices":[{{"message":{{"role":"assistant","content":null,
                "tool_calls":[{{"id":"call_1","type":"function",
                "function":{{"name":"Probability","arguments":"{ARGS}"}}}}]}}}}]}}"#
        );
        let response = extract_response(completion(&body)).unwrap();
        assert_eq!(response.prior, "0.3");
        assert_eq!(response.alternative_likelihood, "0.1");
    }

    #[test]
    fn test_extract_from_legacy_function_call() {
        let body = format!(
            r#"{{"choices":[{{"message":{{"role":"assistant",
                "function_call":{{"name":"Probability","arguments":"{ARGS}"}}}}}}]}}"#
        );
        assert!(extract_response(completion(&body)).is_ok());
    }

    #[test]
    fn test_plain_text_answer_is_missing_tool_call() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"I think 30%."}}]}"#;
        let err = extract_response(completion(body)).unwrap_err();
        assert!(matches!(err, EstimationError::MissingToolCall("Probability")));

        let err = extract_response(completion(r#"{"choices":[]}"#)).unwrap_err();
        assert!(matches!(err, EstimationError::MissingToolCall(_)));
    }

    #[test]
    fn test_malformed_arguments_is_json_error() {
        let body = r#"{"choices":[{"message":{"tool_calls":[{"function":
            {"name":"Probability","arguments":"{not json"}}]}}]}"#;
        let err = extract_response(completion(body)).unwrap_err();
        assert!(matches!(err, EstimationError::Json(_)));
    }

    #[test]
    fn test_request_body_forces_function() {
        let client = OpenAiClient::new(
            "https://api.example.test/v1/",
            "sk-test",
            "gpt-4o",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.example.test/v1/chat/completions");

        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "Probability");
        assert_eq!(body["tool_choice"]["function"]["name"], "Probability");
        assert!(body["tools"][0]["function"]["parameters"]["properties"]["prior"].is_object());
    }

    #[tokio::test]
    async fn test_keyless_client_fails_at_request_time() {
        let client = OpenAiClient::from_config(&Config::default()).unwrap();
        assert!(!client.has_api_key());
        assert!(matches!(
            client.request_estimate("prompt").await,
            Err(EstimationError::MissingApiKey)
        ));

        let config = Config {
            api_key: Some("sk-test".into()),
            organization: Some("org-1".into()),
            ..Config::default()
        };
        let client = OpenAiClient::from_config(&config).unwrap();
        assert!(client.has_api_key());
        assert_eq!(client.model(), "gpt-4o");
    }
}
