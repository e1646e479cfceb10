//! OpenAI-compatible chat and image client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::engine::{ChatContext, ChatEngine, ChatMessage};
use super::generator::{GenerationError, ImageSize};
use crate::items::ImageRef;

/// Default API base URL
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Image size used when the caller does not ask for one
const DEFAULT_IMAGE_SIZE: ImageSize = ImageSize { width: 512, height: 512 };

/// Client for an OpenAI-compatible API
#[derive(Clone)]
pub struct OpenAiEngine {
    client: Client,
    base_url: String,
    text_model: String,
    image_model: String,
    token: String,
}

impl OpenAiEngine {
    pub fn new(base_url: &str, text_model: &str, image_model: &str, token: &str) -> Self {
        Self::with_timeout(base_url, text_model, image_model, token, 120)
    }

    pub fn with_timeout(base_url: &str, text_model: &str, image_model: &str, token: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
            token: token.trim().to_string(),
        }
    }

    async fn post<Req: Serialize + Sync, Resp: DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, GenerationError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map_err(|e| GenerationError::Request(e.to_string()))?;
            return Err(GenerationError::Request(format!("{status}: {error_text}")));
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ChatEngine for OpenAiEngine {
    async fn complete(&self, context: &ChatContext) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.text_model,
            messages: &context.messages,
            n: 1,
        };
        let response: ChatResponse = self.post("/v1/chat/completions", &request).await?;
        first_reply(response)
    }

    async fn text_to_image(&self, prompt: &str, size: Option<ImageSize>) -> Result<ImageRef, GenerationError> {
        let size = size.unwrap_or(DEFAULT_IMAGE_SIZE);
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
            size: format!("{}x{}", size.width, size.height),
            response_format: "b64_json",
        };
        let response: ImageResponse = self.post("/v1/images/generations", &request).await?;
        first_image(response)
    }
}

fn first_reply(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::InvalidResponse("No content in chat response".to_string()))
}

fn first_image(response: ImageResponse) -> Result<ImageRef, GenerationError> {
    let data = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("No image in response".to_string()))?;
    data.b64_json
        .or(data.url)
        .map(ImageRef::new)
        .ok_or_else(|| GenerationError::InvalidResponse("Image has neither data nor url".to_string()))
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: String,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let engine = OpenAiEngine::new("http://localhost:8080/", "text", "image", " token\n");
        assert_eq!(engine.base_url, "http://localhost:8080");
        assert_eq!(engine.token, "token");
    }

    #[test]
    fn test_chat_request_shape() {
        let mut context = ChatContext::new();
        context.system("premise").user("go");
        let request = ChatRequest {
            model: "m",
            messages: &context.messages,
            n: 1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "go");
    }

    #[test]
    fn test_first_reply() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#).unwrap();
        assert_eq!(first_reply(response).unwrap(), "hello");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_reply(empty), Err(GenerationError::InvalidResponse(_))));
    }

    #[test]
    fn test_first_image_prefers_inline_data() {
        let response: ImageResponse = serde_json::from_str(r#"{"data":[{"b64_json":"aGk=","url":"http://x"}]}"#).unwrap();
        assert_eq!(first_image(response).unwrap().as_str(), "aGk=");

        let response: ImageResponse = serde_json::from_str(r#"{"data":[{"url":"http://x"}]}"#).unwrap();
        assert_eq!(first_image(response).unwrap().as_str(), "http://x");
    }
}
