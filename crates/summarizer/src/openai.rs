use {
    async_trait::async_trait,
    newsroll_common::{ChannelHandle, Error, Post, Result},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{Summarizer, prompt::build_summary_prompt};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Secret<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
            model: model.into(),
        }
    }
}

impl std::fmt::Debug for OpenAiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSummarizer")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(
        &self,
        channel: &ChannelHandle,
        channel_link: &str,
        posts: &[Post],
    ) -> Result<String> {
        if posts.is_empty() {
            return Err(Error::validation("posts is empty"));
        }

        let prompt = build_summary_prompt(channel, channel_link, posts);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::summarize(format!("{channel}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::summarize(format!("{channel}: HTTP {status}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::summarize(format!("{channel}: {e}")))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
            .trim()
            .to_owned();

        if text.is_empty() {
            return Err(Error::summarize(format!(
                "{channel}: empty summary from model"
            )));
        }

        debug!(channel = %channel, chars = text.len(), "channel summarized");
        Ok(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {chrono::Utc, serde_json::json};

    use super::*;

    fn channel() -> ChannelHandle {
        ChannelHandle::new("durov").unwrap()
    }

    fn posts() -> Vec<Post> {
        vec![Post {
            channel: channel(),
            msg_id: 1,
            date: Utc::now(),
            text: "a post".to_owned(),
            permalink: None,
        }]
    }

    fn summarizer(base_url: String) -> OpenAiSummarizer {
        OpenAiSummarizer::new(
            reqwest::Client::new(),
            base_url,
            Secret::new("test-key".to_owned()),
            "test-model",
        )
    }

    #[tokio::test]
    async fn returns_generated_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{"message": {"content": "  - a summary\n"}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = summarizer(server.url())
            .summarize(&channel(), "https://t.me/durov", &posts())
            .await
            .unwrap();
        assert_eq!(text, "- a summary");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_generated_text_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "  "}}]}).to_string())
            .create_async()
            .await;

        let err = summarizer(server.url())
            .summarize(&channel(), "https://t.me/durov", &posts())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Summarize { .. }));
        assert!(err.to_string().contains("empty summary"));
    }

    #[tokio::test]
    async fn http_errors_are_summarization_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let err = summarizer(server.url())
            .summarize(&channel(), "https://t.me/durov", &posts())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Summarize { .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn empty_post_list_is_a_validation_error() {
        let err = summarizer("http://unused.invalid".to_owned())
            .summarize(&channel(), "https://t.me/durov", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
