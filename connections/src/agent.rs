use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// Rules of the game, given to the agent when it has no earlier conversation
/// to learn from.
pub const SYSTEM_PROMPT: &str = "You will play a game of new york times connections.
You will be provided a 4 x 4 list of items to connect separated by '--'. Respond only with the first 4 items you think are connected and no other info.
The response given after will tell you if that connection is correct, if it is one away from a correct answer, or if it is not a correct connection.
You will have 4 miss guesses before the game is lost.
After a game is played, if you see the prompt explain, describe the choices you made in the game.
Games start with the prompt \"Play this connections game\".
Do not add any other text other than the 4 guesses, which are from the 4x4 game board, in each play response. Separate guesses with '--'.
Explore connections between the words rather than focusing on individual word associations, and take into account the categories or themes the words actually belong to.";

pub const EXPLAIN_PROMPT: &str = "Explain your plays.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Something that can continue a conversation, e.g. a language model.
pub trait GuessingAgent {
    fn reply(
        &self,
        conversation: &[ChatMessage],
    ) -> impl Future<Output = Result<ChatMessage, AgentError>> + Send;
}

/// Client for an Ollama server's chat endpoint.
#[derive(Debug, Clone)]
pub struct Ollama {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    options: ChatOptions,
    messages: &'a [ChatMessage],
    keep_alive: &'a str,
}

// fixed so that replays of the same conversation give the same guesses
#[derive(Serialize)]
struct ChatOptions {
    seed: u64,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
    total_duration: Option<u64>,
}

impl Ollama {
    pub const DEFAULT_HOST: &'static str = "http://localhost:11434/";

    pub fn new(host: &Url, model: impl Into<String>, timeout: Duration) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: host.join("api/chat")?,
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl GuessingAgent for Ollama {
    #[instrument(skip_all, fields(model = %self.model, messages = conversation.len()))]
    async fn reply(&self, conversation: &[ChatMessage]) -> Result<ChatMessage, AgentError> {
        let request = ChatRequest {
            model: &self.model,
            stream: false,
            options: ChatOptions {
                seed: 123,
                temperature: 0.0,
            },
            messages: conversation,
            keep_alive: "10m",
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        if let Some(nanos) = response.total_duration {
            debug!(
                seconds = Duration::from_nanos(nanos).as_secs_f64(),
                "agent responded"
            );
        }

        let message = response
            .message
            .ok_or_else(|| AgentError::Protocol("response had no message".to_owned()))?;

        if message.role != Role::Assistant {
            return Err(AgentError::Protocol(format!(
                "expected an assistant message, got {:?}",
                message.role
            )));
        }

        Ok(message)
    }
}

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum AgentError {
    #[error("error from reqwest: {0}")]
    #[event(level = ERROR)]
    Reqwest(#[from] reqwest::Error),

    #[error("bad agent url: {0}")]
    #[event(level = ERROR)]
    Url(#[from] url::ParseError),

    #[error("agent broke protocol: {0}")]
    #[event(level = ERROR)]
    Protocol(String),
}

#[cfg(test)]
pub(crate) mod script {
    use std::{collections::VecDeque, sync::Mutex};

    use super::{AgentError, ChatMessage, GuessingAgent};

    /// Replies with canned messages in order, then fails.
    #[derive(Debug, Default)]
    pub struct Scripted {
        replies: Mutex<VecDeque<String>>,
        pub seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl Scripted {
        pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(str::to_owned).collect()),
                seen: Mutex::default(),
            }
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().expect("lock should not be poisoned").len()
        }
    }

    impl GuessingAgent for Scripted {
        async fn reply(&self, conversation: &[ChatMessage]) -> Result<ChatMessage, AgentError> {
            self.seen
                .lock()
                .expect("lock should not be poisoned")
                .push(conversation.to_vec());

            self.replies
                .lock()
                .expect("lock should not be poisoned")
                .pop_front()
                .map(ChatMessage::assistant)
                .ok_or_else(|| AgentError::Protocol("script ran out".to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use url::Url;

    use super::{ChatMessage, ChatOptions, ChatRequest, Ollama, Role};

    #[test]
    fn endpoint() {
        let host = Url::parse(Ollama::DEFAULT_HOST).expect("valid url");
        let ollama = Ollama::new(&host, "llama3", Duration::from_secs(5)).expect("valid client");

        assert_eq!(ollama.endpoint().as_str(), "http://localhost:11434/api/chat");
        assert_eq!(ollama.model(), "llama3");
    }

    #[test]
    fn request_json() {
        let messages = [
            ChatMessage::system("rules"),
            ChatMessage::user("Play this connections game"),
        ];
        let request = ChatRequest {
            model: "llama3",
            stream: false,
            options: ChatOptions {
                seed: 123,
                temperature: 0.0,
            },
            messages: &messages,
            keep_alive: "10m",
        };

        assert_eq!(
            serde_json::to_value(&request).expect("should serialize"),
            serde_json::json!({
                "model": "llama3",
                "stream": false,
                "options": { "seed": 123, "temperature": 0.0 },
                "messages": [
                    { "role": "system", "content": "rules" },
                    { "role": "user", "content": "Play this connections game" }
                ],
                "keep_alive": "10m"
            })
        );
    }

    #[test]
    fn response_message() {
        let message: ChatMessage = serde_json::from_str(
            r#"{ "role": "assistant", "content": "BASS--PIKE--SOLE--CARP", "images": null }"#,
        )
        .expect("should deserialize");

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "BASS--PIKE--SOLE--CARP");
    }
}
