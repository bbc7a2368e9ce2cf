use serde::{Deserialize, Serialize};

/// 聊天消息的发送方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "You")]
    You,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub const GREETING: &'static str = "Hi, how can I help you today?";

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
        }
    }

    pub fn you(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::You,
            text: text.into(),
        }
    }

    pub fn greeting() -> Self {
        Self::ai(Self::GREETING)
    }
}

/// `POST /groq` 的请求体；`history` 是整段对话的 JSON 文本
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
    pub history: String,
}

/// 聊天接口的回复：纯文本、`{data: "..."}`，或其他任意 JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Text(String),
    Wrapped { data: String },
    Other(serde_json::Value),
}

impl ChatReply {
    pub fn into_text(self) -> String {
        match self {
            ChatReply::Text(text) | ChatReply::Wrapped { data: text } => text,
            ChatReply::Other(value) => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_wire_format() {
        let history = vec![ChatMessage::greeting(), ChatMessage::you("What is Rust?")];
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(
            json,
            r#"[{"sender":"AI","text":"Hi, how can I help you today?"},{"sender":"You","text":"What is Rust?"}]"#
        );
    }

    #[test]
    fn test_reply_shapes() {
        let text: ChatReply = serde_json::from_str(r#""A systems language.""#).unwrap();
        assert_eq!(text.into_text(), "A systems language.");

        let wrapped: ChatReply = serde_json::from_str(r#"{"data": "Wrapped answer"}"#).unwrap();
        assert_eq!(wrapped.into_text(), "Wrapped answer");

        let other: ChatReply = serde_json::from_str(r#"{"answer": 42}"#).unwrap();
        assert_eq!(other.into_text(), r#"{"answer":42}"#);
    }
}
