//! 学习助手聊天 - 业务能力层
//!
//! 只是聊天接口的客户端：对话记录保存在本地文件，每次提问连同完整记录一起发给后端。

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AppResult, FileError};
use crate::infrastructure::ApiClient;
use crate::models::chat::{ChatMessage, ChatReply, ChatRequest};

const CHAT_ENDPOINT: &str = "/groq";

/// 请求失败时作为助手回复展示的文案
pub const CHAT_ERROR: &str = "Sorry, an error occurred. Please try again later.";

/// 对话记录文件
#[derive(Debug, Clone)]
pub struct ChatHistory {
    path: PathBuf,
}

impl ChatHistory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 读取记录；没有记录或无法解析时只有一句问候
    pub fn load(&self) -> AppResult<Vec<ChatMessage>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("聊天记录无法解析，重新开始: {}", e);
                vec![ChatMessage::greeting()]
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![ChatMessage::greeting()]),
            Err(source) => Err(FileError::ReadFailed {
                path: self.path.display().to_string(),
                source,
            }
            .into()),
        }
    }

    pub fn save(&self, messages: &[ChatMessage]) -> AppResult<()> {
        let content = serde_json::to_string(messages)?;
        std::fs::write(&self.path, content).map_err(|source| {
            FileError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            }
            .into()
        })
    }

    pub fn clear(&self) -> AppResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FileError::DeleteFailed {
                path: self.path.display().to_string(),
                source,
            }
            .into()),
        }
    }
}

pub struct ChatService {
    client: ApiClient,
    history: ChatHistory,
}

impl ChatService {
    pub fn new(client: ApiClient, history: ChatHistory) -> Self {
        Self { client, history }
    }

    pub fn history(&self) -> AppResult<Vec<ChatMessage>> {
        self.history.load()
    }

    pub fn clear(&self) -> AppResult<()> {
        self.history.clear()
    }

    /// 提问并返回助手的回复；空白输入不发送
    ///
    /// 请求失败不算错误：回复换成 `CHAT_ERROR`，同样写进记录。
    pub async fn send(&self, prompt: &str) -> AppResult<Option<ChatMessage>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        let mut messages = self.history.load()?;
        messages.push(ChatMessage::you(prompt));
        self.history.save(&messages)?;

        let request = ChatRequest {
            prompt,
            history: serde_json::to_string(&messages)?,
        };
        let reply = match self.client.post_json::<_, ChatReply>(CHAT_ENDPOINT, &request).await {
            Ok(reply) => ChatMessage::ai(reply.into_text()),
            Err(e) => {
                warn!("聊天请求失败: {}", e);
                ChatMessage::ai(CHAT_ERROR)
            }
        };
        debug!("聊天记录共 {} 条", messages.len() + 1);

        messages.push(reply.clone());
        self.history.save(&messages)?;
        Ok(Some(reply))
    }
}
