//! 验证码重发冷却 - 业务能力层
//!
//! 每条命令都是独立进程，所以冷却时间记在文件里：`{key: 上次发送的 Unix 秒}`。

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AppResult, AuthError, FileError};

/// 注册验证码的冷却键
pub fn signup_key(user_id: &str) -> String {
    format!("signup:{}", user_id)
}

/// 找回密码验证码的冷却键
pub fn reset_key(role: crate::models::Role, email: &str) -> String {
    format!("reset:{}:{}", role, email.trim().to_ascii_lowercase())
}

#[derive(Debug, Clone)]
pub struct OtpCooldown {
    path: PathBuf,
    period_secs: u64,
}

impl OtpCooldown {
    pub fn new(path: impl AsRef<Path>, period_secs: u64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            period_secs,
        }
    }

    fn load(&self) -> AppResult<BTreeMap<String, i64>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(FileError::ReadFailed {
                    path: self.path.display().to_string(),
                    source,
                }
                .into())
            }
        };
        // 文件损坏时当作没有记录
        Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("冷却记录文件无法解析，忽略: {}", e);
            BTreeMap::new()
        }))
    }

    /// 还需要等待的秒数，None 表示可以发送
    pub fn remaining(&self, key: &str, now: DateTime<Utc>) -> AppResult<Option<u64>> {
        let Some(&sent_at) = self.load()?.get(key) else {
            return Ok(None);
        };
        let elapsed = now.timestamp().saturating_sub(sent_at).max(0) as u64;
        Ok((elapsed < self.period_secs).then(|| self.period_secs - elapsed))
    }

    /// 冷却中返回 `AuthError::OtpCooldown`
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> AppResult<()> {
        match self.remaining(key, now)? {
            Some(remaining_secs) => Err(AuthError::OtpCooldown { remaining_secs }.into()),
            None => Ok(()),
        }
    }

    /// 记录一次成功发送
    pub fn record(&self, key: &str, now: DateTime<Utc>) -> AppResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), now.timestamp());

        let content = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, content).map_err(|source| FileError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!("验证码冷却开始: {} ({} 秒)", key, self.period_secs);
        Ok(())
    }
}
