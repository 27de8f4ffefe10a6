use reqwest::StatusCode;
use thiserror::Error;

/// 单次请求的失败原因。章节的 404 不在其中，它由 `ChapterPage::End` 表示
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求 {url} 失败")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("请求 {url} 返回状态码 {status}")]
    Status { url: String, status: StatusCode },

    #[error("解析 {url} 的JSON失败")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { source, .. } => source.status(),
            FetchError::Decode { .. } => None,
        }
    }
}
