use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::FetchError;
use crate::scripture::ChapterRef;

/// 章节请求的结果：有内容，或者已经到了这本书的末尾（404）
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterPage {
    Content(Value),
    End,
}

/// 远程经文接口。爬虫只通过它访问网络，测试中可替换为内存实现
#[allow(async_fn_in_trait)]
pub trait ScriptureApi {
    async fn volume(&self, volume_id: &str) -> Result<Value, FetchError>;

    async fn chapter(&self, chapter: &ChapterRef<'_>) -> Result<ChapterPage, FetchError>;
}

pub struct Downloader {
    client: Client,
    base_url: Url,
}

impl Downloader {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| anyhow::anyhow!("base_url '{}' 无效: {}", config.base_url, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base_url '{}' 不能作为基础地址", config.base_url);
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn volume_url(&self, volume_id: &str) -> Url {
        self.endpoint(&["volume", volume_id])
    }

    pub fn chapter_url(&self, chapter: &ChapterRef<'_>) -> Url {
        let number = chapter.number.to_string();
        self.endpoint(&["volume", chapter.volume_id, chapter.book_id, &number])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new() 已排除 cannot-be-a-base 的地址
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, Vec<u8>), FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok((status, body.to_vec()))
    }
}

impl ScriptureApi for Downloader {
    #[instrument(skip(self))]
    async fn volume(&self, volume_id: &str) -> Result<Value, FetchError> {
        let url = self.volume_url(volume_id);
        let (status, body) = self.get(url.clone()).await?;
        volume_payload(&url, status, &body)
    }

    #[instrument(skip_all, fields(chapter = %chapter))]
    async fn chapter(&self, chapter: &ChapterRef<'_>) -> Result<ChapterPage, FetchError> {
        let url = self.chapter_url(chapter);
        let (status, body) = self.get(url.clone()).await?;
        chapter_page(&url, status, &body)
    }
}

/// 卷接口上的 404 同样是错误
pub fn volume_payload(url: &Url, status: StatusCode, body: &[u8]) -> Result<Value, FetchError> {
    check_status(url, status)?;
    decode(url, body)
}

/// 章节接口上的 404 表示这本书已经没有更多章节
pub fn chapter_page(url: &Url, status: StatusCode, body: &[u8]) -> Result<ChapterPage, FetchError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(ChapterPage::End);
    }
    check_status(url, status)?;
    decode(url, body).map(ChapterPage::Content)
}

/// 非 2xx 一律视为失败，是否把 404 当作结束由调用方决定
pub fn check_status(url: &Url, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status,
        })
    }
}

fn decode(url: &Url, body: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader(base_url: &str) -> Downloader {
        let config = Config {
            base_url: base_url.to_owned(),
            ..Config::default()
        };
        Downloader::new(&config).unwrap()
    }

    #[test]
    fn builds_volume_url_under_base_path() {
        let downloader = downloader("https://openscriptureapi.org/api/scriptures/v1/lds/en");
        assert_eq!(
            downloader.volume_url("oldtestament").as_str(),
            "https://openscriptureapi.org/api/scriptures/v1/lds/en/volume/oldtestament"
        );
    }

    #[test]
    fn builds_chapter_url_with_trailing_slash_base() {
        let downloader = downloader("http://localhost:8080/api/");
        let chapter = ChapterRef::first("bookofmormon", "1-ne").next().unwrap();
        assert_eq!(
            downloader.chapter_url(&chapter).as_str(),
            "http://localhost:8080/api/volume/bookofmormon/1-ne/2"
        );
    }

    #[test]
    fn escapes_identifiers_in_path() {
        let downloader = downloader("http://localhost/api");
        assert_eq!(
            downloader.volume_url("a b?c").as_str(),
            "http://localhost/api/volume/a%20b%3Fc"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        let config = Config {
            base_url: "mailto:someone@example.com".to_owned(),
            ..Config::default()
        };
        assert!(Downloader::new(&config).is_err());
    }

    #[test]
    fn classifies_statuses() {
        let url = Url::parse("http://localhost/api/volume/x").unwrap();
        assert!(check_status(&url, StatusCode::OK).is_ok());

        let err = check_status(&url, StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.url(), "http://localhost/api/volume/x");

        let err = check_status(&url, StatusCode::NOT_FOUND).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: StatusCode::NOT_FOUND, .. }));
    }

    #[test]
    fn decode_errors_keep_the_url() {
        let url = Url::parse("http://localhost/api/volume/x/gen/1").unwrap();
        let err = decode(&url, b"<html>not json</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert_eq!(err.url(), url.as_str());

        assert_eq!(decode(&url, "{\"t\":\"é\"}".as_bytes()).unwrap()["t"], "é");
    }

    #[test]
    fn chapter_not_found_ends_the_book() {
        let url = Url::parse("http://localhost/api/volume/oldtestament/gen/51").unwrap();
        let page = chapter_page(&url, StatusCode::NOT_FOUND, b"{\"error\":\"not found\"}").unwrap();
        assert_eq!(page, ChapterPage::End);

        // 404 的正文即使不是JSON也不影响
        let page = chapter_page(&url, StatusCode::NOT_FOUND, b"<html>404</html>").unwrap();
        assert_eq!(page, ChapterPage::End);
    }

    #[test]
    fn chapter_ok_returns_content() {
        let url = Url::parse("http://localhost/api/volume/oldtestament/gen/1").unwrap();
        let page = chapter_page(&url, StatusCode::OK, "{\"title\":\"Genèse 1\"}".as_bytes()).unwrap();
        assert_eq!(page, ChapterPage::Content(serde_json::json!({"title": "Genèse 1"})));
    }

    #[test]
    fn chapter_server_error_is_not_end() {
        let url = Url::parse("http://localhost/api/volume/oldtestament/gen/2").unwrap();
        let err = chapter_page(&url, StatusCode::INTERNAL_SERVER_ERROR, b"oops").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        let err = chapter_page(&url, StatusCode::TOO_MANY_REQUESTS, b"").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));

        let err = chapter_page(&url, StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn volume_not_found_is_an_error() {
        let url = Url::parse("http://localhost/api/volume/apocrypha").unwrap();
        let err = volume_payload(&url, StatusCode::NOT_FOUND, b"{}").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.url(), url.as_str());

        let payload = volume_payload(&url, StatusCode::OK, b"{\"books\":[]}").unwrap();
        assert_eq!(payload, serde_json::json!({"books": []}));
    }
}
