use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

static CONFIG_FILE: &str = "scripture_fetch";
static ENV_PREFIX: &str = "SCRIPTURE_FETCH";

pub static DEFAULT_BASE_URL: &str = "https://openscriptureapi.org/api/scriptures/v1/lds/en";

pub static DEFAULT_VOLUMES: [&str; 5] = [
    "bookofmormon",
    "oldtestament",
    "newtestament",
    "doctrineandcovenants",
    "pearlofgreatprice",
];

/// 运行配置，启动时加载一次后只读传入爬虫
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_volumes")]
    pub volumes: Vec<String>,
    /// 每成功保存一章后的等待时间
    #[serde(default = "default_chapter_delay_ms")]
    pub chapter_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_dir: default_data_dir(),
            volumes: default_volumes(),
            chapter_delay_ms: default_chapter_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_volumes() -> Vec<String> {
    DEFAULT_VOLUMES.iter().map(|v| v.to_string()).collect()
}

fn default_chapter_delay_ms() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// 依次读取工作目录下可选的 `scripture_fetch.toml` 和 `SCRIPTURE_FETCH_*` 环境变量
    pub fn load() -> Result<Self> {
        config::Config::builder()
            .add_source(
                config::File::with_name(CONFIG_FILE)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("volumes"),
            )
            .build()?
            .try_deserialize::<Self>()
            .map_err(|e| anyhow::anyhow!("配置反序列化失败: {}", e))?
            .validated()
    }

    /// 只读取指定的配置文件，不合并环境变量
    pub fn load_from(config_path: &Path) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(config_path).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Self>()
            .map_err(|e| anyhow::anyhow!("{}文件反序列化失败: {}", config_path.display(), e))?
            .validated()
    }

    fn validated(self) -> Result<Self> {
        if self.volumes.is_empty() {
            anyhow::bail!("配置中没有任何卷");
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("base_url '{}' 无效: {}", self.base_url, e))?;
        Ok(self)
    }

    pub fn chapter_delay(&self) -> Duration {
        Duration::from_millis(self.chapter_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
