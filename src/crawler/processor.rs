use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;
use tracing::{info, instrument};

use crate::scripture::ChapterRef;

/// 负责数据目录的布局和JSON文件的读写
#[derive(Clone)]
pub struct Processor {
    data_dir: PathBuf,
}

impl Processor {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn volume_dir(&self, volume_id: &str) -> PathBuf {
        self.data_dir.join(volume_id)
    }

    /// `<data>/<volume>/<volume>_data.json`
    pub fn volume_file(&self, volume_id: &str) -> PathBuf {
        self.volume_dir(volume_id)
            .join(format!("{}_data.json", volume_id))
    }

    pub fn book_dir(&self, volume_id: &str, book_id: &str) -> PathBuf {
        self.volume_dir(volume_id).join(book_id)
    }

    /// `<data>/<volume>/<book>/<book>_<n>.json`
    pub fn chapter_file(&self, chapter: &ChapterRef<'_>) -> PathBuf {
        self.book_dir(chapter.volume_id, chapter.book_id)
            .join(chapter.filename())
    }

    pub async fn create_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("创建目录失败: {}", dir.display()))
    }

    /// 以两个空格缩进写入，非ASCII字符原样保留，已存在的文件直接覆盖
    #[instrument(skip_all)]
    pub async fn write_json(&self, path: &Path, data: &Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir(parent).await?;
        }

        let content = serde_json::to_string_pretty(data)
            .with_context(|| format!("序列化失败: {}", path.display()))?;
        fs::write(path, content)
            .await
            .with_context(|| format!("保存文件失败: {}", path.display()))?;

        info!("已保存: {}", path.display());
        Ok(())
    }

    pub async fn read_json(&self, path: &Path) -> Result<Value> {
        let content = fs::read(path)
            .await
            .with_context(|| format!("读取文件失败: {}", path.display()))?;
        serde_json::from_slice(&content).with_context(|| format!("解析文件失败: {}", path.display()))
    }
}
