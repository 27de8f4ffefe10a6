pub mod downloader;
pub mod processor;

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, instrument, warn};

pub use downloader::{ChapterPage, Downloader, ScriptureApi};
pub use processor::Processor;

use crate::config::Config;
use crate::scripture::{Book, ChapterRef, VolumeIndex, is_safe_component};

/// 一次运行的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub volumes_saved: usize,
    pub volumes_failed: usize,
    pub books_completed: usize,
    pub books_abandoned: usize,
    pub chapters_saved: usize,
}

/// 一本书的章节循环如何结束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BookOutcome {
    Completed { chapters: u32 },
    Abandoned { chapters: u32 },
}

pub struct ScriptureCrawler<A = Downloader> {
    api: A,
    processor: Processor,
    volumes: Vec<String>,
    chapter_delay: Duration,
}

impl ScriptureCrawler<Downloader> {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_api(Downloader::new(config)?, config))
    }
}

impl<A: ScriptureApi> ScriptureCrawler<A> {
    pub fn with_api(api: A, config: &Config) -> Self {
        Self {
            api,
            processor: Processor::new(config.data_dir.clone()),
            volumes: config.volumes.clone(),
            chapter_delay: config.chapter_delay(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// 依次处理所有卷。单个卷或单本书失败只记录日志，不会中断整个运行
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for volume_id in &self.volumes {
            match self.fetch_volume(volume_id, &mut summary).await {
                Ok(()) => summary.volumes_saved += 1,
                Err(e) => {
                    error!("卷 {} 处理失败，跳过: {:#}", volume_id, e);
                    summary.volumes_failed += 1;
                }
            }
        }

        summary
    }

    #[instrument(skip(self, summary))]
    async fn fetch_volume(&self, volume_id: &str, summary: &mut RunSummary) -> Result<()> {
        if !is_safe_component(volume_id) {
            anyhow::bail!("卷ID {:?} 不能用作路径", volume_id);
        }

        info!("正在获取卷 {} 的元数据", volume_id);
        let payload = self.api.volume(volume_id).await?;

        self.processor
            .write_json(&self.processor.volume_file(volume_id), &payload)
            .await?;

        let index = VolumeIndex::from_payload(volume_id, &payload);
        info!("卷 {} 共 {} 本书", volume_id, index.books.len());

        for book in &index.books {
            match self.fetch_book(&index, book, summary).await {
                BookOutcome::Completed { chapters } => {
                    info!("{}/{} 完成，共 {} 章", volume_id, book.id, chapters);
                    summary.books_completed += 1;
                }
                BookOutcome::Abandoned { chapters } => {
                    warn!("{}/{} 在保存 {} 章后中止", volume_id, book.id, chapters);
                    summary.books_abandoned += 1;
                }
            }
        }

        Ok(())
    }

    /// 从第1章开始逐章请求，直到接口返回404；其他任何失败同样结束这本书
    #[instrument(skip_all, fields(book = %book.id))]
    async fn fetch_book(
        &self,
        volume: &VolumeIndex,
        book: &Book,
        summary: &mut RunSummary,
    ) -> BookOutcome {
        let book_dir = self.processor.book_dir(&volume.id, &book.id);
        if let Err(e) = self.processor.create_dir(&book_dir).await {
            error!("{:#}", e);
            return BookOutcome::Abandoned { chapters: 0 };
        }

        info!("正在获取 {}/{} ({}) 的章节", volume.id, book.id, book.title);
        let mut chapter = ChapterRef::first(&volume.id, &book.id);
        loop {
            let saved = chapter.number - 1;
            let content = match self.api.chapter(&chapter).await {
                Ok(ChapterPage::Content(content)) => content,
                Ok(ChapterPage::End) => return BookOutcome::Completed { chapters: saved },
                Err(e) => {
                    let url = e.url().to_owned();
                    let status = e.status();
                    error!(
                        %url,
                        ?status,
                        "获取章节 {} 失败: {:#}",
                        chapter,
                        anyhow::Error::new(e)
                    );
                    return BookOutcome::Abandoned { chapters: saved };
                }
            };

            let path = self.processor.chapter_file(&chapter);
            if let Err(e) = self.processor.write_json(&path, &content).await {
                error!("{:#}", e);
                return BookOutcome::Abandoned { chapters: saved };
            }
            summary.chapters_saved += 1;

            let Some(next) = chapter.next() else {
                warn!("{} 已是最大章号，停止请求", chapter);
                return BookOutcome::Abandoned { chapters: saved + 1 };
            };
            chapter = next;
            if !self.chapter_delay.is_zero() {
                tokio::time::sleep(self.chapter_delay).await;
            }
        }
    }
}
