use std::time::Instant;

use anyhow::Result;
use tracing::info;

use scripture_fetch::utils::format_elapsed;
use scripture_fetch::{Config, ScriptureCrawler, logger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logger::init();

    let config = Config::load()?;
    info!(
        "开始下载 {} 个卷: {} -> {}",
        config.volumes.len(),
        config.base_url,
        config.data_dir.display()
    );

    let crawler = ScriptureCrawler::new(&config)?;
    let start = Instant::now();
    let summary = crawler.run().await;

    info!(
        "卷: 成功 {} 失败 {}; 书: 完成 {} 中止 {}; 章节: {}",
        summary.volumes_saved,
        summary.volumes_failed,
        summary.books_completed,
        summary.books_abandoned,
        summary.chapters_saved
    );
    info!("✅ 下载完成！耗时: {}", format_elapsed(start.elapsed()));
    Ok(())
}
