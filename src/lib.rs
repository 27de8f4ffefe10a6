pub mod config;
pub mod crawler;
pub mod error;
pub mod logger;
pub mod scripture;
pub mod utils;

pub use config::Config;
pub use crawler::{ChapterPage, RunSummary, ScriptureApi, ScriptureCrawler};
pub use error::FetchError;
pub use scripture::{Book, ChapterRef, VolumeIndex};
