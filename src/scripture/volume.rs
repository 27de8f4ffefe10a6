use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::scripture::{Book, is_safe_component};

/// 从卷元数据中读出的书目列表，原始响应另行原样保存
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeIndex {
    pub id: String,
    pub books: Vec<Book>,
}

impl VolumeIndex {
    /// 没有 `books` 字段时书目为空；缺少 `_id` 或 `_id` 不能用作路径的条目会被跳过
    pub fn from_payload(volume_id: &str, payload: &Value) -> Self {
        let entries = payload
            .get("books")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut books = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let book = match Book::deserialize(entry) {
                Ok(book) => book,
                Err(e) => {
                    warn!("卷 {} 的第 {} 本书条目无效，跳过: {}", volume_id, index + 1, e);
                    continue;
                }
            };
            if !is_safe_component(&book.id) {
                warn!("卷 {} 中的书ID {:?} 不能用作路径，跳过", volume_id, book.id);
                continue;
            }
            books.push(book);
        }

        Self {
            id: volume_id.to_owned(),
            books,
        }
    }
}
