use std::fmt;

/// 一章的定位：卷、书和从1开始的章号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterRef<'a> {
    pub volume_id: &'a str,
    pub book_id: &'a str,
    pub number: u32,
}

impl<'a> ChapterRef<'a> {
    pub fn first(volume_id: &'a str, book_id: &'a str) -> Self {
        Self {
            volume_id,
            book_id,
            number: 1,
        }
    }

    /// 章号溢出时返回 `None`
    pub fn next(self) -> Option<Self> {
        Some(Self {
            number: self.number.checked_add(1)?,
            ..self
        })
    }

    pub fn filename(&self) -> String {
        format!("{}_{}.json", self.book_id, self.number)
    }
}

impl fmt::Display for ChapterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.volume_id, self.book_id, self.number)
    }
}
