pub mod book;
pub mod chapter;
pub mod volume;

pub use book::Book;
pub use chapter::ChapterRef;
pub use volume::VolumeIndex;

/// 标识符会直接作为目录名或文件名的一部分，只接受单个普通路径段
pub fn is_safe_component(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}
