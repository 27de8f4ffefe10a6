use std::time::Duration;

/// 把耗时格式化为 `1分5秒20毫秒` 这样的形式，省略为零的尾部单位
pub fn format_elapsed(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 60000 {
        let mins = total_ms / 60000;
        let secs = (total_ms % 60000) / 1000;
        let ms_remaining = total_ms % 1000;

        if ms_remaining > 0 {
            format!("{}分{}秒{}毫秒", mins, secs, ms_remaining)
        } else {
            format!("{}分{}秒", mins, secs)
        }
    } else if total_ms >= 1000 {
        let secs = total_ms / 1000;
        let ms_remaining = total_ms % 1000;

        if ms_remaining > 0 {
            format!("{}秒{}毫秒", secs, ms_remaining)
        } else {
            format!("{}秒", secs)
        }
    } else {
        format!("{}毫秒", total_ms)
    }
}
