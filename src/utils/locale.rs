//! 语言代码工具

/// 取语言代码的主语言部分
///
/// 先截到第一个 `-` / `_`，再取前两个字符并转为小写：
/// `fr-CA` → `fr`，`pt_BR` → `pt`，`EN` → `en`。
/// 空白输入或包含非 ASCII 字母时返回 `None`。
pub fn language_subtag(locale: &str) -> Option<String> {
    let primary = locale
        .trim()
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default();
    if !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let subtag: String = primary
        .chars()
        .take(2)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if subtag.is_empty() {
        None
    } else {
        Some(subtag)
    }
}
