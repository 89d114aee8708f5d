//! 去除变音符号，使带重音与不带重音的写法可以直接比较。
//!
//! - "café" → "cafe"
//! - "Ærøskøbing" → "AEroskobing"
//! - "straße" → "strasse"

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 去除文本中的变音符号，保留大小写
///
/// NFD分解后丢弃所有组合标记，再把无法分解的拉丁字母折叠成ASCII写法。
/// 同样的输入总是得到同样的输出，且 `normalize(normalize(s)) == normalize(s)`。
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());

    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match fold_letter(c) {
            Some(folded) => normalized.push_str(folded),
            None => normalized.push(c),
        }
    }

    normalized
}

/// 去除变音符号并转为小写，用于分词和高亮匹配
pub fn fold(text: &str) -> String {
    normalize(text).to_lowercase()
}

// NFD不会分解的字母
fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'ø' => "o",
        'Ø' => "O",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'ł' => "l",
        'Ł' => "L",
        'ħ' => "h",
        'Ħ' => "H",
        'ı' => "i",
        'ß' => "ss",
        'ẞ' => "SS",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'þ' => "th",
        'Þ' => "TH",
        _ => return None,
    };
    Some(folded)
}
