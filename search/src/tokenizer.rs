use std::collections::HashSet;

use once_cell::sync::Lazy;
use utils_common::fold;

/// 英文停用词，不进入全文索引
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "it", "as", "be", "this", "that", "from", "was", "are", "were", "been", "has",
        "have", "had", "not", "no", "do", "does", "did", "will", "would", "can", "could",
        "should", "may", "might", "we", "you", "he", "she", "they", "my", "your", "how", "what",
        "why", "when", "where", "which", "who", "its", "their", "our", "his", "her", "them",
        "us", "me", "than", "then", "so", "if", "about", "up", "out", "just", "also", "into",
        "over", "after", "before", "these", "those", "there", "here", "very", "such", "only",
    ]
    .into_iter()
    .collect()
});

/// 复数和第三人称单数词尾，先于其他后缀剥离
const PLURALS: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ies", "y"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("s", ""),
];

/// 后缀替换表，作用在单数形式上，按长度从长到短匹配
const SUFFIXES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("iveness", "ive"),
    ("ization", "ize"),
    ("ating", "ate"),
    ("izing", "ize"),
    ("ising", "ise"),
    ("ation", "ate"),
    ("ously", "ous"),
    ("ively", "ive"),
    ("fully", "ful"),
    ("ment", ""),
    ("ness", ""),
    ("ting", "t"),
    ("able", ""),
    ("ible", ""),
    ("ally", "al"),
    ("ing", ""),
    ("ful", ""),
    ("ous", ""),
    ("est", ""),
    ("ed", ""),
    ("er", ""),
    ("ly", ""),
];

/// 去掉这些后缀后，末尾重复的辅音要合并（running → run）
const UNDOUBLE_AFTER: &[&str] = &["ing", "ting", "ed", "er", "est"];

/// 一个词元及其在文本中的位置（从1开始，停用词同样占位）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub position: u32,
}

/// 将文本切分为词干化的词元
///
/// 先去除变音符号并转小写，按非字母数字字符切分，
/// 丢弃单字符词和停用词。
pub fn tokenize(text: &str) -> Vec<Token> {
    let folded = fold(text);
    let mut tokens = Vec::new();
    let mut position = 0u32;

    for word in folded.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        position = position.saturating_add(1);

        if word.chars().count() < 2 || STOP_WORDS.contains(word) {
            continue;
        }

        tokens.push(Token {
            lexeme: stem(word),
            position,
        });
    }

    tokens
}

/// 简单的英文后缀剥离词干提取，输入应已是小写
///
/// 先还原单数，再剥离其余后缀，单复数因此得到同一个词干。
pub fn stem(word: &str) -> String {
    if word.len() < 4 || !word.is_ascii() {
        return word.to_string();
    }

    let singular = strip_plural(word);
    strip_suffix(&singular)
}

fn strip_plural(word: &str) -> String {
    for (suffix, replacement) in PLURALS {
        if !word.ends_with(suffix) {
            continue;
        }
        if *suffix == "s" && (word.ends_with("ss") || word.ends_with("us") || word.ends_with("is")) {
            break;
        }

        let base = &word[..word.len() - suffix.len()];
        if base.len() < 2 {
            continue;
        }
        return format!("{}{}", base, replacement);
    }

    word.to_string()
}

fn strip_suffix(word: &str) -> String {
    if word.len() < 4 {
        return word.to_string();
    }

    for (suffix, replacement) in SUFFIXES {
        if !word.ends_with(suffix) {
            continue;
        }

        let base = &word[..word.len() - suffix.len()];
        if base.len() < 2 {
            continue;
        }

        let mut stemmed = format!("{}{}", base, replacement);
        if UNDOUBLE_AFTER.contains(suffix) {
            undouble(&mut stemmed);
        }
        return stemmed;
    }

    word.to_string()
}

fn undouble(word: &mut String) {
    let bytes = word.as_bytes();
    let len = bytes.len();
    if len < 3 {
        return;
    }
    let last = bytes[len - 1];
    if last == bytes[len - 2] && !matches!(last, b'a' | b'e' | b'i' | b'o' | b'u' | b'l' | b's' | b'z') {
        word.pop();
    }
}
