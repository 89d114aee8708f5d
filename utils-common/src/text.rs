use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// 富文本中的结构字段，不参与全文索引
const STRUCTURAL_KEYS: &[&str] = &[
    "type",
    "id",
    "url",
    "file",
    "style",
    "alignment",
    "version",
    "time",
    "withBorder",
    "withBackground",
    "stretched",
];

/// 从富文本内容中提取纯文本，供全文索引使用
///
/// 内容通常是编辑器导出的JSON块结构，收集其中所有字符串叶子节点；
/// 不是JSON的内容按普通文本（可能带HTML标签）处理。
pub fn plain_text(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut pieces = Vec::new();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ (Value::Object(_) | Value::Array(_) | Value::String(_))) => {
            collect_strings(&value, &mut pieces);
        }
        _ => pieces.push(trimmed.to_string()),
    }

    let joined = pieces.join(" ");
    collapse_whitespace(&decode_entities(&remove_html_tags(&joined)))
}

/// 移除字符串中的HTML标签，标签位置替换为空格避免单词粘连
pub fn remove_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, " ").into_owned()
}

fn collect_strings(value: &Value, pieces: &mut Vec<String>) {
    match value {
        Value::String(s) => pieces.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_strings(item, pieces);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if STRUCTURAL_KEYS.contains(&key.as_str()) {
                    continue;
                }
                collect_strings(item, pieces);
            }
        }
        _ => {}
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
