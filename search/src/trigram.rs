use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// 字符三元组集合，用于容错的标题相似度比较
///
/// 文本按非字母数字字符切词并转小写，每个词前补两个空格、后补一个空格，
/// 再取所有连续三个字符。"cat" → {"  c", " ca", "cat", "at "}
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TrigramSet(BTreeSet<[char; 3]>);

impl TrigramSet {
    /// 输入应已去除变音符号
    pub fn from_text(text: &str) -> Self {
        let mut trigrams = BTreeSet::new();

        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut padded: Vec<char> = vec![' ', ' '];
            padded.extend(word.chars().flat_map(char::to_lowercase));
            padded.push(' ');

            for window in padded.windows(3) {
                trigrams.insert([window[0], window[1], window[2]]);
            }
        }

        Self(trigrams)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 共有三元组数 / 并集三元组数，任一方为空时为0
    pub fn similarity(&self, other: &Self) -> f64 {
        if self.0.is_empty() || other.0.is_empty() {
            return 0.0;
        }

        let common = self.0.intersection(&other.0).count();
        let union = self.0.len() + other.0.len() - common;
        common as f64 / union as f64
    }
}
