use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::MatchMode;
use crate::tokenizer::tokenize;

/// 每个词元最多记录的位置数
const MAX_POSITIONS: usize = 256;

/// 未加权词元的权重
const LEXEME_WEIGHT: f64 = 0.1;

/// Σ 1/n² 的极限 (π²/6)，用于把位置衰减和归一到 [0, 1]
const ZETA_2: f64 = 1.644_934_066_85;

/// 预先计算的全文索引向量：词干 → 出现位置
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchVector {
    lexemes: BTreeMap<String, Vec<u32>>,
}

impl SearchVector {
    /// 对一段文本建立索引向量
    pub fn from_text(text: &str) -> Self {
        let mut lexemes: BTreeMap<String, Vec<u32>> = BTreeMap::new();

        for token in tokenize(text) {
            let positions = lexemes.entry(token.lexeme).or_default();
            if positions.len() < MAX_POSITIONS {
                positions.push(token.position);
            }
        }

        Self { lexemes }
    }

    /// 多段文本（标题、摘要、正文）按顺序拼接后建立索引，位置连续编号
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Self {
        let joined = parts
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self::from_text(&joined)
    }

    /// 不同词元的数量
    pub fn len(&self) -> usize {
        self.lexemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }

    pub fn contains(&self, lexeme: &str) -> bool {
        self.lexemes.contains_key(lexeme)
    }

    pub fn positions(&self, lexeme: &str) -> Option<&[u32]> {
        self.lexemes.get(lexeme).map(Vec::as_slice)
    }

    pub fn lexemes(&self) -> impl Iterator<Item = &str> {
        self.lexemes.keys().map(String::as_str)
    }
}

/// 自然语言查询：分词、词干化后的去重词元
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    lexemes: Vec<String>,
    mode: MatchMode,
}

impl TextQuery {
    pub fn parse(text: &str, mode: MatchMode) -> Self {
        let mut lexemes: Vec<String> = tokenize(text).into_iter().map(|t| t.lexeme).collect();
        lexemes.sort();
        lexemes.dedup();
        Self { lexemes, mode }
    }

    /// 查询全部由停用词或符号组成时为空
    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }

    pub fn lexemes(&self) -> &[String] {
        &self.lexemes
    }

    /// 计算查询与索引向量的匹配得分，没有匹配时为0
    ///
    /// 每个命中词元按出现位置做 1/n² 衰减累加，再除以查询词元数；
    /// `MatchMode::All` 下任一词元缺失即得0分。
    pub fn rank(&self, vector: &SearchVector) -> f64 {
        if self.lexemes.is_empty() || vector.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        let mut matched = 0usize;

        for lexeme in &self.lexemes {
            match vector.positions(lexeme) {
                Some(positions) if !positions.is_empty() => {
                    matched += 1;
                    total += positional_weight(positions.len());
                }
                _ if self.mode == MatchMode::All => return 0.0,
                _ => {}
            }
        }

        if matched == 0 {
            return 0.0;
        }
        total / self.lexemes.len() as f64
    }
}

fn positional_weight(occurrences: usize) -> f64 {
    let decayed: f64 = (1..=occurrences).map(|n| 1.0 / (n * n) as f64).sum();
    LEXEME_WEIGHT * decayed / ZETA_2
}
