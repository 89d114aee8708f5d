use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utils_common::ArticleId;

/// 全文查询的匹配方式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    /// 所有词元都要出现（搜索框输入）
    All,
    /// 任一词元出现即可（以整篇正文作为查询时）
    Any,
}

/// 标签筛选条件生效时的处理方式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TagFilterMode {
    /// 至少命中一个标签才进入结果
    #[default]
    Restrict,
    /// 不命中的文章仍保留，只是排在后面
    Boost,
}

/// 单篇文章针对一次搜索的三项相关性信号
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceSignals {
    /// 文章标签与筛选标签的交集大小，未筛选标签时为0
    pub tag_match_count: u32,
    /// 词干化全文匹配得分，非负
    pub text_rank: f64,
    /// 标题与搜索词的三元组相似度，范围 [0, 1]
    pub fuzzy_score: f64,
}

/// 搜索结果的排序键
///
/// 依次比较标签命中数、全文得分、模糊得分、发布日期，
/// 最后用文章ID保证严格全序，翻页时不会重复或遗漏。
#[derive(Debug, Clone, Copy)]
pub struct RankingKey {
    pub tag_match_count: u32,
    pub text_rank: f64,
    pub fuzzy_score: f64,
    pub date: NaiveDate,
    pub id: ArticleId,
}

impl RankingKey {
    pub fn new(signals: &RelevanceSignals, date: NaiveDate, id: ArticleId) -> Self {
        Self {
            tag_match_count: signals.tag_match_count,
            text_rank: signals.text_rank,
            fuzzy_score: signals.fuzzy_score,
            date,
            id,
        }
    }

    /// 排名顺序：得分高的排在前面
    pub fn ranking_order(&self, other: &Self) -> Ordering {
        other.cmp(self)
    }
}

impl Ord for RankingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tag_match_count
            .cmp(&other.tag_match_count)
            .then_with(|| self.text_rank.total_cmp(&other.text_rank))
            .then_with(|| self.fuzzy_score.total_cmp(&other.fuzzy_score))
            .then_with(|| self.date.cmp(&other.date))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for RankingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankingKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankingKey {}

/// 相似文章评分
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityScore {
    /// 与源文章共有的标签数
    pub shared_tags: u32,
    /// 以源文章正文为查询的全文得分
    pub text_rank: f64,
    /// 加权总分：共有标签数 × 标签权重 + 全文得分
    pub combined: f64,
}
