use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::trace;
use utils_common::{ArticleId, CategoryId, TagId};

use crate::models::{MatchMode, RankingKey, RelevanceSignals, TagFilterMode};
use crate::trigram::TrigramSet;
use crate::vector::{SearchVector, TextQuery};

/// 模糊匹配的默认阈值，严格大于该值才算命中
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.2;

/// 一次搜索的上下文，整次查询只构建一次
#[derive(Debug, Clone)]
pub struct SearchContext {
    term: String,
    query: TextQuery,
    term_trigrams: TrigramSet,
    category: Option<CategoryId>,
    tags: BTreeSet<TagId>,
}

impl SearchContext {
    /// `normalized_term` 应已去除变音符号；分类为 `None` 表示不筛选分类
    pub fn new(normalized_term: &str, category: Option<CategoryId>, tags: &BTreeSet<TagId>) -> Self {
        let term = normalized_term.trim().to_string();
        let query = TextQuery::parse(&term, MatchMode::All);
        let term_trigrams = TrigramSet::from_text(&term);
        trace!(
            term = %term,
            lexemes = query.lexemes().len(),
            trigrams = term_trigrams.len(),
            ?category,
            tags = tags.len(),
            "构建搜索上下文"
        );

        Self {
            query,
            term_trigrams,
            term,
            category,
            tags: tags.clone(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// 搜索词为空时不做文本筛选
    pub fn has_term(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn has_tag_filter(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn category(&self) -> Option<CategoryId> {
        self.category
    }

    pub fn tags(&self) -> &BTreeSet<TagId> {
        &self.tags
    }
}

/// 参与评分的一篇候选文章（借用存储层的数据）
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub id: ArticleId,
    pub date: NaiveDate,
    pub category_id: Option<CategoryId>,
    pub tag_ids: &'a [TagId],
    pub vector: &'a SearchVector,
    pub title_trigrams: &'a TrigramSet,
}

impl Candidate<'_> {
    pub fn ranking_key(&self, signals: &RelevanceSignals) -> RankingKey {
        RankingKey::new(signals, self.date, self.id)
    }
}

/// 相关性评分器：计算三项信号并判断候选文章是否进入结果
#[derive(Debug, Clone, Copy)]
pub struct RelevanceScorer {
    fuzzy_threshold: f64,
    tag_filter: TagFilterMode,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD, TagFilterMode::default())
    }
}

impl RelevanceScorer {
    pub fn new(fuzzy_threshold: f64, tag_filter: TagFilterMode) -> Self {
        Self {
            fuzzy_threshold,
            tag_filter,
        }
    }

    /// 计算标签命中数、全文得分、模糊得分
    pub fn signals(&self, ctx: &SearchContext, candidate: &Candidate<'_>) -> RelevanceSignals {
        let tag_match_count = if ctx.has_tag_filter() {
            tag_overlap(&ctx.tags, candidate.tag_ids)
        } else {
            0
        };

        let (text_rank, fuzzy_score) = if ctx.has_term() {
            (
                ctx.query.rank(candidate.vector),
                ctx.term_trigrams.similarity(candidate.title_trigrams),
            )
        } else {
            (0.0, 0.0)
        };

        RelevanceSignals {
            tag_match_count,
            text_rank,
            fuzzy_score,
        }
    }

    /// 判断候选文章是否满足筛选条件
    ///
    /// 分类未筛选或一致；标签筛选在 `Restrict` 模式下至少命中一个；
    /// 搜索词为空，或全文得分大于0，或模糊得分超过阈值。
    pub fn qualifies(&self, ctx: &SearchContext, candidate: &Candidate<'_>, signals: &RelevanceSignals) -> bool {
        if let Some(category) = ctx.category {
            if candidate.category_id != Some(category) {
                return false;
            }
        }

        if ctx.has_tag_filter() && self.tag_filter == TagFilterMode::Restrict && signals.tag_match_count == 0 {
            return false;
        }

        !ctx.has_term() || signals.text_rank > 0.0 || signals.fuzzy_score > self.fuzzy_threshold
    }

    /// 满足筛选条件时返回信号
    pub fn evaluate(&self, ctx: &SearchContext, candidate: &Candidate<'_>) -> Option<RelevanceSignals> {
        let signals = self.signals(ctx, candidate);
        self.qualifies(ctx, candidate, &signals).then_some(signals)
    }
}

/// 有序去重的标签列表与标签集合的交集大小
pub fn tag_overlap(filter: &BTreeSet<TagId>, tag_ids: &[TagId]) -> u32 {
    let count = tag_ids.iter().filter(|id| filter.contains(id)).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
