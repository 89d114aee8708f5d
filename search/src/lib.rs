//! 文章搜索的相关性信号
//!
//! - 词干化全文得分 ([`TextQuery::rank`])
//! - 标题三元组相似度 ([`TrigramSet::similarity`])
//! - 标签命中数与排序键 ([`RelevanceScorer`], [`RankingKey`])
//! - 相似文章评分 ([`SimilarityScorer`])

pub mod highlight;
pub mod models;
pub mod scorer;
pub mod similar;
pub mod tokenizer;
pub mod trigram;
pub mod vector;

pub use highlight::highlight_title;
pub use models::{MatchMode, RankingKey, RelevanceSignals, SimilarityScore, TagFilterMode};
pub use scorer::{Candidate, RelevanceScorer, SearchContext, DEFAULT_FUZZY_THRESHOLD};
pub use similar::{top_similar, SimilarCandidate, SimilarityScorer, SHARED_TAG_WEIGHT};
pub use trigram::TrigramSet;
pub use vector::{SearchVector, TextQuery};
