use std::collections::BTreeSet;

use chrono::NaiveDate;
use utils_common::{ArticleId, TagId};

use crate::models::{MatchMode, SimilarityScore};
use crate::scorer::tag_overlap;
use crate::vector::{SearchVector, TextQuery};

/// 每个共有标签折算成的全文得分，标签一致比词汇重合更重要
pub const SHARED_TAG_WEIGHT: f64 = 2.0;

/// 以一篇源文章为基准，为其他文章计算相似度
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    source_id: ArticleId,
    source_tags: BTreeSet<TagId>,
    query: TextQuery,
    tag_weight: f64,
}

impl SimilarityScorer {
    /// `source_body` 是源文章正文的纯文本，整体作为自然语言查询
    pub fn new(source_id: ArticleId, source_tags: &[TagId], source_body: &str, tag_weight: f64) -> Self {
        Self {
            source_id,
            source_tags: source_tags.iter().copied().collect(),
            query: TextQuery::parse(source_body, MatchMode::Any),
            tag_weight,
        }
    }

    pub fn source_id(&self) -> ArticleId {
        self.source_id
    }

    pub fn score(&self, tag_ids: &[TagId], vector: &SearchVector) -> SimilarityScore {
        let shared_tags = tag_overlap(&self.source_tags, tag_ids);
        let text_rank = self.query.rank(vector);

        SimilarityScore {
            shared_tags,
            text_rank,
            combined: f64::from(shared_tags) * self.tag_weight + text_rank,
        }
    }
}

/// 一篇已评分的相似文章候选
#[derive(Debug, Clone)]
pub struct SimilarCandidate<T> {
    pub id: ArticleId,
    pub date: NaiveDate,
    pub score: SimilarityScore,
    pub item: T,
}

/// 按总分降序、发布日期降序（再按ID降序）取前 `limit` 篇，总分为0的不推荐
pub fn top_similar<T>(mut candidates: Vec<SimilarCandidate<T>>, limit: usize) -> Vec<SimilarCandidate<T>> {
    candidates.retain(|c| c.score.combined > 0.0);
    candidates.sort_by(|a, b| {
        b.score
            .combined
            .total_cmp(&a.score.combined)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| b.id.cmp(&a.id))
    });
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: ArticleId, date: &str, combined: f64) -> SimilarCandidate<ArticleId> {
        SimilarCandidate {
            id,
            date: date.parse().unwrap(),
            score: SimilarityScore {
                shared_tags: 0,
                text_rank: combined,
                combined,
            },
            item: id,
        }
    }

    #[test]
    fn shared_tags_weigh_two_units_each() {
        let scorer = SimilarityScorer::new(1, &[1, 2, 3], "", SHARED_TAG_WEIGHT);
        let score = scorer.score(&[2, 3, 4], &SearchVector::default());

        assert_eq!(score.shared_tags, 2);
        assert_eq!(score.text_rank, 0.0);
        assert_eq!(score.combined, 4.0);
    }

    #[test]
    fn body_text_contributes_rank() {
        let scorer = SimilarityScorer::new(1, &[], "Dialing in espresso grind size", SHARED_TAG_WEIGHT);
        let related = SearchVector::from_text("Espresso grind guide");
        let unrelated = SearchVector::from_text("Kubernetes operators");

        assert!(scorer.score(&[], &related).combined > 0.0);
        assert_eq!(scorer.score(&[], &unrelated).combined, 0.0);
    }

    #[test]
    fn top_similar_orders_and_truncates() {
        let picked = top_similar(
            vec![
                candidate(1, "2024-01-01", 0.5),
                candidate(2, "2024-03-01", 2.0),
                candidate(3, "2024-02-01", 2.0),
                candidate(4, "2024-05-01", 0.0),
                candidate(5, "2024-04-01", 0.1),
            ],
            3,
        );

        let ids: Vec<ArticleId> = picked.iter().map(|c| c.item).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
