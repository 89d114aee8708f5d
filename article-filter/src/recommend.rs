use article_search::{top_similar, SimilarCandidate, SimilarityScore, SimilarityScorer};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use utils_common::{Article, ArticleId};

use crate::config::SearchConfig;
use crate::error::{SearchError, Stage};
use crate::store::ArticleStore;

/// 一篇推荐文章及其得分
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimilarArticle {
    pub article: Article,
    pub shared_tags: u32,
    pub text_rank: f64,
    pub combined: f64,
}

/// 相似文章推荐：共有标签数 × 权重 + 以源文章正文为查询的全文得分
pub struct SimilarityRecommender<S> {
    store: S,
    limit: usize,
    tag_weight: f64,
}

impl<S: ArticleStore> SimilarityRecommender<S> {
    pub fn new(store: S, config: &SearchConfig) -> Self {
        Self {
            store,
            limit: config.similar_limit,
            tag_weight: config.shared_tag_weight,
        }
    }

    /// 与指定文章最相似的文章，不含其本身
    pub fn similar_articles(&self, article_id: ArticleId) -> Result<Vec<Article>, SearchError> {
        Ok(self
            .ranked_similar(article_id)?
            .into_iter()
            .map(|similar| similar.article)
            .collect())
    }

    /// 同 [`Self::similar_articles`]，附带各项得分
    #[instrument(skip(self))]
    pub fn ranked_similar(&self, article_id: ArticleId) -> Result<Vec<SimilarArticle>, SearchError> {
        let source = self
            .store
            .find_article(article_id)
            .map_err(|source| SearchError::query(Stage::ArticleLookup, source))?
            .ok_or(SearchError::NotFound { id: article_id })?;

        let scorer = SimilarityScorer::new(
            article_id,
            &source.tag_ids,
            &source.body_text(),
            self.tag_weight,
        );

        let rows = self
            .store
            .scan_articles()
            .map_err(|source| SearchError::query(Stage::ArticleScan, source))?;

        let mut rows_read = 0usize;
        let mut candidates = Vec::new();
        for row in rows {
            let indexed = row.map_err(|source| {
                warn!(rows_read, error = %source, "相似文章扫描中断");
                SearchError::ScanFailure {
                    stage: Stage::ArticleScan,
                    partial_total: candidates.len() as u64,
                    rows_read,
                    source,
                }
            })?;
            rows_read += 1;

            if indexed.id() == scorer.source_id() {
                continue;
            }

            let score = scorer.score(&indexed.tag_ids, &indexed.vector);
            candidates.push(SimilarCandidate {
                id: indexed.article.id,
                date: indexed.article.date,
                score,
                item: indexed,
            });
        }

        let picked = top_similar(candidates, self.limit);
        debug!(rows_read, returned = picked.len(), "相似文章计算完成");

        Ok(picked
            .into_iter()
            .map(|candidate| {
                let SimilarityScore {
                    shared_tags,
                    text_rank,
                    combined,
                } = candidate.score;
                SimilarArticle {
                    article: candidate.item.into_owned().article,
                    shared_tags,
                    text_rank,
                    combined,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SnapshotBuilder;
    use crate::store::MemoryStore;
    use utils_common::{Tag, TagId};

    fn article(id: ArticleId, title: &str, date: &str, body: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            image: None,
            date: date.parse().unwrap(),
            summary: None,
            category_id: None,
            content: body.to_string(),
            author_id: 1,
        }
    }

    fn recommender(articles: Vec<(Article, Vec<TagId>)>) -> SimilarityRecommender<MemoryStore> {
        let mut builder = SnapshotBuilder::new();
        for id in 1..=5 {
            builder.add_tag(Tag { id, name: format!("t{id}") });
        }
        for (article, tags) in articles {
            builder.add_article(article, tags);
        }
        SimilarityRecommender::new(MemoryStore::new(builder.build().unwrap()), &SearchConfig::default())
    }

    #[test]
    fn missing_source_is_not_found() {
        let recommender = recommender(vec![]);
        assert!(matches!(
            recommender.similar_articles(42),
            Err(SearchError::NotFound { id: 42 })
        ));
    }

    #[test]
    fn excludes_source_and_unrelated_articles() {
        let recommender = recommender(vec![
            (article(1, "Source", "2024-01-01", "grinding coffee beans"), vec![1]),
            (article(2, "Related", "2024-01-02", "coffee roasting"), vec![]),
            (article(3, "Unrelated", "2024-01-03", "mountain biking"), vec![]),
        ]);

        let ids: Vec<ArticleId> = recommender.similar_articles(1).unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn shared_tags_outweigh_text_and_limit_applies() {
        let recommender = recommender(vec![
            (article(1, "Source", "2024-01-01", "espresso"), vec![1, 2, 3]),
            (article(2, "Two tags", "2024-01-02", ""), vec![1, 2]),
            (article(3, "One tag", "2024-01-05", ""), vec![3]),
            (article(4, "Text only", "2024-01-09", "espresso espresso"), vec![]),
            (article(5, "Three tags", "2023-01-01", ""), vec![1, 2, 3]),
        ]);

        let ranked = recommender.ranked_similar(1).unwrap();
        let ids: Vec<ArticleId> = ranked.iter().map(|s| s.article.id).collect();
        assert_eq!(ids, vec![5, 2, 3]);
        assert_eq!(ranked[0].combined, 6.0);
        assert_eq!(ranked[1].shared_tags, 2);
    }
}
