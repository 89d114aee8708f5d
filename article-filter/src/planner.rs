use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use article_search::{RankingKey, RelevanceScorer, RelevanceSignals, SearchContext};
use tracing::{debug, instrument, warn};
use utils_common::{CategoryId, TagId};

use crate::config::SearchConfig;
use crate::error::{SearchError, Stage};
use crate::models::{IndexedArticle, RankedResult, SearchPage, SearchRequest};
use crate::pagination::{PageWindow, RunningCount};
use crate::store::ArticleStore;

/// 一个通过筛选的候选行
struct Ranked<'a> {
    key: RankingKey,
    signals: RelevanceSignals,
    indexed: Cow<'a, IndexedArticle>,
}

fn by_rank(a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
    a.key.ranking_order(&b.key)
}

/// 查询规划器：筛选、排序、分页，并在同一次扫描中统计匹配总数
pub struct QueryPlanner<S> {
    store: S,
    scorer: RelevanceScorer,
    page_size: u32,
}

impl<S: ArticleStore> QueryPlanner<S> {
    pub fn new(store: S, config: &SearchConfig) -> Self {
        Self {
            store,
            scorer: RelevanceScorer::new(config.fuzzy_threshold, config.tag_filter),
            page_size: config.page_size.max(1),
        }
    }

    /// 按页码搜索
    #[instrument(skip(self, request), fields(term = %request.term, page = request.page))]
    pub fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        let window = PageWindow::for_page(request.page, self.page_size);
        self.search_window(&request.term, request.category, &request.tags, window)
    }

    /// 按任意窗口搜索
    ///
    /// 匹配总数在分页前统计。扫描中途某行失败时返回 `ScanFailure`，
    /// 其中带有失败前累计的匹配数，不返回任何结果行。
    pub fn search_window(
        &self,
        term: &str,
        category: Option<CategoryId>,
        tags: &BTreeSet<TagId>,
        window: PageWindow,
    ) -> Result<SearchPage, SearchError> {
        let normalized = self.store.normalize_text(term);
        let ctx = SearchContext::new(&normalized, category, tags);

        let rows = self
            .store
            .scan_articles()
            .map_err(|source| SearchError::query(Stage::ArticleScan, source))?;

        let mut count = RunningCount::default();
        let mut ranked: Vec<Ranked<'_>> = Vec::new();

        for row in rows {
            let indexed = match row {
                Ok(indexed) => indexed,
                Err(source) => {
                    warn!(
                        rows_read = count.rows_read(),
                        partial_total = count.matching(),
                        error = %source,
                        "文章扫描中断"
                    );
                    return Err(SearchError::ScanFailure {
                        stage: Stage::ArticleScan,
                        partial_total: count.matching(),
                        rows_read: count.rows_read(),
                        source,
                    });
                }
            };
            count.record_row();

            let candidate = indexed.candidate();
            if let Some(signals) = self.scorer.evaluate(&ctx, &candidate) {
                count.record_match();
                let key = candidate.ranking_key(&signals);
                ranked.push(Ranked { key, signals, indexed });
            }
        }

        // 只对窗口及之前的部分做完整排序
        let end = window.end();
        if end < ranked.len() {
            ranked.select_nth_unstable_by(end, by_rank);
            ranked.truncate(end);
        }
        ranked.sort_by(by_rank);

        let total = count.matching();
        let results: Vec<RankedResult> = window
            .apply(ranked)
            .into_iter()
            .map(|r| RankedResult::new(r.indexed.into_owned().article, r.signals, total))
            .collect();

        debug!(
            term = ctx.term(),
            rows_read = count.rows_read(),
            total_matching_rows = total,
            returned = results.len(),
            "搜索完成"
        );

        Ok(SearchPage {
            results,
            total_matching_rows: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SnapshotBuilder;
    use crate::store::MemoryStore;
    use utils_common::{Article, ArticleId};

    fn article(id: ArticleId, title: &str, date: &str, category_id: Option<CategoryId>) -> Article {
        Article {
            id,
            title: title.to_string(),
            image: None,
            date: date.parse().unwrap(),
            summary: None,
            category_id,
            content: String::new(),
            author_id: 1,
        }
    }

    fn planner(articles: Vec<(Article, Vec<TagId>)>) -> QueryPlanner<MemoryStore> {
        let mut builder = SnapshotBuilder::new();
        builder.add_category(utils_common::Category { id: 1, name: "a".into() });
        builder.add_category(utils_common::Category { id: 2, name: "b".into() });
        for id in 1..=3 {
            builder.add_tag(utils_common::Tag { id, name: format!("t{id}") });
        }
        for (article, tags) in articles {
            builder.add_article(article, tags);
        }
        QueryPlanner::new(MemoryStore::new(builder.build().unwrap()), &SearchConfig::default())
    }

    fn ids(page: &SearchPage) -> Vec<ArticleId> {
        page.results.iter().map(|r| r.article.id).collect()
    }

    #[test]
    fn empty_request_returns_everything_newest_first() {
        let planner = planner(vec![
            (article(1, "One", "2024-01-01", Some(1)), vec![]),
            (article(2, "Two", "2024-03-01", None), vec![]),
            (article(3, "Three", "2024-02-01", Some(2)), vec![]),
        ]);

        let page = planner.search(&SearchRequest::new("")).unwrap();
        assert_eq!(ids(&page), vec![2, 3, 1]);
        assert_eq!(page.total_matching_rows, 3);
        assert!(page.results.iter().all(|r| r.total_matching_rows == 3));
    }

    #[test]
    fn same_date_ties_break_by_id() {
        let planner = planner(vec![
            (article(1, "A", "2024-01-01", None), vec![]),
            (article(2, "B", "2024-01-01", None), vec![]),
        ]);

        let page = planner.search(&SearchRequest::new("")).unwrap();
        assert_eq!(ids(&page), vec![2, 1]);
    }

    #[test]
    fn category_filter_is_exact() {
        let planner = planner(vec![
            (article(1, "One", "2024-01-01", Some(1)), vec![]),
            (article(2, "Two", "2024-03-01", Some(2)), vec![]),
        ]);

        let page = planner.search(&SearchRequest::new("").with_category(2)).unwrap();
        assert_eq!(ids(&page), vec![2]);
        assert_eq!(page.total_matching_rows, 1);
    }

    #[test]
    fn text_match_outranks_recency() {
        let planner = planner(vec![
            (article(1, "Espresso extraction", "2023-01-01", None), vec![]),
            (article(2, "Tea ceremonies", "2024-06-01", None), vec![]),
            (article(3, "Espresso and milk espresso", "2022-01-01", None), vec![]),
        ]);

        let page = planner.search(&SearchRequest::new("espresso")).unwrap();
        assert_eq!(page.total_matching_rows, 2);
        assert_eq!(ids(&page), vec![3, 1]);
        assert!(page.results[0].text_rank > page.results[1].text_rank);
    }

    #[test]
    fn count_is_taken_before_the_window() {
        let articles = (1..=30)
            .map(|id| (article(id, &format!("Post {id}"), "2024-01-01", None), vec![]))
            .collect();
        let planner = planner(articles);

        let page = planner.search(&SearchRequest::new("").with_page(3)).unwrap();
        assert_eq!(page.total_matching_rows, 30);
        assert_eq!(ids(&page), (1..=6).rev().collect::<Vec<_>>());

        let beyond = planner.search(&SearchRequest::new("").with_page(9)).unwrap();
        assert!(beyond.results.is_empty());
        assert_eq!(beyond.total_matching_rows, 30);
    }
}
