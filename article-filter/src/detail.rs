use chrono::NaiveDate;
use tracing::instrument;
use utils_common::{ArticleId, Category};

use crate::error::{SearchError, Stage};
use crate::models::{ArticleDetail, ArticleLink};
use crate::store::ArticleStore;

/// 读取文章详情，以及按 (日期, ID) 相邻的上一篇和下一篇
#[instrument(skip(store))]
pub fn article_detail<S: ArticleStore>(store: &S, id: ArticleId) -> Result<ArticleDetail, SearchError> {
    let indexed = store
        .find_article(id)
        .map_err(|source| SearchError::query(Stage::ArticleLookup, source))?
        .ok_or(SearchError::NotFound { id })?;
    let article = indexed.into_owned();
    let position = (article.article.date, article.article.id);

    let category = match article.article.category_id {
        Some(category_id) => store
            .categories()
            .map_err(|source| SearchError::query(Stage::Categories, source))?
            .into_iter()
            .find(|category: &Category| category.id == category_id),
        None => None,
    };

    let tags = if article.tag_ids.is_empty() {
        Vec::new()
    } else {
        store
            .tags()
            .map_err(|source| SearchError::query(Stage::Tags, source))?
            .into_iter()
            .filter(|tag| article.tag_ids.binary_search(&tag.id).is_ok())
            .collect()
    };

    let rows = store
        .scan_articles()
        .map_err(|source| SearchError::query(Stage::ArticleScan, source))?;

    let mut previous: Option<((NaiveDate, ArticleId), ArticleLink)> = None;
    let mut next: Option<((NaiveDate, ArticleId), ArticleLink)> = None;
    for (rows_read, row) in rows.enumerate() {
        let other = row.map_err(|source| SearchError::ScanFailure {
            stage: Stage::ArticleScan,
            partial_total: 0,
            rows_read,
            source,
        })?;
        let key = (other.article.date, other.article.id);

        if key < position && previous.as_ref().map_or(true, |(best, _)| key > *best) {
            previous = Some((key, ArticleLink::from(&other.article)));
        } else if key > position && next.as_ref().map_or(true, |(best, _)| key < *best) {
            next = Some((key, ArticleLink::from(&other.article)));
        }
    }

    Ok(ArticleDetail {
        article: article.article,
        category,
        tags,
        previous: previous.map(|(_, link)| link),
        next: next.map(|(_, link)| link),
    })
}
