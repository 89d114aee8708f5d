use std::borrow::Cow;
use std::cmp::Reverse;

use tracing::{instrument, warn};
use utils_common::{Article, ArticleId};

use crate::config::{SearchConfig, SidePanelPolicy};
use crate::error::{SearchError, Stage};
use crate::models::{IndexedArticle, SectionFailure, SidePanel};
use crate::store::ArticleStore;

/// 侧栏数据读取：分类、标签、最新文章三项相互独立
pub struct SidePanelReader<S> {
    store: S,
    recent_limit: usize,
    policy: SidePanelPolicy,
}

impl<S: ArticleStore> SidePanelReader<S> {
    pub fn new(store: S, config: &SearchConfig) -> Self {
        Self {
            store,
            recent_limit: config.recent_limit,
            policy: config.side_panel,
        }
    }

    #[instrument(skip(self), fields(policy = ?self.policy))]
    pub fn side_panel(&self) -> Result<SidePanel, SearchError> {
        let mut panel = SidePanel::default();

        match self.store.categories() {
            Ok(categories) => panel.categories = categories,
            Err(source) => self.absorb(&mut panel, SearchError::query(Stage::Categories, source))?,
        }

        match self.store.tags() {
            Ok(tags) => panel.tags = tags,
            Err(source) => self.absorb(&mut panel, SearchError::query(Stage::Tags, source))?,
        }

        match self.recent_articles() {
            Ok(recent) => panel.recent = recent,
            Err(err) => self.absorb(&mut panel, err)?,
        }

        Ok(panel)
    }

    /// 按发布日期降序（同日按ID降序）取最新的文章
    pub fn recent_articles(&self) -> Result<Vec<Article>, SearchError> {
        let rows = self
            .store
            .scan_articles()
            .map_err(|source| SearchError::query(Stage::RecentArticles, source))?;

        let mut recent: Vec<Cow<'_, IndexedArticle>> = Vec::new();
        for (rows_read, row) in rows.enumerate() {
            let indexed = row.map_err(|source| SearchError::ScanFailure {
                stage: Stage::RecentArticles,
                partial_total: rows_read as u64,
                rows_read,
                source,
            })?;
            recent.push(indexed);
        }

        recent.sort_by_key(|indexed| Reverse(recency(&indexed.article)));
        recent.truncate(self.recent_limit);
        Ok(recent.into_iter().map(|indexed| indexed.into_owned().article).collect())
    }

    /// 快速失败模式下直接返回错误，容错模式下记录后继续
    fn absorb(&self, panel: &mut SidePanel, err: SearchError) -> Result<(), SearchError> {
        match self.policy {
            SidePanelPolicy::FailFast => Err(err),
            SidePanelPolicy::Partial => {
                warn!(error = %err, "侧栏部分读取失败");
                if let Some(stage) = err.stage() {
                    panel.failures.push(SectionFailure {
                        stage,
                        message: err.to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

fn recency(article: &Article) -> (chrono::NaiveDate, ArticleId) {
    (article.date, article.id)
}
