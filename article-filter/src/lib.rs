//! 文章检索核心：按分类、标签、搜索词筛选并排序分页，相似文章推荐，侧栏与详情读取。
//!
//! 所有组件都通过 [`ArticleStore`] 读取数据，构造时注入，不使用全局状态。

pub mod builder;
pub mod config;
pub mod detail;
pub mod error;
pub mod models;
pub mod pagination;
pub mod planner;
pub mod recommend;
pub mod sidebar;
pub mod store;

pub use article_search::TagFilterMode;
pub use builder::{load_snapshot, save_snapshot, BuildError, SnapshotBuilder, SNAPSHOT_FILE};
pub use config::{ConfigError, SearchConfig, SidePanelPolicy, DEFAULT_PAGE_SIZE};
pub use detail::article_detail;
pub use error::{SearchError, Stage};
pub use models::{
    ArticleDetail, ArticleLink, ArticleSnapshot, IndexedArticle, RankedArticleView, RankedResult, SearchPage,
    SearchParams, SearchRequest, SearchResponse, SectionFailure, SidePanel,
};
pub use pagination::{page_count, PageWindow};
pub use planner::QueryPlanner;
pub use recommend::{SimilarArticle, SimilarityRecommender};
pub use sidebar::SidePanelReader;
pub use store::{ArticleRows, ArticleStore, MemoryStore, StoreError};

use tracing::instrument;
use utils_common::{Article, ArticleId};

/// 对外的检索入口，持有存储和配置，每次调用相互独立
#[derive(Debug, Clone)]
pub struct ArticleFilter<S> {
    store: S,
    config: SearchConfig,
}

impl<S: ArticleStore> ArticleFilter<S> {
    pub fn new(store: S, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            config: SearchConfig::default(),
        }
    }

    fn planner(&self) -> QueryPlanner<&S> {
        QueryPlanner::new(&self.store, &self.config)
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        self.planner().search(request)
    }

    pub fn search_window(&self, request: &SearchRequest, window: PageWindow) -> Result<SearchPage, SearchError> {
        self.planner()
            .search_window(&request.term, request.category, &request.tags, window)
    }

    /// Web层请求到响应视图的完整流程
    #[instrument(skip(self, params), fields(term = %params.term))]
    pub fn respond(&self, params: SearchParams) -> Result<SearchResponse, SearchError> {
        let request = params.into_request();
        let page = self.search(&request)?;
        let pages = page_count(page.total_matching_rows, self.config.page_size);

        Ok(SearchResponse {
            articles: page
                .results
                .into_iter()
                .map(|result| RankedArticleView::new(result, &request.term))
                .collect(),
            pages,
        })
    }

    pub fn similar_articles(&self, article_id: ArticleId) -> Result<Vec<Article>, SearchError> {
        SimilarityRecommender::new(&self.store, &self.config).similar_articles(article_id)
    }

    pub fn ranked_similar(&self, article_id: ArticleId) -> Result<Vec<SimilarArticle>, SearchError> {
        SimilarityRecommender::new(&self.store, &self.config).ranked_similar(article_id)
    }

    pub fn side_panel(&self) -> Result<SidePanel, SearchError> {
        SidePanelReader::new(&self.store, &self.config).side_panel()
    }

    pub fn article_detail(&self, article_id: ArticleId) -> Result<ArticleDetail, SearchError> {
        article_detail(&self.store, article_id)
    }
}
