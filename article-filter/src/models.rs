use std::collections::BTreeSet;

use article_search::{highlight_title, Candidate, RelevanceSignals, SearchVector, TrigramSet};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utils_common::{plain_text, Article, ArticleId, Category, CategoryId, SnapshotMetadata, Tag, TagId};

use crate::error::Stage;

/// 带预计算检索数据的文章
///
/// 全文向量覆盖标题、摘要和正文纯文本；三元组取自去除变音符号后的标题。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndexedArticle {
    pub article: Article,
    /// 有序去重
    pub tag_ids: Vec<TagId>,
    pub vector: SearchVector,
    pub title_trigrams: TrigramSet,
}

impl IndexedArticle {
    pub fn new(article: Article, tag_ids: impl IntoIterator<Item = TagId>) -> Self {
        let tag_ids: BTreeSet<TagId> = tag_ids.into_iter().collect();
        let body = plain_text(&article.content);
        let vector = SearchVector::from_parts([
            article.title.as_str(),
            article.summary.as_deref().unwrap_or_default(),
            body.as_str(),
        ]);
        let title_trigrams = TrigramSet::from_text(&utils_common::normalize(&article.title));

        Self {
            article,
            tag_ids: tag_ids.into_iter().collect(),
            vector,
            title_trigrams,
        }
    }

    pub fn id(&self) -> ArticleId {
        self.article.id
    }

    pub fn candidate(&self) -> Candidate<'_> {
        Candidate {
            id: self.article.id,
            date: self.article.date,
            category_id: self.article.category_id,
            tag_ids: &self.tag_ids,
            vector: &self.vector,
            title_trigrams: &self.title_trigrams,
        }
    }

    /// 正文纯文本，相似文章推荐用它作为查询
    pub fn body_text(&self) -> String {
        plain_text(&self.article.content)
    }
}

/// 检索快照：分类、标签和全部已索引文章
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArticleSnapshot {
    pub metadata: SnapshotMetadata,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub articles: Vec<IndexedArticle>,
}

/// 一次搜索请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// 搜索词，可以为空
    pub term: String,
    /// `None` 表示不筛选分类
    pub category: Option<CategoryId>,
    /// 空集表示不筛选标签
    pub tags: BTreeSet<TagId>,
    /// 从1开始，小于等于0时按1处理
    pub page: i64,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            page: 1,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }
}

/// Web层传入的请求参数 `{term, category, tags, page}`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SearchParams {
    pub term: String,
    /// 0 表示不筛选
    pub category: CategoryId,
    pub tags: Vec<TagId>,
    #[serde(deserialize_with = "lenient_page")]
    pub page: i64,
}

impl SearchParams {
    pub fn into_request(self) -> SearchRequest {
        SearchRequest {
            term: self.term,
            category: (self.category != 0).then_some(self.category),
            tags: self.tags.into_iter().collect(),
            page: self.page,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage {
    Number(i64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// 页码接受数字或数字字符串，无法解析时按第1页处理
fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match RawPage::deserialize(deserializer)? {
        RawPage::Number(page) => page,
        RawPage::Text(text) => text.trim().parse().unwrap_or(1),
        RawPage::Other(_) => 1,
    })
}

/// 一行排序结果
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub article: Article,
    pub tag_match_count: u32,
    pub text_rank: f64,
    pub fuzzy_score: f64,
    /// 同一次查询的每一行都相同
    pub total_matching_rows: u64,
}

impl RankedResult {
    pub fn new(article: Article, signals: RelevanceSignals, total_matching_rows: u64) -> Self {
        Self {
            article,
            tag_match_count: signals.tag_match_count,
            text_rank: signals.text_rank,
            fuzzy_score: signals.fuzzy_score,
            total_matching_rows,
        }
    }
}

/// 一页搜索结果及分页前的匹配总数
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<RankedResult>,
    pub total_matching_rows: u64,
}

/// 返回给Web层的单篇结果视图
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedArticleView {
    pub id: ArticleId,
    pub title: String,
    pub highlighted_title: String,
    pub image: Option<String>,
    pub date: NaiveDate,
    pub summary: Option<String>,
    pub category_id: Option<CategoryId>,
    pub tag_match_count: u32,
    pub text_rank: f64,
    pub fuzzy_score: f64,
}

impl RankedArticleView {
    pub fn new(result: RankedResult, term: &str) -> Self {
        let RankedResult {
            article,
            tag_match_count,
            text_rank,
            fuzzy_score,
            ..
        } = result;

        Self {
            id: article.id,
            highlighted_title: highlight_title(&article.title, term),
            title: article.title,
            image: article.image,
            date: article.date,
            summary: article.summary,
            category_id: article.category_id,
            tag_match_count,
            text_rank,
            fuzzy_score,
        }
    }
}

/// 返回给Web层的响应 `{articles, pages}`
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub articles: Vec<RankedArticleView>,
    pub pages: u64,
}

/// 某一项侧栏读取失败的记录
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionFailure {
    pub stage: Stage,
    pub message: String,
}

/// 侧栏：全部分类、全部标签和最新文章
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SidePanel {
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub recent: Vec<Article>,
    /// 只在容错模式下出现
    pub failures: Vec<SectionFailure>,
}

impl SidePanel {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 上一篇、下一篇的链接
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleLink {
    pub id: ArticleId,
    pub title: String,
    pub date: NaiveDate,
}

impl From<&Article> for ArticleLink {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            date: article.date,
        }
    }
}

/// 文章详情页数据
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    pub article: Article,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    /// 按 (日期, ID) 排在前面的一篇，没有时为 `None`
    pub previous: Option<ArticleLink>,
    pub next: Option<ArticleLink>,
}
