use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 文章ID（单调递增分配）
pub type ArticleId = i64;
/// 分类ID
pub type CategoryId = i64;
/// 标签ID
pub type TagId = i64;
/// 作者ID
pub type AuthorId = i64;

/// 分类 - 每篇文章最多属于一个分类
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// 标签 - 与文章多对多关联
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// 文章与标签的关联记录，增删关联不影响文章本身
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleTag {
    pub article_id: ArticleId,
    pub tag_id: TagId,
}

/// 文章 - 发布后不再修改，检索层只读
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// 文章唯一标识符
    pub id: ArticleId,
    /// 文章标题
    pub title: String,
    /// 封面图片
    #[serde(default)]
    pub image: Option<String>,
    /// 发布日期（不含时间）
    pub date: NaiveDate,
    /// 文章摘要
    #[serde(default)]
    pub summary: Option<String>,
    /// 所属分类，存储层允许为空
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// 富文本内容，原样保存的JSON文本，排序时不解析其结构
    #[serde(default)]
    pub content: String,
    /// 作者
    pub author_id: AuthorId,
}

/// 快照元数据 - 存储快照的基本信息
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// 快照包含的文章数量
    pub article_count: usize,
    /// 分类数量
    pub category_count: usize,
    /// 标签数量
    pub tag_count: usize,
    /// 全文索引中的词元总数（去重）
    pub lexeme_count: usize,
    /// 快照创建时间
    pub created_at: DateTime<Utc>,
    /// 生成快照的程序版本
    pub version: String,
}
