use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use utils_common::compression::{to_compressed, CURRENT_VERSION};
use utils_common::{Article, ArticleId, ArticleTag, Category, CodecError, SnapshotMetadata, Tag, TagId};

use crate::models::{ArticleSnapshot, IndexedArticle};

/// 快照文件名
pub const SNAPSHOT_FILE: &str = "articles.bin";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("重复的文章ID: {0}")]
    DuplicateArticle(ArticleId),
    #[error("重复的分类ID: {0}")]
    DuplicateCategory(i64),
    #[error("重复的标签ID: {0}")]
    DuplicateTag(TagId),
    #[error("文章 {article_id} 引用了不存在的标签 {tag_id}")]
    UnknownTag { article_id: ArticleId, tag_id: TagId },
    #[error("文章 {article_id} 引用了不存在的分类 {category_id}")]
    UnknownCategory { article_id: ArticleId, category_id: i64 },
    #[error("标签关联指向不存在的文章 {0}")]
    UnknownArticle(ArticleId),
    #[error("快照编解码失败: {0}")]
    Codec(#[from] CodecError),
    #[error("读写快照文件 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 检索快照构建器
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    categories: Vec<Category>,
    tags: Vec<Tag>,
    articles: Vec<Article>,
    links: Vec<ArticleTag>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// 添加文章及其标签
    pub fn add_article(&mut self, article: Article, tag_ids: impl IntoIterator<Item = TagId>) {
        let article_id = article.id;
        self.links
            .extend(tag_ids.into_iter().map(|tag_id| ArticleTag { article_id, tag_id }));
        self.articles.push(article);
    }

    /// 单独添加文章与标签的关联
    pub fn add_link(&mut self, link: ArticleTag) {
        self.links.push(link);
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// 校验引用关系并为每篇文章建立全文向量和标题三元组
    pub fn build(&self) -> Result<ArticleSnapshot, BuildError> {
        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id) {
                return Err(BuildError::DuplicateCategory(category.id));
            }
        }

        let mut tag_ids = HashSet::new();
        for tag in &self.tags {
            if !tag_ids.insert(tag.id) {
                return Err(BuildError::DuplicateTag(tag.id));
            }
        }

        let mut article_tags: HashMap<ArticleId, BTreeSet<TagId>> = HashMap::new();
        for article in &self.articles {
            if article_tags.insert(article.id, BTreeSet::new()).is_some() {
                return Err(BuildError::DuplicateArticle(article.id));
            }
            if let Some(category_id) = article.category_id {
                if !category_ids.contains(&category_id) {
                    return Err(BuildError::UnknownCategory {
                        article_id: article.id,
                        category_id,
                    });
                }
            }
        }

        for link in &self.links {
            if !tag_ids.contains(&link.tag_id) {
                return Err(BuildError::UnknownTag {
                    article_id: link.article_id,
                    tag_id: link.tag_id,
                });
            }
            article_tags
                .get_mut(&link.article_id)
                .ok_or(BuildError::UnknownArticle(link.article_id))?
                .insert(link.tag_id);
        }

        info!(articles = self.articles.len(), "开始构建检索快照");

        let articles: Vec<IndexedArticle> = self
            .articles
            .iter()
            .map(|article| {
                let tags = article_tags.remove(&article.id).unwrap_or_default();
                IndexedArticle::new(article.clone(), tags)
            })
            .collect();

        let lexeme_count = articles
            .iter()
            .flat_map(|indexed| indexed.vector.lexemes())
            .collect::<HashSet<&str>>()
            .len();

        let metadata = SnapshotMetadata {
            article_count: articles.len(),
            category_count: self.categories.len(),
            tag_count: self.tags.len(),
            lexeme_count,
            created_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        info!(
            articles = metadata.article_count,
            categories = metadata.category_count,
            tags = metadata.tag_count,
            lexemes = metadata.lexeme_count,
            "检索快照构建完成"
        );

        Ok(ArticleSnapshot {
            metadata,
            categories: self.categories.clone(),
            tags: self.tags.clone(),
            articles,
        })
    }

    /// 构建快照并写入文件
    pub fn save(&self, path: &Path) -> Result<ArticleSnapshot, BuildError> {
        let snapshot = self.build()?;
        save_snapshot(&snapshot, path)?;
        Ok(snapshot)
    }
}

/// 写入快照文件，返回写入的字节数
pub fn save_snapshot(snapshot: &ArticleSnapshot, path: &Path) -> Result<usize, BuildError> {
    let data = to_compressed(snapshot, CURRENT_VERSION)?;
    fs::write(path, &data).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), bytes = data.len(), "快照已写入");
    Ok(data.len())
}

/// 读取快照文件
pub fn load_snapshot(path: &Path) -> Result<ArticleSnapshot, BuildError> {
    let data = fs::read(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: ArticleSnapshot = utils_common::from_compressed(&data)?;

    info!(
        path = %path.display(),
        articles = snapshot.metadata.article_count,
        "快照已读取"
    );
    Ok(snapshot)
}
