use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use utils_common::{ArticleId, Category, CodecError, SnapshotMetadata, Tag};

use crate::builder::{load_snapshot, BuildError};
use crate::models::{ArticleSnapshot, IndexedArticle};

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("存储不可用: {0}")]
    Unavailable(String),
    #[error("第 {row} 行解码失败: {reason}")]
    RowDecode { row: usize, reason: String },
    #[error("快照读取失败: {0}")]
    Codec(#[from] CodecError),
}

/// 一次扫描返回的行，每一行都可能单独解码失败
pub type ArticleRows<'a> = Box<dyn Iterator<Item = Result<Cow<'a, IndexedArticle>, StoreError>> + 'a>;

/// 检索核心依赖的只读存储接口，构造时注入
///
/// `scan_articles` 本身失败表示查询无法执行；迭代过程中某行返回 `Err`
/// 表示扫描中断，调用方应停止消费后续行。
pub trait ArticleStore {
    fn scan_articles(&self) -> Result<ArticleRows<'_>, StoreError>;

    fn find_article(&self, id: ArticleId) -> Result<Option<Cow<'_, IndexedArticle>>, StoreError>;

    fn categories(&self) -> Result<Vec<Category>, StoreError>;

    fn tags(&self) -> Result<Vec<Tag>, StoreError>;

    /// 去除变音符号，存储与查询两侧使用同一实现
    fn normalize_text(&self, text: &str) -> String {
        utils_common::normalize(text)
    }
}

impl<T: ArticleStore + ?Sized> ArticleStore for &T {
    fn scan_articles(&self) -> Result<ArticleRows<'_>, StoreError> {
        (**self).scan_articles()
    }

    fn find_article(&self, id: ArticleId) -> Result<Option<Cow<'_, IndexedArticle>>, StoreError> {
        (**self).find_article(id)
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        (**self).categories()
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        (**self).tags()
    }

    fn normalize_text(&self, text: &str) -> String {
        (**self).normalize_text(text)
    }
}

impl<T: ArticleStore + ?Sized> ArticleStore for Arc<T> {
    fn scan_articles(&self) -> Result<ArticleRows<'_>, StoreError> {
        (**self).scan_articles()
    }

    fn find_article(&self, id: ArticleId) -> Result<Option<Cow<'_, IndexedArticle>>, StoreError> {
        (**self).find_article(id)
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        (**self).categories()
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        (**self).tags()
    }

    fn normalize_text(&self, text: &str) -> String {
        (**self).normalize_text(text)
    }
}

/// 基于快照的内存存储，加载后只读
#[derive(Debug, Clone)]
pub struct MemoryStore {
    snapshot: ArticleSnapshot,
    positions: HashMap<ArticleId, usize>,
}

impl MemoryStore {
    pub fn new(snapshot: ArticleSnapshot) -> Self {
        let positions = snapshot
            .articles
            .iter()
            .enumerate()
            .map(|(i, indexed)| (indexed.article.id, i))
            .collect();

        Self { snapshot, positions }
    }

    /// 从压缩快照数据创建存储
    pub fn from_compressed(data: &[u8]) -> Result<Self, StoreError> {
        let snapshot: ArticleSnapshot = utils_common::from_compressed(data)?;
        info!(
            articles = snapshot.articles.len(),
            categories = snapshot.categories.len(),
            tags = snapshot.tags.len(),
            "快照已加载"
        );
        Ok(Self::new(snapshot))
    }

    /// 从快照文件创建存储
    pub fn open(path: &Path) -> Result<Self, BuildError> {
        Ok(Self::new(load_snapshot(path)?))
    }

    pub fn snapshot(&self) -> &ArticleSnapshot {
        &self.snapshot
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.snapshot.metadata
    }

    pub fn len(&self) -> usize {
        self.snapshot.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.articles.is_empty()
    }
}

impl ArticleStore for MemoryStore {
    fn scan_articles(&self) -> Result<ArticleRows<'_>, StoreError> {
        Ok(Box::new(self.snapshot.articles.iter().map(|indexed| Ok(Cow::Borrowed(indexed)))))
    }

    fn find_article(&self, id: ArticleId) -> Result<Option<Cow<'_, IndexedArticle>>, StoreError> {
        Ok(self
            .positions
            .get(&id)
            .map(|&i| Cow::Borrowed(&self.snapshot.articles[i])))
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.snapshot.categories.clone())
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        Ok(self.snapshot.tags.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SnapshotBuilder;
    use utils_common::Article;

    fn article(id: ArticleId, title: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            image: None,
            date: "2024-01-01".parse().unwrap(),
            summary: None,
            category_id: None,
            content: String::new(),
            author_id: 1,
        }
    }

    fn store() -> MemoryStore {
        let mut builder = SnapshotBuilder::new();
        builder.add_category(Category { id: 1, name: "咖啡".into() });
        builder.add_tag(Tag { id: 7, name: "手冲".into() });
        builder.add_article(article(1, "First"), [7]);
        builder.add_article(article(2, "Second"), []);
        MemoryStore::new(builder.build().unwrap())
    }

    #[test]
    fn scan_yields_borrowed_rows_in_snapshot_order() {
        let store = store();
        let ids: Vec<ArticleId> = store
            .scan_articles()
            .unwrap()
            .map(|row| row.unwrap().article.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn find_article_by_id() {
        let store = store();
        assert_eq!(store.find_article(2).unwrap().unwrap().article.title, "Second");
        assert!(store.find_article(99).unwrap().is_none());
    }

    #[test]
    fn shared_handles_delegate() {
        let store = Arc::new(store());
        let by_ref = &store;
        assert_eq!(by_ref.categories().unwrap().len(), 1);
        assert_eq!(store.tags().unwrap()[0].id, 7);
        assert_eq!(by_ref.normalize_text("Crème"), "Creme");
    }

    #[test]
    fn compressed_snapshot_round_trips() {
        let store = store();
        let data = utils_common::to_compressed(store.snapshot(), utils_common::compression::CURRENT_VERSION).unwrap();
        let loaded = MemoryStore::from_compressed(&data).unwrap();
        assert_eq!(loaded.snapshot(), store.snapshot());
        assert!(matches!(
            MemoryStore::from_compressed(b"nope").unwrap_err(),
            StoreError::Codec(_)
        ));
    }
}
