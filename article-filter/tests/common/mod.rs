//! 集成测试共用的数据构造

#![allow(dead_code)]

use std::borrow::Cow;

use article_filter::{ArticleRows, ArticleStore, IndexedArticle, MemoryStore, SnapshotBuilder, StoreError};
use utils_common::{Article, ArticleId, Category, CategoryId, Tag, TagId};

pub fn article(id: ArticleId, title: &str, date: &str) -> Article {
    Article {
        id,
        title: title.to_string(),
        image: None,
        date: date.parse().expect("fixture date"),
        summary: None,
        category_id: None,
        content: String::new(),
        author_id: 1,
    }
}

pub fn article_with_content(id: ArticleId, title: &str, date: &str, content: &str) -> Article {
    Article {
        content: content.to_string(),
        ..article(id, title, date)
    }
}

/// 测试数据集，分类1..=3和标签1..=5总是存在
pub struct Dataset {
    builder: SnapshotBuilder,
}

impl Dataset {
    pub fn new() -> Self {
        let mut builder = SnapshotBuilder::new();
        for (id, name) in [(1, "Brewing"), (2, "Gear"), (3, "Travel")] {
            builder.add_category(Category { id, name: name.into() });
        }
        for (id, name) in [(1, "espresso"), (2, "pour-over"), (3, "milk"), (4, "grinder"), (5, "roasting")] {
            builder.add_tag(Tag { id, name: name.into() });
        }
        Self { builder }
    }

    pub fn with(mut self, article: Article, tags: &[TagId]) -> Self {
        self.builder.add_article(article, tags.iter().copied());
        self
    }

    pub fn with_in(self, mut article: Article, category: CategoryId, tags: &[TagId]) -> Self {
        article.category_id = Some(category);
        self.with(article, tags)
    }

    pub fn store(&self) -> MemoryStore {
        MemoryStore::new(self.builder.build().expect("fixture snapshot"))
    }
}

/// 多个场景共用的小型博客
pub fn coffee_blog() -> MemoryStore {
    Dataset::new()
        .with_in(
            Article {
                summary: Some("Dialing in grind size and dose".into()),
                content: r#"{"blocks":[{"type":"paragraph","data":{"text":"Pulling espresso shots needs a fine grind"}}]}"#.into(),
                ..article(1, "Espresso basics", "2024-01-10")
            },
            1,
            &[1, 4],
        )
        .with_in(
            Article {
                content: r#"{"blocks":[{"type":"paragraph","data":{"text":"Steaming milk for latte art"}}]}"#.into(),
                ..article(2, "Latte art at home", "2024-02-01")
            },
            1,
            &[1, 3],
        )
        .with_in(article(3, "Choosing a burr grinder", "2024-03-15"), 2, &[4])
        .with_in(article(4, "Pour-over ratios", "2024-04-02"), 1, &[2])
        .with_in(article(5, "Coffee in Kyoto", "2024-05-20"), 3, &[])
        .with(article(6, "Café crème in Paris", "2024-06-01"), &[])
        .store()
}

/// [`FaultyStore`] 在哪一步读取失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Unreachable,
    RowAt(usize),
    Categories,
    Tags,
}

/// 包装内存存储并注入读取故障
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fault: Fault,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

impl ArticleStore for FaultyStore {
    fn scan_articles(&self) -> Result<ArticleRows<'_>, StoreError> {
        match self.fault {
            Fault::Unreachable => Err(StoreError::Unavailable("connection refused".into())),
            Fault::RowAt(bad) => {
                let rows = self.inner.scan_articles()?.enumerate().map(move |(i, row)| {
                    if i == bad {
                        Err(StoreError::RowDecode {
                            row: i,
                            reason: "invalid date".into(),
                        })
                    } else {
                        row
                    }
                });
                Ok(Box::new(rows))
            }
            _ => self.inner.scan_articles(),
        }
    }

    fn find_article(&self, id: ArticleId) -> Result<Option<Cow<'_, IndexedArticle>>, StoreError> {
        match self.fault {
            Fault::Unreachable => Err(StoreError::Unavailable("connection refused".into())),
            _ => self.inner.find_article(id),
        }
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        match self.fault {
            Fault::Unreachable | Fault::Categories => Err(StoreError::Unavailable("categories".into())),
            _ => self.inner.categories(),
        }
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        match self.fault {
            Fault::Unreachable | Fault::Tags => Err(StoreError::Unavailable("tags".into())),
            _ => self.inner.tags(),
        }
    }
}
