use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use article_filter::SnapshotBuilder;
use utils_common::{Article, ArticleId, AuthorId, Category, CategoryId, Tag, TagId};

/// 分类列表文件名
pub const CATEGORIES_FILE: &str = "categories.json";
/// 标签列表文件名
pub const TAGS_FILE: &str = "tags.json";

/// 后台导出的文章记录，正文保持编辑器的JSON结构
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ArticleExport {
    id: ArticleId,
    title: String,
    #[serde(default)]
    image: Option<String>,
    date: NaiveDate,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    category_id: Option<CategoryId>,
    #[serde(default)]
    content: Value,
    author_id: AuthorId,
    #[serde(default)]
    tags: Vec<TagId>,
}

impl ArticleExport {
    fn into_parts(self) -> (Article, Vec<TagId>) {
        let content = match self.content {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => other.to_string(),
        };

        let article = Article {
            id: self.id,
            title: self.title,
            image: self.image,
            date: self.date,
            summary: self.summary,
            category_id: self.category_id,
            content,
            author_id: self.author_id,
        };
        (article, self.tags)
    }
}

/// 一个文章文件可以是单篇文章，也可以是文章数组
#[derive(Deserialize)]
#[serde(untagged)]
enum ExportFile {
    Many(Vec<ArticleExport>),
    One(ArticleExport),
}

/// 扫描导出目录，返回填充好的快照构建器和跳过的文件数
pub fn load_source_dir(source: &Path) -> Result<(SnapshotBuilder, usize)> {
    let mut builder = SnapshotBuilder::new();

    for category in read_json::<Vec<Category>>(&source.join(CATEGORIES_FILE))? {
        builder.add_category(category);
    }
    for tag in read_json::<Vec<Tag>>(&source.join(TAGS_FILE))? {
        builder.add_tag(tag);
    }

    let mut skipped = 0;
    for entry in WalkDir::new(source).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if matches!(
            path.file_name().and_then(|name| name.to_str()),
            Some(CATEGORIES_FILE) | Some(TAGS_FILE)
        ) {
            continue;
        }

        match read_json::<ExportFile>(path) {
            Ok(ExportFile::Many(articles)) => {
                debug!(path = %path.display(), count = articles.len(), "读取文章数组");
                for export in articles {
                    let (article, tags) = export.into_parts();
                    builder.add_article(article, tags);
                }
            }
            Ok(ExportFile::One(export)) => {
                let (article, tags) = export.into_parts();
                builder.add_article(article, tags);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "跳过无法解析的文件");
                skipped += 1;
            }
        }
    }

    info!(articles = builder.article_count(), skipped, "导出目录扫描完成");
    Ok((builder, skipped))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("无法读取文件 {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("无法解析文件 {}", path.display()))
}
