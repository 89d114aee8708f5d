use std::fmt;

use serde::Serialize;
use thiserror::Error;
use utils_common::ArticleId;

use crate::store::StoreError;

/// 出错时正在执行的读取阶段
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    ArticleScan,
    ArticleLookup,
    Categories,
    Tags,
    RecentArticles,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ArticleScan => "文章扫描",
            Self::ArticleLookup => "文章查找",
            Self::Categories => "分类读取",
            Self::Tags => "标签读取",
            Self::RecentArticles => "最新文章读取",
        };
        f.write_str(name)
    }
}

/// 检索核心对调用方暴露的错误，均不在内部重试
#[derive(Debug, Error)]
pub enum SearchError {
    /// 查询无法执行（存储不可达、筛选条件非法）
    #[error("查询失败（{stage}）: {source}")]
    QueryFailure {
        stage: Stage,
        #[source]
        source: StoreError,
    },
    /// 扫描途中某一行解码失败，扫描中止，只保留已累计的计数
    #[error("扫描中断（{stage}）: 已读取 {rows_read} 行，已计数 {partial_total} 条: {source}")]
    ScanFailure {
        stage: Stage,
        partial_total: u64,
        rows_read: usize,
        #[source]
        source: StoreError,
    },
    /// 单篇文章不存在，调用方应按404处理
    #[error("文章不存在: {id}")]
    NotFound { id: ArticleId },
}

impl SearchError {
    pub fn query(stage: Stage, source: StoreError) -> Self {
        Self::QueryFailure { stage, source }
    }

    /// 失败前已累计的匹配行数
    pub fn partial_total(&self) -> u64 {
        match self {
            Self::ScanFailure { partial_total, .. } => *partial_total,
            Self::QueryFailure { .. } | Self::NotFound { .. } => 0,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::QueryFailure { stage, .. } | Self::ScanFailure { stage, .. } => Some(*stage),
            Self::NotFound { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
