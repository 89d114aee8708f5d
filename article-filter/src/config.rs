use std::fs;
use std::path::{Path, PathBuf};

use article_search::{TagFilterMode, DEFAULT_FUZZY_THRESHOLD, SHARED_TAG_WEIGHT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认每页文章数
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// 默认推荐的相似文章数
pub const DEFAULT_SIMILAR_LIMIT: usize = 3;

/// 侧栏默认展示的最新文章数
pub const DEFAULT_RECENT_LIMIT: usize = 3;

/// 侧栏某一项读取失败时的处理方式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SidePanelPolicy {
    /// 遇到第一个错误即返回
    #[default]
    FailFast,
    /// 返回读取成功的部分，并记录失败项
    Partial,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("配置格式错误: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("配置项 {field} 无效: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 检索配置，JSON中缺省的字段取默认值
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub page_size: u32,
    pub fuzzy_threshold: f64,
    pub similar_limit: usize,
    pub shared_tag_weight: f64,
    pub recent_limit: usize,
    pub tag_filter: TagFilterMode,
    pub side_panel: SidePanelPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            similar_limit: DEFAULT_SIMILAR_LIMIT,
            shared_tag_weight: SHARED_TAG_WEIGHT,
            recent_limit: DEFAULT_RECENT_LIMIT,
            tag_filter: TagFilterMode::default(),
            side_panel: SidePanelPolicy::default(),
        }
    }
}

impl SearchConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "pageSize",
                reason: "必须大于0".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::Invalid {
                field: "fuzzyThreshold",
                reason: format!("{} 不在 [0, 1) 范围内", self.fuzzy_threshold),
            });
        }
        if !self.shared_tag_weight.is_finite() || self.shared_tag_weight < 0.0 {
            return Err(ConfigError::Invalid {
                field: "sharedTagWeight",
                reason: format!("{} 必须是非负数", self.shared_tag_weight),
            });
        }
        Ok(())
    }
}
