//! 提交引擎
//!
//! 保证每个 (作业, 学生) 至多一条提交，按截止时间判定状态，
//! 并记录作业文件的访问地址。

pub mod submit;

use std::sync::Arc;

use crate::config::CoreSettings;
use crate::storage::{ArtifactStore, Storage};

/// 作业文件在存储中的分类目录
pub const ARTIFACT_CATEGORY: &str = "assignment_submissions";

pub struct SubmissionEngine {
    storage: Arc<dyn Storage>,
    artifacts: Arc<dyn ArtifactStore>,
    base_url: String,
}

impl SubmissionEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        artifacts: Arc<dyn ArtifactStore>,
        settings: &CoreSettings,
    ) -> Self {
        Self {
            storage,
            artifacts,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 由存储路径得到对外地址
    pub fn artifact_url(&self, relative_path: &str) -> String {
        format!("{}/static/{}", self.base_url, relative_path)
    }
}
