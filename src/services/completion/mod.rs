//! 完成情况汇总（只读）

pub mod class_view;
pub mod student_view;

use std::sync::Arc;

use crate::storage::Storage;

pub struct CompletionAggregator {
    storage: Arc<dyn Storage>,
}

impl CompletionAggregator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}
