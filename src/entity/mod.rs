//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行读写，然后转换为 models 中的业务实体。
//! 时间统一以秒级 Unix 时间戳存储。

use chrono::{DateTime, Utc};

pub mod prelude;

pub mod admins;
pub mod assignments;
pub mod classes;
pub mod students;
pub mod subjects;
pub mod submissions;
pub mod teachers;

pub(crate) fn from_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
