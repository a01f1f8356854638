pub mod assignments;
pub mod classes;
pub mod common;
pub mod principals;
pub mod subjects;
pub mod submissions;

pub use common::error_code::ErrorCode;
pub use common::response::ApiResponse;
