//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ApiResponse`] - API 响应结构 (from shared::error)
//! - 日志、业务时钟、输入校验、分页参数

pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod types;
pub mod validation;

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
pub use result::AppResult;
pub use time::{BusinessClock, Clock, FixedClock, SystemClock};
pub use types::PaginationParams;
