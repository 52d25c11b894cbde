//! 统一错误处理
//!
//! 应用级错误类型统一来自 `shared::error`：
//! - [`AppError`] - 带错误码的应用错误，实现 `IntoResponse`
//! - [`ApiResponse`] - 错误响应结构 `{code, message, details}`
//!
//! 各领域错误 (`StorageError`, `BookingError`, `JwtError`) 在 API 边界
//! 通过 `From` 转换为 [`AppError`]。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Restaurant 42"))
//!
//! // 带详情的错误
//! Err(AppError::new(ErrorCode::InsufficientCapacity).with_detail("remaining", 2))
//! ```

pub use shared::error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
