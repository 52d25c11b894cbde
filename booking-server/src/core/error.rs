use thiserror::Error;

use crate::storage::StorageError;

/// 进程级错误 (启动、监听、关闭)
///
/// 请求级错误统一使用 [`shared::error::AppError`]。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("工作目录初始化失败: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("初始化失败: {0}")]
    Bootstrap(String),

    #[error("监听失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("服务任务异常退出: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
