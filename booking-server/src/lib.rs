//! Booking Server - 餐厅预约空席与冲突控制引擎
//!
//! # 架构概述
//!
//! - **座位登记** (`registry`): 餐厅的座位与总容量
//! - **预约账本** (`ledger`): 预约记录、状态机、按时段统计已占容量
//! - **空席判定** (`availability`): 营业状态 → 过去时段 → 定休日 → 营业时间 → 容量
//! - **事务协调** (`booking`): 时段锁内的 "检查 + 写入"，保证不超卖
//! - **认证** (`auth`): JWT + Argon2，按角色授予权限
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── accounts/      # 账号注册与登录
//! ├── storage/       # redb 存储层
//! ├── restaurants/   # 餐厅资料与审核
//! ├── registry/      # 座位与容量
//! ├── ledger/        # 预约账本
//! ├── availability/  # 空席判定
//! ├── booking/       # 时段锁与事务协调
//! ├── payments/      # 在线支付
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod accounts;
pub mod api;
pub mod auth;
pub mod availability;
pub mod booking;
pub mod core;
pub mod ledger;
pub mod payments;
pub mod registry;
pub mod restaurants;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use booking::{BookingCoordinator, BookingError, BookingResult};
pub use core::{Config, Server, ServerState};
pub use storage::BookingStorage;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 .env 并初始化日志
///
/// 返回加载后的配置
pub fn setup_environment() -> Config {
    if let Err(e) = dotenv::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env: {}", e);
    }

    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.log_dir.as_deref(),
    );
    config
}

pub fn print_banner() {
    println!(
        r#"
    ____              __   _
   / __ )____  ____  / /__(_)___  ____ _
  / __  / __ \/ __ \/ //_/ / __ \/ __ `/
 / /_/ / /_/ / /_/ / ,< / / / / / /_/ /
/_____/\____/\____/_/|_/_/_/ /_/\__, /
                               /____/
    "#
    );
}
