use std::path::PathBuf;
use std::sync::Arc;

use crate::accounts::AccountService;
use crate::auth::JwtService;
use crate::availability::AvailabilityEngine;
use crate::booking::{BookingCoordinator, LockTable};
use crate::core::{Config, Result, ServerError};
use crate::ledger::ReservationLedger;
use crate::payments::{LocalPaymentGateway, PaymentGateway, PaymentService};
use crate::registry::SeatRegistry;
use crate::restaurants::RestaurantDirectory;
use crate::storage::BookingStorage;
use crate::utils::BusinessClock;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 所有字段都是 `Clone` 的浅拷贝 (内部 Arc)，可以直接作为 axum 的 State。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | BookingStorage | 嵌入式数据库 (redb) |
/// | directory | RestaurantDirectory | 餐厅资料与审核状态 |
/// | registry | SeatRegistry | 座位与容量 |
/// | ledger | ReservationLedger | 预约账本 |
/// | engine | AvailabilityEngine | 空席判定 |
/// | coordinator | Arc<BookingCoordinator> | 预约事务协调 (时段锁) |
/// | accounts | AccountService | 账号与登录 |
/// | payments | PaymentService | 在线支付 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | clock | BusinessClock | 业务时钟 |
///
/// 餐厅锁表由 directory / registry / coordinator 共享，
/// 预约持共享锁，餐厅与座位变更持独占锁。
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库
    pub storage: BookingStorage,
    pub directory: RestaurantDirectory,
    pub registry: SeatRegistry,
    pub ledger: ReservationLedger,
    pub engine: AvailabilityEngine,
    pub coordinator: Arc<BookingCoordinator>,
    pub accounts: AccountService,
    pub payments: PaymentService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 业务时钟 (业务时区)
    pub clock: BusinessClock,
}

impl ServerState {
    /// 由已打开的存储组装全部服务
    ///
    /// 测试中可以传入内存存储与 [`FixedClock`](crate::utils::FixedClock)。
    pub fn from_parts(
        config: Config,
        storage: BookingStorage,
        clock: BusinessClock,
        jwt_service: Arc<JwtService>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let lock_timeout = config.lock_timeout();
        let restaurant_locks = Arc::new(LockTable::new("restaurant", lock_timeout));

        let ledger = ReservationLedger::new(storage.clone(), clock.clone());
        let directory =
            RestaurantDirectory::new(storage.clone(), restaurant_locks.clone(), clock.clone());
        let registry = SeatRegistry::new(
            storage.clone(),
            ledger.clone(),
            restaurant_locks.clone(),
            clock.clone(),
        );
        let engine = AvailabilityEngine::new(
            directory.clone(),
            registry.clone(),
            ledger.clone(),
            clock.clone(),
        );
        let coordinator = Arc::new(BookingCoordinator::new(
            directory.clone(),
            engine.clone(),
            ledger.clone(),
            clock.clone(),
            restaurant_locks,
            lock_timeout,
        ));
        let accounts = AccountService::new(storage.clone(), clock.clone());
        let payments = PaymentService::new(ledger.clone(), coordinator.clone(), gateway);

        Self {
            config,
            storage,
            directory,
            registry,
            ledger,
            engine,
            coordinator,
            accounts,
            payments,
            jwt_service,
            clock,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/booking.redb)
    /// 3. 各服务 (Directory, Registry, Ledger, Engine, Coordinator, Accounts, Payments, JWT)
    /// 4. 引导管理员账号 (ADMIN_EMAIL / ADMIN_PASSWORD)
    pub async fn initialize(config: &Config) -> Result<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(ServerError::WorkDir)?;

        let db_path = config.database_path();
        let storage = BookingStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database opened");

        let clock = BusinessClock::system(config.business_timezone);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let state = Self::from_parts(
            config.clone(),
            storage,
            clock,
            jwt_service,
            Arc::new(LocalPaymentGateway::new(
                config.payment_webhook_secret.as_bytes(),
            )),
        );

        if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
            state
                .accounts
                .ensure_admin(email, password)
                .map_err(|e| ServerError::Bootstrap(format!("admin account: {}", e)))?;
        }

        Ok(state)
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
