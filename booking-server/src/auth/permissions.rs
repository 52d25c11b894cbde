//! Permission Definitions
//!
//! Role-based capabilities. Each role maps to a fixed permission list that is
//! embedded in the token; routers declare the permission they need via
//! [`require_permission`](super::require_permission).
//!
//! ## 设计原则
//! - 公开浏览（餐厅列表、空席查询）无需登录
//! - 顾客：预约、取消自己的预约、在线支付
//! - 店铺：管理自己的餐厅、座位、预约与销售额
//! - 管理员：`all`，包含审核餐厅与平台销售额

use shared::models::UserRole;

/// Customer-side capabilities
pub const RESERVATIONS_CREATE: &str = "reservations:create";
pub const RESERVATIONS_CANCEL: &str = "reservations:cancel";
pub const PAYMENTS_CREATE: &str = "payments:create";

/// Store-side capabilities
pub const RESTAURANTS_MANAGE: &str = "restaurants:manage";
pub const SEATS_MANAGE: &str = "seats:manage";
pub const RESERVATIONS_MANAGE: &str = "reservations:manage";
pub const SALES_VIEW: &str = "sales:view";
pub const PAYMENTS_REFUND: &str = "payments:refund";

pub const DEFAULT_CUSTOMER_PERMISSIONS: &[&str] =
    &[RESERVATIONS_CREATE, RESERVATIONS_CANCEL, PAYMENTS_CREATE];

pub const DEFAULT_STORE_PERMISSIONS: &[&str] = &[
    RESTAURANTS_MANAGE,
    SEATS_MANAGE,
    RESERVATIONS_MANAGE,
    RESERVATIONS_CANCEL,
    SALES_VIEW,
    PAYMENTS_REFUND,
];

pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// Permissions granted to a role
pub fn get_default_permissions(role: UserRole) -> Vec<String> {
    let permissions = match role {
        UserRole::Customer => DEFAULT_CUSTOMER_PERMISSIONS,
        UserRole::Store => DEFAULT_STORE_PERMISSIONS,
        UserRole::Admin => DEFAULT_ADMIN_PERMISSIONS,
    };
    permissions.iter().map(|s| s.to_string()).collect()
}
