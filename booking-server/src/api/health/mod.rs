//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 存活检查 + 业务时区 |
//! | /health/detailed | GET | 数据库、锁表、业务时钟 |
//!
//! 两者都是公共路由 (不在 `/api/` 下，require_auth 直接放行)。

use std::sync::OnceLock;
use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::storage::StorageStats;

static STARTED: OnceLock<Instant> = OnceLock::new();

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timezone: &'static str,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    /// healthy | degraded
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    /// 业务时区的当前时间，空席判断 (过去时段) 以此为准
    business_time: String,
    checks: HealthChecks,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<StorageStats>,
}

#[derive(Serialize)]
pub struct HealthChecks {
    database: DatabaseCheck,
    locks: LockCheck,
}

#[derive(Serialize)]
pub struct DatabaseCheck {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// 当前存活的锁条目；空闲时两者都应为 0
#[derive(Serialize)]
pub struct LockCheck {
    restaurant: usize,
    timeslot: usize,
    timeout_ms: u64,
}

fn uptime_seconds() -> u64 {
    STARTED.get_or_init(Instant::now).elapsed().as_secs()
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    STARTED.get_or_init(Instant::now);
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timezone: state.clock.tz().name(),
    })
}

pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let started = Instant::now();
    let (database, stats) = match state.storage.get_stats() {
        Ok(stats) => (
            DatabaseCheck {
                status: "ok",
                latency_ms: Some(started.elapsed().as_millis() as u64),
                error: None,
            },
            Some(stats),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unavailable");
            (
                DatabaseCheck {
                    status: "error",
                    latency_ms: None,
                    error: Some(e.to_string()),
                },
                None,
            )
        }
    };

    let locks = LockCheck {
        restaurant: state.coordinator.active_restaurant_locks(),
        timeslot: state.coordinator.active_slot_locks(),
        timeout_ms: state.coordinator.lock_timeout().as_millis() as u64,
    };

    Json(DetailedHealthResponse {
        status: if database.status == "ok" { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime_seconds(),
        business_time: state.clock.local_now().format("%Y-%m-%d %H:%M").to_string(),
        checks: HealthChecks { database, locks },
        stats,
    })
}
