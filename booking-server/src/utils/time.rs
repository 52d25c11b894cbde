//! 时间工具函数: 业务时钟与业务时区
//!
//! 预约的日期/时间都是餐厅所在业务时区的本地时间 (`NaiveDate` + `NaiveTime`)。
//! 所有 "现在" 的判断 (过去时段、取消截止、完成时间) 统一通过 [`BusinessClock`]，
//! 测试中替换为 [`FixedClock`] 即可得到确定性结果。

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

use super::{AppError, AppResult};

/// Source of the current instant
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock reading `local` in UTC
    pub fn at(local: NaiveDateTime) -> Self {
        Self::new(local.and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Clock bound to the business timezone
#[derive(Debug, Clone)]
pub struct BusinessClock {
    clock: Arc<dyn Clock>,
    tz: Tz,
}

impl BusinessClock {
    pub fn new(clock: Arc<dyn Clock>, tz: Tz) -> Self {
        Self { clock, tz }
    }

    pub fn system(tz: Tz) -> Self {
        Self::new(Arc::new(SystemClock), tz)
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Local wall-clock time in the business timezone
    pub fn local_now(&self) -> NaiveDateTime {
        self.clock.now().with_timezone(&self.tz).naive_local()
    }

    /// Unix millis, used for `created_at` / `updated_at`
    pub fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析 IANA 时区名，失败返回错误
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::validation(format!("Unknown timezone: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = Arc::new(FixedClock::at(local(2025, 1, 15, 12, 0)));
        let business = BusinessClock::new(clock.clone(), chrono_tz::UTC);
        assert_eq!(business.local_now(), local(2025, 1, 15, 12, 0));

        clock.advance(Duration::hours(7));
        assert_eq!(business.local_now(), local(2025, 1, 15, 19, 0));
    }

    #[test]
    fn test_local_now_uses_business_timezone() {
        // 2025-01-15 09:00 UTC == 18:00 in Tokyo
        let clock = Arc::new(FixedClock::at(local(2025, 1, 15, 9, 0)));
        let business = BusinessClock::new(clock, chrono_tz::Asia::Tokyo);
        assert_eq!(business.local_now(), local(2025, 1, 15, 18, 0));
    }

    #[test]
    fn test_parse_helpers() {
        assert!(parse_date("2025-01-15").is_ok());
        assert!(parse_date("15/01/2025").is_err());
        assert_eq!(parse_timezone("Asia/Tokyo").unwrap(), chrono_tz::Asia::Tokyo);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
