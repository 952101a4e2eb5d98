// ==========================================
// 生产排程优化系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod schedule_repo;
pub mod work_order_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use schedule_repo::ProductionScheduleRepository;
pub use work_order_repo::WorkOrderRepository;

use chrono::{DateTime, TimeZone, Utc};

/// 解析 RFC3339 时间戳 (非法值回落到 Unix 纪元)
pub(crate) fn parse_utc(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap())
}

/// 解析可空 RFC3339 时间戳
pub(crate) fn parse_utc_opt(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.map(|s| parse_utc(&s))
}
