// ==========================================
// 生产排程优化系统 - 工单领域模型
// ==========================================
// 红线: 工单由生产模块拥有, 优化器只读
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Priority, WorkOrderStatus};

/// 估算工时缺省值 (小时)
pub const DEFAULT_ESTIMATED_HOURS: f64 = 8.0;

// ==========================================
// WorkOrder - 生产工单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    // ===== 主键与租户边界 =====
    pub id: String,                 // 工单ID
    pub tenant_id: String,          // 租户ID (隔离边界)

    // ===== 业务字段 (外部模块拥有) =====
    pub order_no: String,           // 工单编号
    pub product_id: Option<String>, // 产品/配方ID (协作方关注, 优化器不读)

    // ===== 排程输入 =====
    pub priority: Priority,              // 优先级
    pub status: WorkOrderStatus,         // 状态
    pub estimated_hours: Option<f64>,    // 估算工时 (缺省 8h)
    pub due_date: Option<DateTime<Utc>>, // 交期

    // ===== 既有排程窗口 (时长保持的依据) =====
    pub scheduled_start: Option<DateTime<Utc>>, // 既有计划开始
    pub scheduled_end: Option<DateTime<Utc>>,   // 既有计划结束

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 创建时间 (FIFO/LIFO 排序与稳定 tie-break 依据)
    pub updated_at: DateTime<Utc>, // 更新时间
}

impl WorkOrder {
    /// 有效估算工时 (小时)
    ///
    /// 缺省或非法值 (<=0 / NaN) 回落到 8 小时
    pub fn effective_hours(&self) -> f64 {
        match self.estimated_hours {
            Some(h) if h.is_finite() && h > 0.0 => h,
            _ => DEFAULT_ESTIMATED_HOURS,
        }
    }

    /// 既有计划时长 (小时)
    ///
    /// 起止齐全且跨度为正时返回声明时长, 否则回落到有效估算工时
    pub fn declared_duration_hours(&self) -> f64 {
        match (self.scheduled_start, self.scheduled_end) {
            (Some(start), Some(end)) if end > start => {
                (end - start).num_seconds() as f64 / 3600.0
            }
            _ => self.effective_hours(),
        }
    }

    /// 是否处于可排程状态 (PENDING / SCHEDULED)
    pub fn is_eligible(&self) -> bool {
        matches!(
            self.status,
            WorkOrderStatus::Pending | WorkOrderStatus::Scheduled
        )
    }
}
