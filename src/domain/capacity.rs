// ==========================================
// 生产排程优化系统 - 产能评估模型
// ==========================================
// 红线: 纯计算, 无副作用, 无失败路径
// 用途: 利用率推导与 CAPACITY_BASED 延期判定
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CapacityAssessment - 产能评估结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityAssessment {
    pub utilization_rate: Option<f64>, // 利用率 (%), 任一参数缺失时为 None
    pub must_defer: bool,              // 需求超过可用时必须延期
}

impl CapacityAssessment {
    /// 空评估 (无产能参数)
    pub fn empty() -> Self {
        Self {
            utilization_rate: None,
            must_defer: false,
        }
    }
}

/// 评估产能占用
///
/// # 参数
/// - `required`: 需求产能
/// - `available`: 可用产能 (与需求同单位)
///
/// # 返回
/// - 任一参数缺失: `utilization_rate=None`, `must_defer=false`
/// - 否则: `utilization_rate = required/available*100`,
///   `must_defer = required > available`
pub fn assess(required: Option<f64>, available: Option<f64>) -> CapacityAssessment {
    match (required, available) {
        (Some(required), Some(available)) => CapacityAssessment {
            utilization_rate: Some(required / available * 100.0),
            must_defer: required > available,
        },
        _ => CapacityAssessment::empty(),
    }
}
