// ==========================================
// 生产排程优化系统 - 优化分值计算
// ==========================================
// 职责: 诊断性分值, 概括单次落位应用了哪些排程考量
// 红线: 分值不回馈同一轮的排序 (可解释性指标, 非调度输入)
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::{Priority, ScheduleAlgorithm};

/// 基础分
pub const BASE_SCORE: i32 = 50;

// ==========================================
// OptimizeFlags - 批量优化的考量开关
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptimizeFlags {
    pub consider_capacity: bool,     // 考虑产能
    pub consider_priority: bool,     // 考虑优先级
    pub consider_dependencies: bool, // 考虑依赖
}

impl Default for OptimizeFlags {
    fn default() -> Self {
        Self {
            consider_capacity: true,
            consider_priority: true,
            consider_dependencies: true,
        }
    }
}

/// 计算优化分值
///
/// 基础 50 分:
/// - +20 CRITICAL / +10 HIGH
/// - +15 算法为 PRIORITY 且考虑优先级
/// - +10 考虑产能
/// - +5  考虑依赖
///
/// 自然上限 100, 无需截断
pub fn optimization_score(
    priority: Priority,
    algorithm: ScheduleAlgorithm,
    flags: &OptimizeFlags,
) -> i32 {
    let mut score = BASE_SCORE;

    score += match priority {
        Priority::Critical => 20,
        Priority::High => 10,
        _ => 0,
    };

    if algorithm == ScheduleAlgorithm::Priority && flags.consider_priority {
        score += 15;
    }
    if flags.consider_capacity {
        score += 10;
    }
    if flags.consider_dependencies {
        score += 5;
    }

    score
}
