// ==========================================
// 生产排程优化系统 - 排程记录领域模型
// ==========================================
// 红线: 排程记录由优化器全权管理, 与工单 1:1
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::ScheduleAlgorithm;

// ==========================================
// ResourceRequirement - 资源需求标注
// ==========================================
// 用途: 排程的说明性标注, 不参与时间计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub resource_type: String, // 资源类型 (MACHINE/LABOR/MATERIAL...)
    pub quantity: f64,         // 数量
    pub unit: String,          // 单位
}

// ==========================================
// ScheduleConstraint - 排程约束标注
// ==========================================
// 用途: 说明性标注, 不参与时间计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConstraint {
    pub constraint_type: String, // 约束类型
    pub value: String,           // 约束值
}

// ==========================================
// ProductionSchedule - 生产排程记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionSchedule {
    // ===== 主键与关联 =====
    pub id: String,            // 排程ID
    pub work_order_id: String, // 关联工单 (唯一约束: 一单一排程)
    pub tenant_id: String,     // 租户ID

    // ===== 算法与排序分值 =====
    pub algorithm: ScheduleAlgorithm, // 排程算法
    pub priority_score: i32,          // 优先级分值 (CRITICAL=100/HIGH=75/其余=50)

    // ===== 产能参数 =====
    pub required_capacity: Option<f64>,  // 需求产能
    pub available_capacity: Option<f64>, // 可用产能
    pub utilization_rate: Option<f64>,   // 利用率 (%) = required/available*100

    // ===== 标注信息 =====
    pub resources: Vec<ResourceRequirement>,   // 资源需求
    pub constraints: Vec<ScheduleConstraint>,  // 约束标注

    // ===== 调用方声明边界 =====
    pub earliest_start: DateTime<Utc>, // 最早开始
    pub latest_start: DateTime<Utc>,   // 最晚开始

    // ===== 引擎输出 =====
    pub scheduled_start: Option<DateTime<Utc>>, // 计划开始
    pub scheduled_end: Option<DateTime<Utc>>,   // 计划结束
    pub buffer_hours: Option<f64>,              // 缓冲工时 (小时, 追加到计划结束)

    // ===== 优化状态 =====
    pub is_optimized: bool,      // 是否经过批量优化
    pub optimization_score: i32, // 优化分值 (0-100, 诊断用, 不回馈排序)
    pub locked: bool,            // 锁定后不再参与批量优化

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductionSchedule {
    /// 判断是否为草稿 (尚未经过批量优化)
    pub fn is_draft(&self) -> bool {
        !self.is_optimized
    }

    /// 有效缓冲工时 (小时), 非法值按 0 处理
    pub fn effective_buffer_hours(&self) -> f64 {
        match self.buffer_hours {
            Some(b) if b.is_finite() && b > 0.0 => b,
            _ => 0.0,
        }
    }
}
