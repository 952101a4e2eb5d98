// ==========================================
// 生产排程优化系统 - 领域类型定义
// ==========================================
// 职责: 工单优先级/状态与排程算法的类型安全定义
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工单优先级 (Work Order Priority)
// ==========================================
// 顺序: Low < Normal < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,      // 低
    Normal,   // 正常
    High,     // 高
    Critical, // 紧急
}

impl Priority {
    /// 优先级分值 (priority_score 排序字段的来源)
    ///
    /// CRITICAL=100, HIGH=75, 其余=50
    pub fn score(&self) -> i32 {
        match self {
            Priority::Critical => 100,
            Priority::High => 75,
            _ => 50,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Normal => write!(f, "NORMAL"),
            Priority::High => write!(f, "HIGH"),
            Priority::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "NORMAL" => Ok(Priority::Normal),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            other => Err(format!("未知优先级: {}", other)),
        }
    }
}

// ==========================================
// 工单状态 (Work Order Status)
// ==========================================
// 优化器仅消费 PENDING / SCHEDULED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    Pending,    // 待排程
    Scheduled,  // 已排程
    InProgress, // 生产中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "PENDING",
            WorkOrderStatus::Scheduled => "SCHEDULED",
            WorkOrderStatus::InProgress => "IN_PROGRESS",
            WorkOrderStatus::Completed => "COMPLETED",
            WorkOrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(WorkOrderStatus::Pending),
            "SCHEDULED" => Ok(WorkOrderStatus::Scheduled),
            "IN_PROGRESS" => Ok(WorkOrderStatus::InProgress),
            "COMPLETED" => Ok(WorkOrderStatus::Completed),
            "CANCELLED" => Ok(WorkOrderStatus::Cancelled),
            other => Err(format!("未知工单状态: {}", other)),
        }
    }
}

// ==========================================
// 排程算法 (Schedule Algorithm)
// ==========================================
// 用途:
// - 批量优化的策略化入口 (请求级覆盖, 或逐单继承既有排程的算法);
// - CRITICAL_RATIO / RESOURCE_LEVELING 为保留名, 无独立规则,
//   落位到默认规则 (start=cursor, 时长保持)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleAlgorithm {
    Fifo,
    Lifo,
    Priority,
    EarliestDue,
    ShortestJob,
    CapacityBased,
    CriticalRatio,
    ResourceLeveling,
}

impl ScheduleAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleAlgorithm::Fifo => "FIFO",
            ScheduleAlgorithm::Lifo => "LIFO",
            ScheduleAlgorithm::Priority => "PRIORITY",
            ScheduleAlgorithm::EarliestDue => "EARLIEST_DUE",
            ScheduleAlgorithm::ShortestJob => "SHORTEST_JOB",
            ScheduleAlgorithm::CapacityBased => "CAPACITY_BASED",
            ScheduleAlgorithm::CriticalRatio => "CRITICAL_RATIO",
            ScheduleAlgorithm::ResourceLeveling => "RESOURCE_LEVELING",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            ScheduleAlgorithm::Fifo => "先进先出",
            ScheduleAlgorithm::Lifo => "后进先出",
            ScheduleAlgorithm::Priority => "优先级优先",
            ScheduleAlgorithm::EarliestDue => "最早交期",
            ScheduleAlgorithm::ShortestJob => "最短工时",
            ScheduleAlgorithm::CapacityBased => "产能约束",
            ScheduleAlgorithm::CriticalRatio => "紧迫比率",
            ScheduleAlgorithm::ResourceLeveling => "资源平衡",
        }
    }

    /// 是否携带独立的排序预处理 (整体重排待排集合)
    pub fn has_presort(&self) -> bool {
        matches!(
            self,
            ScheduleAlgorithm::Fifo
                | ScheduleAlgorithm::Lifo
                | ScheduleAlgorithm::EarliestDue
                | ScheduleAlgorithm::ShortestJob
        )
    }
}

impl Default for ScheduleAlgorithm {
    fn default() -> Self {
        ScheduleAlgorithm::Priority
    }
}

impl fmt::Display for ScheduleAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScheduleAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FIFO" => Ok(ScheduleAlgorithm::Fifo),
            "LIFO" => Ok(ScheduleAlgorithm::Lifo),
            "PRIORITY" => Ok(ScheduleAlgorithm::Priority),
            "EARLIEST_DUE" | "EARLIEST-DUE" => Ok(ScheduleAlgorithm::EarliestDue),
            "SHORTEST_JOB" | "SHORTEST-JOB" => Ok(ScheduleAlgorithm::ShortestJob),
            "CAPACITY_BASED" | "CAPACITY-BASED" => Ok(ScheduleAlgorithm::CapacityBased),
            "CRITICAL_RATIO" | "CRITICAL-RATIO" => Ok(ScheduleAlgorithm::CriticalRatio),
            "RESOURCE_LEVELING" | "RESOURCE-LEVELING" => Ok(ScheduleAlgorithm::ResourceLeveling),
            other => Err(format!("未知排程算法: {}", other)),
        }
    }
}
