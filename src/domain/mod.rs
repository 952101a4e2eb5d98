// ==========================================
// 生产排程优化系统 - 领域层
// ==========================================
// 职责: 实体与类型定义, 纯领域计算
// 红线: 领域层不访问数据库
// ==========================================

pub mod capacity;
pub mod schedule;
pub mod types;
pub mod work_order;

// 重导出核心类型
pub use capacity::{assess, CapacityAssessment};
pub use schedule::{ProductionSchedule, ResourceRequirement, ScheduleConstraint};
pub use types::{Priority, ScheduleAlgorithm, WorkOrderStatus};
pub use work_order::{WorkOrder, DEFAULT_ESTIMATED_HOURS};
