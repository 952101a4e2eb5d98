// ==========================================
// 生产排程优化系统 - 引擎层
// ==========================================
// 职责: 实现排程业务规则, 不拼 SQL
// 红线: 单轮内的游标是局部变量, 不引入环境共享状态
// ==========================================

pub mod optimizer;
pub mod scoring;
pub mod sorter;
pub mod strategy;

// 重导出核心引擎
pub use optimizer::{
    CreateScheduleCommand, OptimizeCommand, OptimizeOutcome, OptimizerConfig, ScheduleOptimizer,
};
pub use scoring::{optimization_score, OptimizeFlags, BASE_SCORE};
pub use sorter::{PassItem, WorkOrderSorter};
pub use strategy::{compute_end, duration_from_hours, start_rule, StrategyContext};
