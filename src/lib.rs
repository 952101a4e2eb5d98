// ==========================================
// 生产排程优化系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 多租户业务管理应用的生产排程子系统
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Priority, ScheduleAlgorithm, WorkOrderStatus};

// 领域实体
pub use domain::{
    CapacityAssessment, ProductionSchedule, ResourceRequirement, ScheduleConstraint, WorkOrder,
};

// 引擎
pub use engine::{
    OptimizeCommand, OptimizeFlags, OptimizeOutcome, OptimizerConfig, ScheduleOptimizer,
    WorkOrderSorter,
};

// API
pub use api::{CreateScheduleRequest, OptimizeRequest, OptimizeResponse, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产排程优化系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
