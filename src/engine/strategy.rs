// ==========================================
// 生产排程优化系统 - 算法策略表
// ==========================================
// 用途:
// - 将"算法名 → 起始时间规则"建成函数表, 新增/修正策略
//   不触碰优化器的编排循环;
// - 结束时间规则: SHORTEST_JOB 覆盖为估算工时, 其余保持
//   工单声明时长 (起点平移, 时长不变)。
// 红线: 规则为纯函数, 除传入的 cursor 外无隐藏状态
// ==========================================

use chrono::{DateTime, Duration, Utc};

use crate::domain::capacity::CapacityAssessment;
use crate::domain::types::{Priority, ScheduleAlgorithm};
use crate::domain::work_order::WorkOrder;
use crate::engine::optimizer::OptimizerConfig;

// ==========================================
// StrategyContext - 单个工单的规则输入
// ==========================================
pub struct StrategyContext<'a> {
    pub cursor: DateTime<Utc>,          // 当前时间线游标
    pub work_order: &'a WorkOrder,      // 待排工单
    pub capacity: CapacityAssessment,   // 既有排程的产能评估
    pub config: &'a OptimizerConfig,    // 偏移/延期参数
}

/// 起始时间规则
pub type StartRule = for<'a> fn(&StrategyContext<'a>) -> DateTime<Utc>;

/// 算法 → 起始时间规则 (策略表)
///
/// CRITICAL_RATIO / RESOURCE_LEVELING 为保留名, 没有独立规则,
/// 与 FIFO/LIFO/EARLIEST_DUE 一样落位到"从游标开始"。
pub fn start_rule(algorithm: ScheduleAlgorithm) -> StartRule {
    match algorithm {
        ScheduleAlgorithm::Priority => start_by_priority_offset,
        ScheduleAlgorithm::CapacityBased => start_with_capacity_defer,
        ScheduleAlgorithm::Fifo
        | ScheduleAlgorithm::Lifo
        | ScheduleAlgorithm::EarliestDue
        | ScheduleAlgorithm::ShortestJob
        | ScheduleAlgorithm::CriticalRatio
        | ScheduleAlgorithm::ResourceLeveling => start_at_cursor,
    }
}

/// 默认规则: 从游标开始
fn start_at_cursor(ctx: &StrategyContext<'_>) -> DateTime<Utc> {
    ctx.cursor
}

/// PRIORITY 规则: 按优先级相对游标偏移
///
/// 偏移相对"处理该单时"的游标, 逐单独立, 不跨单累积
fn start_by_priority_offset(ctx: &StrategyContext<'_>) -> DateTime<Utc> {
    match ctx.work_order.priority {
        Priority::Critical => ctx.cursor,
        Priority::High => ctx.cursor + Duration::hours(ctx.config.high_priority_offset_hours),
        _ => ctx.cursor + Duration::hours(ctx.config.standard_priority_offset_hours),
    }
}

/// CAPACITY_BASED 规则: 需求超可用时整体延期
fn start_with_capacity_defer(ctx: &StrategyContext<'_>) -> DateTime<Utc> {
    if ctx.capacity.must_defer {
        ctx.cursor + Duration::hours(ctx.config.capacity_defer_hours)
    } else {
        ctx.cursor
    }
}

/// 计算结束时间
///
/// - SHORTEST_JOB: 覆盖为 start + 估算工时 (缺省 8h)
/// - 其余算法: start + 工单声明时长 (声明缺失/非正时回落估算工时)
///
/// 缓冲工时不在这里追加, 由优化器在最终结束时间上统一处理
pub fn compute_end(
    algorithm: ScheduleAlgorithm,
    work_order: &WorkOrder,
    candidate_start: DateTime<Utc>,
) -> DateTime<Utc> {
    let duration_hours = match algorithm {
        ScheduleAlgorithm::ShortestJob => work_order.effective_hours(),
        _ => work_order.declared_duration_hours(),
    };
    candidate_start + duration_from_hours(duration_hours)
}

/// 小时 (f64) → Duration, 秒级取整
pub fn duration_from_hours(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}
