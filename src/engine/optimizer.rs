// ==========================================
// 生产排程优化系统 - 批量优化引擎
// ==========================================
// 职责: 单次确定性批量排程
// - 一次读取阶段 (候选工单 + 既有排程), 一次逐单写入阶段
// - 共享时间线游标为局部变量, 随排序后的列表折叠前进,
//   模拟单条产线的串行时间线
// 红线: Engine 不拼 SQL; 单条落库失败立即中止本轮
//       (跳过任何一单都会使后续游标失真)
// ==========================================

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::capacity::{assess, CapacityAssessment};
use crate::domain::schedule::{ProductionSchedule, ResourceRequirement, ScheduleConstraint};
use crate::domain::types::{ScheduleAlgorithm, WorkOrderStatus};
use crate::engine::scoring::{optimization_score, OptimizeFlags};
use crate::engine::sorter::{PassItem, WorkOrderSorter};
use crate::engine::strategy::{self, StrategyContext};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{ProductionScheduleRepository, WorkOrderRepository};

// ==========================================
// OptimizerConfig - 优化器参数
// ==========================================
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// 单间换型间隔 (小时), 游标在每单结束后前进的固定间隙
    pub changeover_gap_hours: i64,
    /// CAPACITY_BASED 超产能时的延期 (小时)
    pub capacity_defer_hours: i64,
    /// PRIORITY 算法 HIGH 档的游标偏移 (小时)
    pub high_priority_offset_hours: i64,
    /// PRIORITY 算法 LOW/NORMAL 档的游标偏移 (小时)
    pub standard_priority_offset_hours: i64,
    /// 新建排程 latest_start 相对游标的窗口 (小时)
    pub latest_start_window_hours: i64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            changeover_gap_hours: 1,
            capacity_defer_hours: 24,
            high_priority_offset_hours: 2,
            standard_priority_offset_hours: 4,
            latest_start_window_hours: 24,
        }
    }
}

// ==========================================
// 命令与结果
// ==========================================

/// 单工单建档命令 (输入已在 API 层完成校验)
#[derive(Debug, Clone)]
pub struct CreateScheduleCommand {
    pub tenant_id: String,
    pub work_order_id: String,
    pub algorithm: ScheduleAlgorithm,
    pub priority_score: Option<i32>,
    pub required_capacity: Option<f64>,
    pub available_capacity: Option<f64>,
    pub resources: Vec<ResourceRequirement>,
    pub earliest_start: DateTime<Utc>,
    pub latest_start: DateTime<Utc>,
    pub buffer_hours: Option<f64>,
    pub constraints: Vec<ScheduleConstraint>,
}

/// 批量优化命令
#[derive(Debug, Clone)]
pub struct OptimizeCommand {
    pub tenant_id: String,
    /// 请求级算法覆盖; 缺省时逐单继承既有排程的算法, 再缺省为 PRIORITY
    pub algorithm: Option<ScheduleAlgorithm>,
    /// 时间线起点; 缺省为当前时刻 (测试注入固定起点以保证确定性)
    pub start_date: Option<DateTime<Utc>>,
    pub flags: OptimizeFlags,
}

/// 批量优化结果
#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    pub optimized_count: usize,
    pub algorithm: Option<ScheduleAlgorithm>,
    pub schedules: Vec<ProductionSchedule>,
}

// ==========================================
// ScheduleOptimizer - 排程优化引擎
// ==========================================
pub struct ScheduleOptimizer {
    work_order_repo: Arc<WorkOrderRepository>,
    schedule_repo: Arc<ProductionScheduleRepository>,
    sorter: WorkOrderSorter,
    config: OptimizerConfig,
    // 同租户的批量优化必须串行: 两轮并发各自推进内存游标,
    // 会对同一工单产出互相覆盖的排程
    tenant_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScheduleOptimizer {
    /// 创建新的优化引擎实例
    pub fn new(
        work_order_repo: Arc<WorkOrderRepository>,
        schedule_repo: Arc<ProductionScheduleRepository>,
    ) -> Self {
        Self::with_config(work_order_repo, schedule_repo, OptimizerConfig::default())
    }

    /// 创建带自定义参数的优化引擎实例
    pub fn with_config(
        work_order_repo: Arc<WorkOrderRepository>,
        schedule_repo: Arc<ProductionScheduleRepository>,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            work_order_repo,
            schedule_repo,
            sorter: WorkOrderSorter::new(),
            config,
            tenant_locks: Mutex::new(HashMap::new()),
        }
    }

    // ==========================================
    // 单工单建档
    // ==========================================

    /// 为单个工单建立排程档案
    ///
    /// # 前置条件
    /// - 工单存在且属于该租户
    /// - 该工单尚无排程 (检查+插入的原子性由唯一约束兜底)
    ///
    /// # 效果
    /// 产能评估写入 utilization_rate; scheduled_start 取 earliest_start;
    /// scheduled_end 取工单既有计划结束 (+ 缓冲); 新档为未优化草稿
    pub fn create_schedule(
        &self,
        cmd: CreateScheduleCommand,
    ) -> RepositoryResult<ProductionSchedule> {
        let work_order = self
            .work_order_repo
            .find_by_id(&cmd.tenant_id, &cmd.work_order_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                id: cmd.work_order_id.clone(),
            })?;

        if self
            .schedule_repo
            .find_by_work_order(&cmd.work_order_id)?
            .is_some()
        {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "工单已有排程: work_order_id={}",
                cmd.work_order_id
            )));
        }

        let assessment = assess(cmd.required_capacity, cmd.available_capacity);

        let buffer = cmd.buffer_hours.filter(|b| b.is_finite() && *b > 0.0);
        let scheduled_end = work_order
            .scheduled_end
            .map(|end| end + strategy::duration_from_hours(buffer.unwrap_or(0.0)));

        let now = Utc::now();
        let schedule = ProductionSchedule {
            id: Uuid::new_v4().to_string(),
            work_order_id: cmd.work_order_id,
            tenant_id: cmd.tenant_id,
            algorithm: cmd.algorithm,
            priority_score: cmd.priority_score.unwrap_or_else(|| work_order.priority.score()),
            required_capacity: cmd.required_capacity,
            available_capacity: cmd.available_capacity,
            utilization_rate: assessment.utilization_rate,
            resources: cmd.resources,
            constraints: cmd.constraints,
            earliest_start: cmd.earliest_start,
            latest_start: cmd.latest_start,
            scheduled_start: Some(cmd.earliest_start),
            scheduled_end,
            buffer_hours: buffer,
            is_optimized: false,
            optimization_score: 0,
            locked: false,
            created_at: now,
            updated_at: now,
        };

        self.schedule_repo.insert(&schedule)?;

        tracing::info!(
            work_order_id = %schedule.work_order_id,
            algorithm = %schedule.algorithm,
            "排程档案已建立"
        );

        Ok(schedule)
    }

    // ==========================================
    // 批量优化
    // ==========================================

    /// 对租户的整个待排积压执行一次确定性批量排程
    ///
    /// 流程:
    /// 1. 读取 PENDING/SCHEDULED 工单并合并既有排程 (锁定排程整单剔除)
    /// 2. 空集直接返回零计数
    /// 3. 基础排序一次; 请求级算法带预排序时整体重排一次
    /// 4. 游标从 start_date (缺省当前时刻) 出发
    /// 5. 逐单: 解析算法 → 规则定起点 → 定终点(+缓冲) → 计分 → 幂等落库
    ///    → 游标前进到 终点 + 换型间隔
    pub fn optimize(&self, cmd: OptimizeCommand) -> RepositoryResult<OptimizeOutcome> {
        let lock = self.tenant_lock(&cmd.tenant_id);
        let _guard = lock
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        // ===== 读取阶段 =====
        let orders = self.work_order_repo.list_eligible(
            &cmd.tenant_id,
            &[WorkOrderStatus::Pending, WorkOrderStatus::Scheduled],
        )?;

        let mut items: Vec<PassItem> = Vec::with_capacity(orders.len());
        for order in orders {
            let schedule = self.schedule_repo.find_by_work_order(&order.id)?;
            if let Some(existing) = &schedule {
                if existing.locked {
                    tracing::debug!(work_order_id = %order.id, "排程已锁定, 剔除出本轮");
                    continue;
                }
            }
            items.push((order, schedule));
        }

        if items.is_empty() {
            tracing::info!(tenant_id = %cmd.tenant_id, "无待排工单, 本轮空转");
            return Ok(OptimizeOutcome {
                optimized_count: 0,
                algorithm: cmd.algorithm,
                schedules: Vec::new(),
            });
        }

        // ===== 排序阶段 =====
        let mut items = self.sorter.sort_base(items);
        if let Some(algorithm) = cmd.algorithm {
            if algorithm.has_presort() {
                items = self.sorter.sort_for_algorithm(items, algorithm);
            }
        }

        // ===== 写入阶段: 游标沿排序后的列表折叠前进 =====
        let mut cursor = cmd.start_date.unwrap_or_else(Utc::now);
        let mut schedules = Vec::with_capacity(items.len());

        for (order, existing) in items {
            let algorithm = cmd
                .algorithm
                .or_else(|| existing.as_ref().map(|s| s.algorithm))
                .unwrap_or_default();

            let capacity = existing
                .as_ref()
                .map(|s| assess(s.required_capacity, s.available_capacity))
                .unwrap_or_else(CapacityAssessment::empty);

            let ctx = StrategyContext {
                cursor,
                work_order: &order,
                capacity,
                config: &self.config,
            };
            let candidate_start = strategy::start_rule(algorithm)(&ctx);
            let mut candidate_end = strategy::compute_end(algorithm, &order, candidate_start);

            let buffer = existing
                .as_ref()
                .map(|s| s.effective_buffer_hours())
                .unwrap_or(0.0);
            if buffer > 0.0 {
                candidate_end = candidate_end + strategy::duration_from_hours(buffer);
            }

            let score = optimization_score(order.priority, algorithm, &cmd.flags);

            let candidate = match existing {
                Some(schedule) => ProductionSchedule {
                    algorithm,
                    scheduled_start: Some(candidate_start),
                    scheduled_end: Some(candidate_end),
                    is_optimized: true,
                    optimization_score: score,
                    updated_at: Utc::now(),
                    ..schedule
                },
                None => {
                    let now = Utc::now();
                    ProductionSchedule {
                        id: Uuid::new_v4().to_string(),
                        work_order_id: order.id.clone(),
                        tenant_id: cmd.tenant_id.clone(),
                        algorithm,
                        priority_score: order.priority.score(),
                        required_capacity: None,
                        available_capacity: None,
                        utilization_rate: None,
                        resources: Vec::new(),
                        constraints: Vec::new(),
                        earliest_start: cursor,
                        latest_start: cursor
                            + Duration::hours(self.config.latest_start_window_hours),
                        scheduled_start: Some(candidate_start),
                        scheduled_end: Some(candidate_end),
                        buffer_hours: None,
                        is_optimized: true,
                        optimization_score: score,
                        locked: false,
                        created_at: now,
                        updated_at: now,
                    }
                }
            };

            // 落库失败即中止本轮; 幂等 upsert 保证整轮重试安全
            let saved = self.schedule_repo.upsert(&candidate)?;

            tracing::debug!(
                work_order_id = %order.id,
                algorithm = %algorithm,
                start = %candidate_start,
                end = %candidate_end,
                score,
                "工单落位"
            );

            schedules.push(saved);
            cursor = candidate_end + Duration::hours(self.config.changeover_gap_hours);
        }

        tracing::info!(
            tenant_id = %cmd.tenant_id,
            optimized_count = schedules.len(),
            "批量优化完成"
        );

        Ok(OptimizeOutcome {
            optimized_count: schedules.len(),
            algorithm: cmd.algorithm,
            schedules,
        })
    }

    /// 获取租户级优化锁 (同租户串行, 异租户互不阻塞)
    fn tenant_lock(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .tenant_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
