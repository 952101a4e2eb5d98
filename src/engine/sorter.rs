// ==========================================
// 生产排程优化系统 - 待排集合排序器
// ==========================================
// 职责: 批量优化开始前的一次性排序
// - 基础排序: 优先级降序 → 既有计划开始升序 → created_at 升序 (稳定 tie-break)
// - 算法预排序: FIFO/LIFO/EARLIEST_DUE/SHORTEST_JOB 对集合整体重排,
//   其余算法保持基础排序
// ==========================================

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::domain::schedule::ProductionSchedule;
use crate::domain::types::ScheduleAlgorithm;
use crate::domain::work_order::WorkOrder;

/// 待排条目: 工单及其既有排程 (可能尚无排程)
pub type PassItem = (WorkOrder, Option<ProductionSchedule>);

// ==========================================
// WorkOrderSorter - 排序器
// ==========================================
pub struct WorkOrderSorter {
    // 无状态引擎, 不需要注入依赖
}

impl WorkOrderSorter {
    pub fn new() -> Self {
        Self {}
    }

    /// 基础排序
    ///
    /// 排序键:
    /// 1) priority 降序 (CRITICAL > HIGH > NORMAL > LOW)
    /// 2) 工单既有 scheduled_start 升序 (缺失排最后)
    /// 3) created_at 升序
    pub fn sort_base(&self, mut items: Vec<PassItem>) -> Vec<PassItem> {
        items.sort_by(|a, b| self.compare_base(&a.0, &b.0));
        items
    }

    /// 按算法预排序 (在基础排序之后调用一次)
    ///
    /// 非预排序算法原样返回, 保持基础排序结果
    pub fn sort_for_algorithm(
        &self,
        mut items: Vec<PassItem>,
        algorithm: ScheduleAlgorithm,
    ) -> Vec<PassItem> {
        match algorithm {
            ScheduleAlgorithm::Fifo => {
                items.sort_by(|a, b| a.0.created_at.cmp(&b.0.created_at));
            }
            ScheduleAlgorithm::Lifo => {
                items.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
            }
            ScheduleAlgorithm::EarliestDue => {
                items.sort_by(|a, b| self.compare_due(&a.0, &b.0));
            }
            ScheduleAlgorithm::ShortestJob => {
                items.sort_by(|a, b| a.0.effective_hours().total_cmp(&b.0.effective_hours()));
            }
            _ => {}
        }
        items
    }

    /// 基础比较: 优先级 → 既有计划开始 → created_at
    fn compare_base(&self, a: &WorkOrder, b: &WorkOrder) -> Ordering {
        // 1. 优先级降序
        match b.priority.cmp(&a.priority) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 既有计划开始升序 (缺失排最后)
        let start_a = a.scheduled_start.unwrap_or(DateTime::<Utc>::MAX_UTC);
        let start_b = b.scheduled_start.unwrap_or(DateTime::<Utc>::MAX_UTC);
        match start_a.cmp(&start_b) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. created_at 升序
        a.created_at.cmp(&b.created_at)
    }

    /// EARLIEST_DUE 比较: 交期升序, 缺失排最后, 同交期回落优先级分值降序
    fn compare_due(&self, a: &WorkOrder, b: &WorkOrder) -> Ordering {
        let due_a = a.due_date.unwrap_or(DateTime::<Utc>::MAX_UTC);
        let due_b = b.due_date.unwrap_or(DateTime::<Utc>::MAX_UTC);
        match due_a.cmp(&due_b) {
            Ordering::Equal => b.priority.score().cmp(&a.priority.score()),
            other => other,
        }
    }
}

impl Default for WorkOrderSorter {
    fn default() -> Self {
        Self::new()
    }
}
