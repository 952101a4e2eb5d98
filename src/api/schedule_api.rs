// ==========================================
// 生产排程优化系统 - 排程业务接口
// ==========================================
// 职责: 面向宿主应用的两个核心操作 (建档/批量优化)
//       与轻量查询接口; 租户上下文由宿主应用解析并传入
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::domain::schedule::{ProductionSchedule, ResourceRequirement, ScheduleConstraint};
use crate::engine::optimizer::ScheduleOptimizer;
use crate::repository::ProductionScheduleRepository;

// ==========================================
// 请求/响应 DTO
// ==========================================

/// 建档请求 (算法以字符串传入, 由校验器解析)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub tenant_id: String,
    pub work_order_id: String,
    pub algorithm: String,
    #[serde(default)]
    pub priority_score: Option<i32>,
    #[serde(default)]
    pub required_capacity: Option<f64>,
    #[serde(default)]
    pub available_capacity: Option<f64>,
    #[serde(default)]
    pub resources: Vec<ResourceRequirement>,
    #[serde(default)]
    pub earliest_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub buffer_hours: Option<f64>,
    #[serde(default)]
    pub constraints: Vec<ScheduleConstraint>,
}

/// 批量优化请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub tenant_id: String,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub consider_capacity: bool,
    #[serde(default = "default_true")]
    pub consider_priority: bool,
    #[serde(default = "default_true")]
    pub consider_dependencies: bool,
}

fn default_true() -> bool {
    true
}

/// 批量优化响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub optimized_count: usize,
    pub algorithm: Option<String>,
    pub schedules: Vec<ProductionSchedule>,
}

// ==========================================
// ScheduleApi - 排程接口
// ==========================================
pub struct ScheduleApi {
    optimizer: Arc<ScheduleOptimizer>,
    schedule_repo: Arc<ProductionScheduleRepository>,
}

impl ScheduleApi {
    /// 创建新的排程接口实例
    pub fn new(
        optimizer: Arc<ScheduleOptimizer>,
        schedule_repo: Arc<ProductionScheduleRepository>,
    ) -> Self {
        Self {
            optimizer,
            schedule_repo,
        }
    }

    /// 为单个工单建立排程档案
    ///
    /// # 失败
    /// - ValidationError: 未知算法 / 非正产能 / 缺少必填边界
    /// - NotFound: 工单不存在或不属于该租户
    /// - Conflict: 该工单已有排程
    pub fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> ApiResult<ProductionSchedule> {
        let cmd = validator::validate_create_request(request)?;
        let schedule = self.optimizer.create_schedule(cmd)?;
        Ok(schedule)
    }

    /// 对租户的待排积压执行一次批量优化
    ///
    /// 空候选集不是错误: 返回 optimized_count=0
    ///
    /// # 失败
    /// - ValidationError: 未知算法名
    pub fn optimize(&self, request: OptimizeRequest) -> ApiResult<OptimizeResponse> {
        let cmd = validator::validate_optimize_request(request)?;
        let outcome = self.optimizer.optimize(cmd)?;
        Ok(OptimizeResponse {
            optimized_count: outcome.optimized_count,
            algorithm: outcome.algorithm.map(|a| a.as_str().to_string()),
            schedules: outcome.schedules,
        })
    }

    /// 查询单个工单的排程
    pub fn get_schedule(
        &self,
        tenant_id: &str,
        work_order_id: &str,
    ) -> ApiResult<ProductionSchedule> {
        let schedule = self
            .schedule_repo
            .find_by_work_order(work_order_id)?
            .filter(|s| s.tenant_id == tenant_id)
            .ok_or_else(|| {
                ApiError::NotFound(format!("ProductionSchedule(work_order_id={})不存在", work_order_id))
            })?;
        Ok(schedule)
    }

    /// 查询租户全部排程
    pub fn list_schedules(&self, tenant_id: &str) -> ApiResult<Vec<ProductionSchedule>> {
        Ok(self.schedule_repo.list_by_tenant(tenant_id)?)
    }
}
