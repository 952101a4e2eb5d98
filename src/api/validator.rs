// ==========================================
// 生产排程优化系统 - 请求校验器
// ==========================================
// 职责: 在任何读写之前拒绝畸形输入
// - 未知算法名
// - 非正的产能数字
// - 建档缺少必填边界 / 负缓冲
// 输出: 通过校验的类型化命令, 引擎只消费命令
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::schedule_api::{CreateScheduleRequest, OptimizeRequest};
use crate::domain::types::ScheduleAlgorithm;
use crate::engine::optimizer::{CreateScheduleCommand, OptimizeCommand};
use crate::engine::scoring::OptimizeFlags;

/// 校验建档请求
///
/// # 返回
/// - Ok(CreateScheduleCommand): 校验通过的类型化命令
/// - Err(ApiError::ValidationError): 输入畸形
pub fn validate_create_request(req: CreateScheduleRequest) -> ApiResult<CreateScheduleCommand> {
    if req.tenant_id.trim().is_empty() {
        return Err(ApiError::ValidationError("tenant_id 不能为空".to_string()));
    }
    if req.work_order_id.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "work_order_id 不能为空".to_string(),
        ));
    }

    let algorithm: ScheduleAlgorithm = req
        .algorithm
        .parse()
        .map_err(ApiError::ValidationError)?;

    validate_capacity_figure("required_capacity", req.required_capacity)?;
    validate_capacity_figure("available_capacity", req.available_capacity)?;

    let earliest_start = req.earliest_start.ok_or_else(|| {
        ApiError::ValidationError("缺少必填边界: earliest_start".to_string())
    })?;
    let latest_start = req.latest_start.ok_or_else(|| {
        ApiError::ValidationError("缺少必填边界: latest_start".to_string())
    })?;

    if let Some(buffer) = req.buffer_hours {
        if !buffer.is_finite() || buffer < 0.0 {
            return Err(ApiError::ValidationError(format!(
                "缓冲工时不能为负: {}",
                buffer
            )));
        }
    }

    Ok(CreateScheduleCommand {
        tenant_id: req.tenant_id,
        work_order_id: req.work_order_id,
        algorithm,
        priority_score: req.priority_score,
        required_capacity: req.required_capacity,
        available_capacity: req.available_capacity,
        resources: req.resources,
        earliest_start,
        latest_start,
        buffer_hours: req.buffer_hours,
        constraints: req.constraints,
    })
}

/// 校验批量优化请求
pub fn validate_optimize_request(req: OptimizeRequest) -> ApiResult<OptimizeCommand> {
    if req.tenant_id.trim().is_empty() {
        return Err(ApiError::ValidationError("tenant_id 不能为空".to_string()));
    }

    let algorithm = match req.algorithm {
        Some(raw) => Some(
            raw.parse::<ScheduleAlgorithm>()
                .map_err(ApiError::ValidationError)?,
        ),
        None => None,
    };

    Ok(OptimizeCommand {
        tenant_id: req.tenant_id,
        algorithm,
        start_date: req.start_date,
        flags: OptimizeFlags {
            consider_capacity: req.consider_capacity,
            consider_priority: req.consider_priority,
            consider_dependencies: req.consider_dependencies,
        },
    })
}

/// 产能数字必须为正的有限值
fn validate_capacity_figure(field: &str, value: Option<f64>) -> ApiResult<()> {
    if let Some(v) = value {
        if !v.is_finite() || v <= 0.0 {
            return Err(ApiError::ValidationError(format!(
                "产能数字必须为正: {}={}",
                field, v
            )));
        }
    }
    Ok(())
}
