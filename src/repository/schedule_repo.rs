// ==========================================
// 生产排程优化系统 - 排程数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: work_order_id 唯一 (一单一排程), 由 schema 保证
// ==========================================

use crate::domain::schedule::{ProductionSchedule, ResourceRequirement, ScheduleConstraint};
use crate::domain::types::ScheduleAlgorithm;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{parse_utc, parse_utc_opt};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductionScheduleRepository - 排程仓储
// ==========================================

/// 排程仓储
/// 职责: 管理 production_schedule 表的数据访问
pub struct ProductionScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionScheduleRepository {
    /// 创建新的排程仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    const SELECT_COLUMNS: &'static str = r#"
        id, work_order_id, tenant_id, algorithm, priority_score,
        required_capacity, available_capacity, utilization_rate,
        resources, constraints, earliest_start, latest_start,
        scheduled_start, scheduled_end, buffer_hours,
        is_optimized, optimization_score, locked, created_at, updated_at
    "#;

    /// 按工单ID查询排程 (1:1 关系)
    pub fn find_by_work_order(
        &self,
        work_order_id: &str,
    ) -> RepositoryResult<Option<ProductionSchedule>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM production_schedule WHERE work_order_id = ?1",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let schedule = stmt
            .query_row(params![work_order_id], Self::map_row)
            .optional()?;

        Ok(schedule)
    }

    /// 按租户查询全部排程
    pub fn list_by_tenant(&self, tenant_id: &str) -> RepositoryResult<Vec<ProductionSchedule>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM production_schedule WHERE tenant_id = ?1 ORDER BY created_at",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let schedules = stmt
            .query_map(params![tenant_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(schedules)
    }

    /// 插入新排程
    ///
    /// work_order_id 已存在时返回唯一约束违反 (检查+插入的原子性由约束兜底)
    pub fn insert(&self, schedule: &ProductionSchedule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO production_schedule (
                id, work_order_id, tenant_id, algorithm, priority_score,
                required_capacity, available_capacity, utilization_rate,
                resources, constraints, earliest_start, latest_start,
                scheduled_start, scheduled_end, buffer_hours,
                is_optimized, optimization_score, locked, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
            )
            "#,
            params![
                schedule.id,
                schedule.work_order_id,
                schedule.tenant_id,
                schedule.algorithm.to_string(),
                schedule.priority_score,
                schedule.required_capacity,
                schedule.available_capacity,
                schedule.utilization_rate,
                Self::to_json(&schedule.resources)?,
                Self::to_json(&schedule.constraints)?,
                schedule.earliest_start.to_rfc3339(),
                schedule.latest_start.to_rfc3339(),
                schedule.scheduled_start.map(|d| d.to_rfc3339()),
                schedule.scheduled_end.map(|d| d.to_rfc3339()),
                schedule.buffer_hours,
                schedule.is_optimized,
                schedule.optimization_score,
                schedule.locked,
                schedule.created_at.to_rfc3339(),
                schedule.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 幂等写入排程 (批量优化的落库入口)
    ///
    /// - 不存在: 整行插入
    /// - 已存在: 仅覆盖优化产出字段
    ///   (algorithm / scheduled_start / scheduled_end / is_optimized /
    ///   optimization_score / updated_at), 其余字段保持原值
    ///
    /// # 返回
    /// 落库后的排程记录
    pub fn upsert(&self, schedule: &ProductionSchedule) -> RepositoryResult<ProductionSchedule> {
        {
            let conn = self.get_conn()?;

            let updated = conn.execute(
                r#"
                UPDATE production_schedule SET
                    algorithm = ?2,
                    scheduled_start = ?3,
                    scheduled_end = ?4,
                    is_optimized = ?5,
                    optimization_score = ?6,
                    updated_at = ?7
                WHERE work_order_id = ?1
                "#,
                params![
                    schedule.work_order_id,
                    schedule.algorithm.to_string(),
                    schedule.scheduled_start.map(|d| d.to_rfc3339()),
                    schedule.scheduled_end.map(|d| d.to_rfc3339()),
                    schedule.is_optimized,
                    schedule.optimization_score,
                    schedule.updated_at.to_rfc3339(),
                ],
            )?;

            if updated == 0 {
                conn.execute(
                    r#"
                    INSERT INTO production_schedule (
                        id, work_order_id, tenant_id, algorithm, priority_score,
                        required_capacity, available_capacity, utilization_rate,
                        resources, constraints, earliest_start, latest_start,
                        scheduled_start, scheduled_end, buffer_hours,
                        is_optimized, optimization_score, locked, created_at, updated_at
                    ) VALUES (
                        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                        ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
                    )
                    "#,
                    params![
                        schedule.id,
                        schedule.work_order_id,
                        schedule.tenant_id,
                        schedule.algorithm.to_string(),
                        schedule.priority_score,
                        schedule.required_capacity,
                        schedule.available_capacity,
                        schedule.utilization_rate,
                        Self::to_json(&schedule.resources)?,
                        Self::to_json(&schedule.constraints)?,
                        schedule.earliest_start.to_rfc3339(),
                        schedule.latest_start.to_rfc3339(),
                        schedule.scheduled_start.map(|d| d.to_rfc3339()),
                        schedule.scheduled_end.map(|d| d.to_rfc3339()),
                        schedule.buffer_hours,
                        schedule.is_optimized,
                        schedule.optimization_score,
                        schedule.locked,
                        schedule.created_at.to_rfc3339(),
                        schedule.updated_at.to_rfc3339(),
                    ],
                )?;
            }
        }

        self.find_by_work_order(&schedule.work_order_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "ProductionSchedule".to_string(),
                id: schedule.work_order_id.clone(),
            })
    }

    /// 序列化标注列表为 JSON 列
    fn to_json<T: serde::Serialize>(value: &T) -> RepositoryResult<String> {
        serde_json::to_string(value)
            .map_err(|e| RepositoryError::InternalError(format!("标注序列化失败: {}", e)))
    }

    /// 行映射
    fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductionSchedule> {
        let resources: Vec<ResourceRequirement> = row
            .get::<_, Option<String>>(8)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let constraints: Vec<ScheduleConstraint> = row
            .get::<_, Option<String>>(9)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        Ok(ProductionSchedule {
            id: row.get(0)?,
            work_order_id: row.get(1)?,
            tenant_id: row.get(2)?,
            algorithm: row
                .get::<_, String>(3)?
                .parse()
                .unwrap_or(ScheduleAlgorithm::Priority),
            priority_score: row.get(4)?,
            required_capacity: row.get(5)?,
            available_capacity: row.get(6)?,
            utilization_rate: row.get(7)?,
            resources,
            constraints,
            earliest_start: parse_utc(&row.get::<_, String>(10)?),
            latest_start: parse_utc(&row.get::<_, String>(11)?),
            scheduled_start: parse_utc_opt(row.get(12)?),
            scheduled_end: parse_utc_opt(row.get(13)?),
            buffer_hours: row.get(14)?,
            is_optimized: row.get(15)?,
            optimization_score: row.get(16)?,
            locked: row.get(17)?,
            created_at: parse_utc(&row.get::<_, String>(18)?),
            updated_at: parse_utc(&row.get::<_, String>(19)?),
        })
    }
}
