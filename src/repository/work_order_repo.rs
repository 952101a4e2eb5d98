// ==========================================
// 生产排程优化系统 - 工单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 优化器视角下工单只读 (insert 仅供工单模块/测试使用)
// ==========================================

use crate::domain::types::WorkOrderStatus;
use crate::domain::work_order::WorkOrder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{parse_utc, parse_utc_opt};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// WorkOrderRepository - 工单仓储
// ==========================================

/// 工单仓储
/// 职责: 管理 work_order 表的数据访问
pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkOrderRepository {
    /// 创建新的工单仓储实例
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

    /// 按租户与ID查询单个工单
    ///
    /// # 返回
    /// - Ok(Some(WorkOrder)): 找到且属于该租户
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, tenant_id: &str, id: &str) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                id, tenant_id, order_no, product_id, priority, status,
                estimated_hours, due_date, scheduled_start, scheduled_end,
                created_at, updated_at
            FROM work_order
            WHERE tenant_id = ?1 AND id = ?2
            "#,
        )?;

        let order = stmt
            .query_row(params![tenant_id, id], Self::map_row)
            .optional()?;

        Ok(order)
    }

    /// 查询租户下处于给定状态集的工单 (批量优化的候选集)
    ///
    /// # 参数
    /// - tenant_id: 租户ID
    /// - statuses: 状态集合 (通常为 PENDING + SCHEDULED)
    ///
    /// # 返回
    /// 按 created_at 升序的工单列表
    pub fn list_eligible(
        &self,
        tenant_id: &str,
        statuses: &[WorkOrderStatus],
    ) -> RepositoryResult<Vec<WorkOrder>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;

        let placeholders = statuses
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT
                id, tenant_id, order_no, product_id, priority, status,
                estimated_hours, due_date, scheduled_start, scheduled_end,
                created_at, updated_at
            FROM work_order
            WHERE tenant_id = ?1 AND status IN ({})
            ORDER BY created_at
            "#,
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;

        let status_values: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let mut sql_params: Vec<&dyn rusqlite::ToSql> = vec![&tenant_id];
        for value in &status_values {
            sql_params.push(value);
        }

        let orders = stmt
            .query_map(&sql_params[..], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// 插入工单 (工单模块/测试数据准备使用)
    pub fn insert(&self, order: &WorkOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO work_order (
                id, tenant_id, order_no, product_id, priority, status,
                estimated_hours, due_date, scheduled_start, scheduled_end,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                order.id,
                order.tenant_id,
                order.order_no,
                order.product_id,
                order.priority.to_string(),
                order.status.to_string(),
                order.estimated_hours,
                order.due_date.map(|d| d.to_rfc3339()),
                order.scheduled_start.map(|d| d.to_rfc3339()),
                order.scheduled_end.map(|d| d.to_rfc3339()),
                order.created_at.to_rfc3339(),
                order.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 行映射
    fn map_row(row: &Row<'_>) -> rusqlite::Result<WorkOrder> {
        Ok(WorkOrder {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            order_no: row.get(2)?,
            product_id: row.get(3)?,
            priority: row
                .get::<_, String>(4)?
                .parse()
                .unwrap_or(crate::domain::types::Priority::Normal),
            status: row
                .get::<_, String>(5)?
                .parse()
                .unwrap_or(WorkOrderStatus::Pending),
            estimated_hours: row.get(6)?,
            due_date: parse_utc_opt(row.get(7)?),
            scheduled_start: parse_utc_opt(row.get(8)?),
            scheduled_end: parse_utc_opt(row.get(9)?),
            created_at: parse_utc(&row.get::<_, String>(10)?),
            updated_at: parse_utc(&row.get::<_, String>(11)?),
        })
    }
}
