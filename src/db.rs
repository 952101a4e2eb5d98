// ==========================================
// 生产排程优化系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句, 供可执行入口与测试共用
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表 (幂等)
///
/// work_order 为协作方(生产模块)拥有的表, 这里只建优化器读取所需的列;
/// production_schedule 由优化器全权管理, work_order_id 唯一约束
/// 保证一单一排程。
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS work_order (
            id              TEXT PRIMARY KEY,
            tenant_id       TEXT NOT NULL,
            order_no        TEXT NOT NULL,
            product_id      TEXT,
            priority        TEXT NOT NULL DEFAULT 'NORMAL',
            status          TEXT NOT NULL DEFAULT 'PENDING',
            estimated_hours REAL,
            due_date        TEXT,
            scheduled_start TEXT,
            scheduled_end   TEXT,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_work_order_tenant_status
            ON work_order (tenant_id, status);

        CREATE TABLE IF NOT EXISTS production_schedule (
            id                 TEXT PRIMARY KEY,
            work_order_id      TEXT NOT NULL UNIQUE REFERENCES work_order(id),
            tenant_id          TEXT NOT NULL,
            algorithm          TEXT NOT NULL DEFAULT 'PRIORITY',
            priority_score     INTEGER NOT NULL DEFAULT 50,
            required_capacity  REAL,
            available_capacity REAL,
            utilization_rate   REAL,
            resources          TEXT,
            constraints        TEXT,
            earliest_start     TEXT NOT NULL,
            latest_start       TEXT NOT NULL,
            scheduled_start    TEXT,
            scheduled_end      TEXT,
            buffer_hours       REAL,
            is_optimized       INTEGER NOT NULL DEFAULT 0,
            optimization_score INTEGER NOT NULL DEFAULT 0,
            locked             INTEGER NOT NULL DEFAULT 0,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_production_schedule_tenant
            ON production_schedule (tenant_id);
        "#,
    )?;
    Ok(())
}
