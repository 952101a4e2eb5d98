// ==========================================
// 生产排程优化系统 - 命令行入口
// ==========================================
// 用途: 对指定租户手动触发一次批量优化
// 用法: production-scheduler <数据库路径> <租户ID> [算法] [起始时间RFC3339]
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use production_scheduler::api::{OptimizeRequest, ScheduleApi};
use production_scheduler::db;
use production_scheduler::engine::ScheduleOptimizer;
use production_scheduler::repository::{ProductionScheduleRepository, WorkOrderRepository};

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    production_scheduler::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", production_scheduler::APP_NAME);
    tracing::info!("系统版本: {}", production_scheduler::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("用法: production-scheduler <数据库路径> <租户ID> [算法] [起始时间RFC3339]");
        std::process::exit(2);
    }

    let db_path = &args[1];
    let tenant_id = args[2].clone();
    let algorithm = args.get(3).cloned();
    let start_date = match args.get(4) {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| anyhow::anyhow!("起始时间解析失败: {}", e))?,
        ),
        None => None,
    };

    tracing::info!("使用数据库: {}", db_path);

    // 初始化数据库连接与 schema
    let conn = db::open_sqlite_connection(db_path)?;
    db::ensure_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    // 组装仓储与引擎
    let work_order_repo = Arc::new(WorkOrderRepository::from_connection(conn.clone()));
    let schedule_repo = Arc::new(ProductionScheduleRepository::from_connection(conn));
    let optimizer = Arc::new(ScheduleOptimizer::new(
        work_order_repo,
        schedule_repo.clone(),
    ));
    let api = ScheduleApi::new(optimizer, schedule_repo);

    // 执行批量优化
    let response = api.optimize(OptimizeRequest {
        tenant_id,
        algorithm,
        start_date,
        consider_capacity: true,
        consider_priority: true,
        consider_dependencies: true,
    })?;

    tracing::info!("本轮落位工单数: {}", response.optimized_count);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
