// ==========================================
// ScheduleOptimizer 引擎集成测试
// ==========================================
// 测试目标: 验证批量优化的确定性与时间线约束
// 覆盖范围: 游标单调性、优先级偏移、产能延期、幂等性、
//           空集空转、锁定剔除、既有排程原位更新
// ==========================================


use chrono::Duration;
use production_scheduler::domain::types::{Priority, ScheduleAlgorithm};
use production_scheduler::engine::optimizer::{CreateScheduleCommand, OptimizeCommand};
use production_scheduler::engine::scoring::OptimizeFlags;
use test_helpers::{base_time, build_engine, create_test_db, make_work_order, open_test_connection};

/// 默认批量优化命令 (固定起点, 全考量开启)
fn optimize_cmd(tenant_id: &str, algorithm: Option<ScheduleAlgorithm>) -> OptimizeCommand {
    OptimizeCommand {
        tenant_id: tenant_id.to_string(),
        algorithm,
        start_date: Some(base_time()),
        flags: OptimizeFlags::default(),
    }
}

/// 默认建档命令
fn create_cmd(tenant_id: &str, work_order_id: &str) -> CreateScheduleCommand {
    CreateScheduleCommand {
        tenant_id: tenant_id.to_string(),
        work_order_id: work_order_id.to_string(),
        algorithm: ScheduleAlgorithm::Priority,
        priority_score: None,
        required_capacity: None,
        available_capacity: None,
        resources: Vec::new(),
        earliest_start: base_time(),
        latest_start: base_time() + Duration::hours(24),
        buffer_hours: None,
        constraints: Vec::new(),
    }
}

// ==========================================
// 测试用例 1: 空候选集空转
// ==========================================

#[test]
fn test_optimize_empty_backlog_is_noop() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (_wo_repo, schedule_repo, optimizer) = build_engine(conn);

    let outcome = optimizer
        .optimize(optimize_cmd("T1", None))
        .expect("空集优化不应失败");

    assert_eq!(outcome.optimized_count, 0, "空集应返回零计数");
    assert!(outcome.schedules.is_empty());
    assert!(
        schedule_repo.list_by_tenant("T1").unwrap().is_empty(),
        "空转不应产生任何落库"
    );
}

// ==========================================
// 测试用例 2: PRIORITY 算法端到端场景
// ==========================================
// A(CRITICAL, 2h), B(HIGH, 3h), C(NORMAL, 1h), 起点 2024-01-01T00:00Z
// 期望: A 00:00-02:00 / B 05:00-08:00 / C 13:00-14:00

#[test]
fn test_priority_end_to_end_scenario() {
    println!("\n=== 测试：PRIORITY 端到端场景 ===");

    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    wo_repo
        .insert(&make_work_order("A", "T1", Priority::Critical, Some(2.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("B", "T1", Priority::High, Some(3.0), 1))
        .unwrap();
    wo_repo
        .insert(&make_work_order("C", "T1", Priority::Normal, Some(1.0), 2))
        .unwrap();

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("批量优化失败");

    assert_eq!(outcome.optimized_count, 3);

    let by_id = |id: &str| {
        outcome
            .schedules
            .iter()
            .find(|s| s.work_order_id == id)
            .unwrap_or_else(|| panic!("缺少工单{}的排程", id))
            .clone()
    };

    let a = by_id("A");
    assert_eq!(a.scheduled_start.unwrap(), base_time());
    assert_eq!(a.scheduled_end.unwrap(), base_time() + Duration::hours(2));

    // B 的偏移相对"处理 B 时"的游标 03:00, 而非起点
    let b = by_id("B");
    assert_eq!(b.scheduled_start.unwrap(), base_time() + Duration::hours(5));
    assert_eq!(b.scheduled_end.unwrap(), base_time() + Duration::hours(8));

    let c = by_id("C");
    assert_eq!(c.scheduled_start.unwrap(), base_time() + Duration::hours(13));
    assert_eq!(c.scheduled_end.unwrap(), base_time() + Duration::hours(14));

    println!("✓ 三单落位时间逐一吻合");
    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 3: 游标单调性与换型间隔
// ==========================================

#[test]
fn test_monotonic_cursor_with_changeover_gap() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    let priorities = [
        Priority::Critical,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::High,
    ];
    for (i, priority) in priorities.iter().enumerate() {
        wo_repo
            .insert(&make_work_order(
                &format!("WO-{}", i),
                "T1",
                *priority,
                Some(1.0 + i as f64),
                i as i64,
            ))
            .unwrap();
    }

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("批量优化失败");

    // 按处理顺序逐对校验: end_i + 1h <= start_{i+1}
    for pair in outcome.schedules.windows(2) {
        let end_prev = pair[0].scheduled_end.unwrap();
        let start_next = pair[1].scheduled_start.unwrap();
        assert!(
            end_prev + Duration::hours(1) <= start_next,
            "时间线重叠: {} 结束于 {}, 但 {} 开始于 {}",
            pair[0].work_order_id,
            end_prev,
            pair[1].work_order_id,
            start_next
        );
    }
}

// ==========================================
// 测试用例 4: CAPACITY_BASED 产能延期
// ==========================================

#[test]
fn test_capacity_deferral_shifts_start_by_24h() {
    println!("\n=== 测试：产能延期 ===");

    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    // 两个租户各一单, 游标起点相同, 仅产能不同
    wo_repo
        .insert(&make_work_order("FIT", "T-FIT", Priority::Normal, Some(2.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("OVER", "T-OVER", Priority::Normal, Some(2.0), 0))
        .unwrap();

    let mut cmd = create_cmd("T-FIT", "FIT");
    cmd.algorithm = ScheduleAlgorithm::CapacityBased;
    cmd.required_capacity = Some(30.0);
    cmd.available_capacity = Some(50.0);
    let fit_draft = optimizer.create_schedule(cmd).expect("建档失败");
    assert_eq!(fit_draft.utilization_rate, Some(60.0));

    let mut cmd = create_cmd("T-OVER", "OVER");
    cmd.algorithm = ScheduleAlgorithm::CapacityBased;
    cmd.required_capacity = Some(80.0);
    cmd.available_capacity = Some(50.0);
    let over_draft = optimizer.create_schedule(cmd).expect("建档失败");
    assert_eq!(over_draft.utilization_rate, Some(160.0));

    let fit = optimizer
        .optimize(optimize_cmd("T-FIT", None))
        .expect("批量优化失败");
    let over = optimizer
        .optimize(optimize_cmd("T-OVER", None))
        .expect("批量优化失败");

    let fit_start = fit.schedules[0].scheduled_start.unwrap();
    let over_start = over.schedules[0].scheduled_start.unwrap();

    assert_eq!(fit_start, base_time(), "产能充足应从游标开始");
    assert_eq!(
        over_start,
        base_time() + Duration::hours(24),
        "超产能应恰好延期24小时"
    );

    println!("✓ 延期 = {}", over_start - fit_start);
    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 5: 幂等性 (固定起点, 连续两轮)
// ==========================================

#[test]
fn test_optimize_twice_is_idempotent() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    wo_repo
        .insert(&make_work_order("A", "T1", Priority::Critical, Some(2.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("B", "T1", Priority::Normal, Some(4.0), 1))
        .unwrap();

    // B 带缓冲: 幂等性必须在缓冲存在时同样成立
    let mut cmd = create_cmd("T1", "B");
    cmd.buffer_hours = Some(2.0);
    optimizer.create_schedule(cmd).expect("建档失败");

    let first = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("第一轮失败");
    let second = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("第二轮失败");

    assert_eq!(first.optimized_count, second.optimized_count);
    for (s1, s2) in first.schedules.iter().zip(second.schedules.iter()) {
        assert_eq!(s1.work_order_id, s2.work_order_id, "两轮处理顺序应一致");
        assert_eq!(s1.scheduled_start, s2.scheduled_start, "重复优化开始时间漂移");
        assert_eq!(s1.scheduled_end, s2.scheduled_end, "重复优化结束时间漂移");
        assert_eq!(s1.optimization_score, s2.optimization_score);
        assert_eq!(s1.id, s2.id, "重复优化不应更换排程ID");
    }
}

// ==========================================
// 测试用例 6: 优化分值边界
// ==========================================

#[test]
fn test_optimization_scores_stay_in_bounds() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    for (i, priority) in [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Critical,
    ]
    .iter()
    .enumerate()
    {
        wo_repo
            .insert(&make_work_order(
                &format!("WO-{}", i),
                "T1",
                *priority,
                None,
                i as i64,
            ))
            .unwrap();
    }

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("批量优化失败");

    for schedule in &outcome.schedules {
        assert!(
            (0..=100).contains(&schedule.optimization_score),
            "分值越界: {} = {}",
            schedule.work_order_id,
            schedule.optimization_score
        );
    }

    // CRITICAL + PRIORITY + 全考量 = 自然上限 100
    let critical = outcome
        .schedules
        .iter()
        .find(|s| s.work_order_id == "WO-3")
        .unwrap();
    assert_eq!(critical.optimization_score, 100);
}

// ==========================================
// 测试用例 7: 锁定排程剔除
// ==========================================

#[test]
fn test_locked_schedule_excluded_from_pass() {
    println!("\n=== 测试：锁定排程剔除 ===");

    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, schedule_repo, optimizer) = build_engine(conn);

    wo_repo
        .insert(&make_work_order("FREE", "T1", Priority::Normal, Some(2.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("LOCKED", "T1", Priority::Critical, Some(2.0), 1))
        .unwrap();

    // 建档后手工锁定
    let draft = optimizer
        .create_schedule(create_cmd("T1", "LOCKED"))
        .expect("建档失败");
    {
        let conn = open_test_connection(&db_path).unwrap();
        let conn = conn.lock().unwrap();
        conn.execute(
            "UPDATE production_schedule SET locked = 1 WHERE work_order_id = 'LOCKED'",
            [],
        )
        .unwrap();
    }

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("批量优化失败");

    assert_eq!(outcome.optimized_count, 1, "锁定单不应计入本轮");
    assert_eq!(outcome.schedules[0].work_order_id, "FREE");

    let untouched = schedule_repo.find_by_work_order("LOCKED").unwrap().unwrap();
    assert!(!untouched.is_optimized, "锁定排程不应被改写");
    assert_eq!(untouched.scheduled_start, draft.scheduled_start);

    println!("✓ 锁定排程保持原样");
    println!("=== 测试通过 ===\n");
}

// ==========================================
// 测试用例 8: 既有排程原位更新
// ==========================================

#[test]
fn test_existing_schedule_updated_in_place() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, schedule_repo, optimizer) = build_engine(conn);

    wo_repo
        .insert(&make_work_order("WO-1", "T1", Priority::High, Some(3.0), 0))
        .unwrap();

    let mut cmd = create_cmd("T1", "WO-1");
    cmd.algorithm = ScheduleAlgorithm::Fifo;
    cmd.priority_score = Some(75);
    cmd.required_capacity = Some(40.0);
    cmd.available_capacity = Some(60.0);
    let draft = optimizer.create_schedule(cmd).expect("建档失败");
    assert!(draft.is_draft(), "新档应为未优化草稿");

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::ShortestJob)))
        .expect("批量优化失败");

    let updated = &outcome.schedules[0];
    assert_eq!(updated.id, draft.id, "应原位更新而非另建档案");
    assert_eq!(updated.algorithm, ScheduleAlgorithm::ShortestJob, "算法被请求级覆盖");
    assert!(updated.is_optimized);
    // 非优化产出字段保持原值
    assert_eq!(updated.priority_score, 75);
    assert_eq!(updated.required_capacity, Some(40.0));
    assert_eq!(updated.available_capacity, Some(60.0));
    assert_eq!(updated.earliest_start, draft.earliest_start);

    // 库内仅此一条
    assert_eq!(schedule_repo.list_by_tenant("T1").unwrap().len(), 1);
}

// ==========================================
// 测试用例 9: 新建排程的缺省字段
// ==========================================

#[test]
fn test_new_schedule_defaults_follow_cursor() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    wo_repo
        .insert(&make_work_order("FIRST", "T1", Priority::Normal, Some(2.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("SECOND", "T1", Priority::Normal, Some(2.0), 1))
        .unwrap();

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("批量优化失败");

    let first = &outcome.schedules[0];
    let second = &outcome.schedules[1];

    // 第一单: 边界取游标起点, 窗口 24h; NORMAL 偏移 4h 只影响落位, 不影响边界
    assert_eq!(first.earliest_start, base_time());
    assert_eq!(first.latest_start, base_time() + Duration::hours(24));
    assert_eq!(first.scheduled_start.unwrap(), base_time() + Duration::hours(4));
    assert_eq!(first.priority_score, 50, "NORMAL 映射 50");

    // 第二单: 边界取"处理它时"的游标 (第一单结束 + 1h 换型)
    let cursor_at_second = first.scheduled_end.unwrap() + Duration::hours(1);
    assert_eq!(second.earliest_start, cursor_at_second);
    assert_eq!(
        second.latest_start,
        cursor_at_second + Duration::hours(24)
    );
}

// ==========================================
// 测试用例 10: FIFO/LIFO 预排序
// ==========================================

#[test]
fn test_fifo_and_lifo_presort() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn.clone());

    wo_repo
        .insert(&make_work_order("OLD", "T1", Priority::Normal, Some(1.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("NEW", "T1", Priority::Normal, Some(1.0), 30))
        .unwrap();

    let fifo = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Fifo)))
        .expect("FIFO 优化失败");
    assert_eq!(fifo.schedules[0].work_order_id, "OLD", "FIFO 先排先创建的单");
    assert_eq!(fifo.schedules[1].work_order_id, "NEW");

    let lifo = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Lifo)))
        .expect("LIFO 优化失败");
    assert_eq!(lifo.schedules[0].work_order_id, "NEW", "LIFO 先排后创建的单");
    assert_eq!(lifo.schedules[1].work_order_id, "OLD");

    // 起始规则一致: 区别只在排序
    assert_eq!(
        fifo.schedules[0].scheduled_start,
        lifo.schedules[0].scheduled_start
    );
}

// ==========================================
// 测试用例 11: SHORTEST_JOB 预排序与结束覆盖
// ==========================================

#[test]
fn test_shortest_job_presort_and_end_override() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    wo_repo
        .insert(&make_work_order("LONG", "T1", Priority::Critical, Some(5.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("SHORT", "T1", Priority::Low, Some(1.0), 1))
        .unwrap();
    wo_repo
        .insert(&make_work_order("MID", "T1", Priority::Normal, None, 2))
        .unwrap();

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::ShortestJob)))
        .expect("批量优化失败");

    // 预排序按估算工时升序, 优先级不参与 (MID 缺省 8h 排最后)
    let order: Vec<&str> = outcome
        .schedules
        .iter()
        .map(|s| s.work_order_id.as_str())
        .collect();
    assert_eq!(order, vec!["SHORT", "LONG", "MID"]);

    // 结束时间 = 开始 + 估算工时
    let short = &outcome.schedules[0];
    assert_eq!(
        short.scheduled_end.unwrap() - short.scheduled_start.unwrap(),
        Duration::hours(1)
    );
    let mid = &outcome.schedules[2];
    assert_eq!(
        mid.scheduled_end.unwrap() - mid.scheduled_start.unwrap(),
        Duration::hours(8),
        "估算缺省应为 8 小时"
    );
}

// ==========================================
// 测试用例 12: 逐单算法继承
// ==========================================

#[test]
fn test_per_order_algorithm_inheritance() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    // FIFO 档案单 + 无档案单 (同优先级, 后者无算法 → 缺省 PRIORITY)
    wo_repo
        .insert(&make_work_order("WITH-FIFO", "T1", Priority::Normal, Some(2.0), 0))
        .unwrap();
    wo_repo
        .insert(&make_work_order("BARE", "T1", Priority::Normal, Some(2.0), 1))
        .unwrap();

    let mut cmd = create_cmd("T1", "WITH-FIFO");
    cmd.algorithm = ScheduleAlgorithm::Fifo;
    optimizer.create_schedule(cmd).expect("建档失败");

    // 无请求级覆盖
    let outcome = optimizer
        .optimize(optimize_cmd("T1", None))
        .expect("批量优化失败");

    let with_fifo = outcome
        .schedules
        .iter()
        .find(|s| s.work_order_id == "WITH-FIFO")
        .unwrap();
    let bare = outcome
        .schedules
        .iter()
        .find(|s| s.work_order_id == "BARE")
        .unwrap();

    assert_eq!(with_fifo.algorithm, ScheduleAlgorithm::Fifo, "继承既有档案算法");
    assert_eq!(bare.algorithm, ScheduleAlgorithm::Priority, "无档案缺省 PRIORITY");

    // FIFO 规则: 从游标开始; PRIORITY 规则: NORMAL 偏移 4h
    assert_eq!(with_fifo.scheduled_start.unwrap(), base_time());
    let cursor_at_bare = with_fifo.scheduled_end.unwrap() + Duration::hours(1);
    assert_eq!(
        bare.scheduled_start.unwrap(),
        cursor_at_bare + Duration::hours(4)
    );
}

// ==========================================
// 测试用例 13: 缓冲追加到最终结束时间
// ==========================================

#[test]
fn test_buffer_extends_schedule_end() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开测试库失败");
    let (wo_repo, _schedule_repo, optimizer) = build_engine(conn);

    wo_repo
        .insert(&make_work_order("BUF", "T1", Priority::Critical, Some(4.0), 0))
        .unwrap();

    let mut cmd = create_cmd("T1", "BUF");
    cmd.buffer_hours = Some(2.0);
    optimizer.create_schedule(cmd).expect("建档失败");

    let outcome = optimizer
        .optimize(optimize_cmd("T1", Some(ScheduleAlgorithm::Priority)))
        .expect("批量优化失败");

    let schedule = &outcome.schedules[0];
    assert_eq!(schedule.scheduled_start.unwrap(), base_time());
    assert_eq!(
        schedule.scheduled_end.unwrap(),
        base_time() + Duration::hours(6),
        "结束 = 开始 + 估算4h + 缓冲2h"
    );
}
