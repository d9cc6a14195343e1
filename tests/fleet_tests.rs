use agv_fleet::adapters::outbound::{init_noop_logger, MemoryLogger};
use agv_fleet::common::DomainEvent;
use agv_fleet::domains::fleet::{AgvStatus, FleetEvent, FleetStatistics, Scheduler, Task, TaskStatus};
use agv_fleet::domains::path_planning::{path_cost, Coord, GridMap, PathCost};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

fn warehouse_scheduler(starts: &[Coord]) -> Scheduler {
    let mut scheduler = Scheduler::new(
        "test-fleet".to_string(),
        Arc::new(GridMap::warehouse()),
        init_noop_logger(),
    );
    for start in starts {
        scheduler.add_agv(*start).unwrap();
    }
    scheduler.mark_events_as_committed();
    scheduler
}

fn run_until_idle(scheduler: &mut Scheduler, limit: usize) -> usize {
    let mut ticks = 0;
    while scheduler.tick() {
        ticks += 1;
        assert!(ticks <= limit, "fleet still moving after {} ticks", limit);
    }
    ticks
}

#[test]
fn test_single_agv_takes_both_legs() {
    let mut scheduler = warehouse_scheduler(&[c(0, 0)]);
    let task = Task::new(0, c(0, 3), c(8, 8)).unwrap();

    assert!(scheduler.assign_task(task));

    let finder = scheduler.path_finder();
    let expected = path_cost(&finder.find_path(c(0, 0), c(0, 3)))
        + path_cost(&finder.find_path(c(0, 3), c(8, 8)));
    let agv = scheduler.agv(0).unwrap();
    assert_eq!(agv.status(), AgvStatus::MovingToPickup);
    assert_eq!(PathCost::Steps(agv.current_path().len()), expected);
    assert_eq!(agv.current_path().back(), Some(&c(8, 8)));
    assert_eq!(agv.target_position(), Some(c(0, 3)));

    let task = scheduler.task(0).unwrap();
    assert_eq!(task.status(), TaskStatus::InProgress);
    assert_eq!(task.assigned_agv(), Some(0));
}

#[test]
fn test_ticks_carry_task_to_completion() {
    let mut scheduler = warehouse_scheduler(&[c(0, 0)]);
    assert!(scheduler.assign_task(Task::new(0, c(0, 3), c(8, 8)).unwrap()));
    let route_len = scheduler.agv(0).unwrap().current_path().len();

    let mut saw_delivery_leg = false;
    let mut ticks = 0;
    while scheduler.tick() {
        ticks += 1;
        let agv = scheduler.agv(0).unwrap();
        if agv.position() == c(0, 3) {
            assert_eq!(agv.status(), AgvStatus::MovingToDelivery);
            saw_delivery_leg = true;
        }
    }

    assert!(saw_delivery_leg);
    assert_eq!(ticks, route_len);
    let agv = scheduler.agv(0).unwrap();
    assert_eq!(agv.status(), AgvStatus::Idle);
    assert_eq!(agv.position(), c(8, 8));
    assert!(agv.current_path().is_empty());
    assert_eq!(agv.path_history().len(), route_len + 1);
    assert_eq!(scheduler.task(0).unwrap().status(), TaskStatus::Completed);
    assert!(scheduler.task(0).unwrap().completed_at().is_some());

    // Nothing left to do.
    assert!(!scheduler.tick());
}

#[test]
fn test_occupied_positions_and_planning_around_fleet() {
    let scheduler = warehouse_scheduler(&[c(0, 0), c(0, 1)]);
    let occupied = scheduler.occupied_positions();
    assert_eq!(occupied, [c(0, 0), c(0, 1)].into_iter().collect::<HashSet<_>>());

    let path = scheduler
        .path_finder()
        .find_path_avoiding_agents(c(0, 0), c(0, 2), &occupied);
    assert_eq!(path.first(), Some(&c(0, 0)));
    assert_eq!(path.last(), Some(&c(0, 2)));
    assert!(!path.contains(&c(0, 1)));
}

#[test]
fn test_exactly_one_agv_leaves_idle_and_nearest_wins() {
    let mut scheduler = warehouse_scheduler(&[c(8, 0), c(0, 0), c(0, 8)]);

    assert!(scheduler.assign_task(Task::new(5, c(1, 0), c(1, 4)).unwrap()));

    let busy: Vec<_> = scheduler.agvs().iter().filter(|a| !a.is_idle()).collect();
    assert_eq!(busy.len(), 1);
    assert_eq!(busy[0].id, 1);
    assert_eq!(scheduler.idle_agvs().len(), 2);
}

#[test]
fn test_busy_agv_is_never_reassigned() {
    let mut scheduler = warehouse_scheduler(&[c(0, 0), c(8, 8)]);

    assert!(scheduler.assign_task(Task::new(0, c(0, 2), c(1, 8)).unwrap()));
    assert!(scheduler.assign_task(Task::new(1, c(0, 1), c(1, 0)).unwrap()));

    // AGV 0 is closer to the second task but already busy.
    assert_eq!(scheduler.task(0).unwrap().assigned_agv(), Some(0));
    assert_eq!(scheduler.task(1).unwrap().assigned_agv(), Some(1));
    assert!(scheduler.idle_agvs().is_empty());

    assert!(!scheduler.assign_task(Task::new(2, c(2, 0), c(2, 1)).unwrap()));
    assert_eq!(scheduler.task(2).unwrap().status(), TaskStatus::Pending);
    assert_eq!(scheduler.task(2).unwrap().assigned_agv(), None);
}

#[test]
fn test_pending_task_is_picked_up_on_retry() {
    let memory = Arc::new(MemoryLogger::new());
    let mut scheduler = Scheduler::new(
        "retry".to_string(),
        Arc::new(GridMap::warehouse()),
        memory.clone(),
    );
    scheduler.add_agv(c(0, 0)).unwrap();

    assert!(scheduler.assign_task(Task::new(0, c(0, 1), c(0, 2)).unwrap()));
    assert!(!scheduler.assign_task(Task::new(1, c(1, 0), c(2, 0)).unwrap()));
    assert_eq!(scheduler.retry_pending(), 0);

    run_until_idle(&mut scheduler, 10);
    assert_eq!(scheduler.retry_pending(), 1);
    assert_eq!(scheduler.task(1).unwrap().status(), TaskStatus::InProgress);
    assert_eq!(scheduler.retry_pending(), 0);
    assert!(memory.contains("Task 1 left pending"));
}

#[test]
fn test_pickup_under_the_agv_starts_on_delivery_leg() {
    let mut scheduler = warehouse_scheduler(&[c(0, 0)]);

    assert!(scheduler.assign_task(Task::new(0, c(0, 0), c(0, 2)).unwrap()));

    let agv = scheduler.agv(0).unwrap();
    assert_eq!(agv.status(), AgvStatus::MovingToDelivery);
    assert_eq!(agv.target_position(), Some(c(0, 2)));
    assert_eq!(agv.current_path().len(), 2);

    assert_eq!(run_until_idle(&mut scheduler, 5), 2);
    assert_eq!(scheduler.task(0).unwrap().status(), TaskStatus::Completed);
}

#[test]
fn test_events_fold_into_statistics() {
    let mut scheduler = warehouse_scheduler(&[c(0, 0)]);
    let mut statistics = FleetStatistics::new();

    assert!(scheduler.assign_task(Task::new(0, c(0, 1), c(0, 3)).unwrap()));
    assert!(!scheduler.assign_task(Task::new(1, c(2, 0), c(2, 1)).unwrap()));
    run_until_idle(&mut scheduler, 10);

    let events = scheduler.take_uncommitted_events();
    assert!(scheduler.uncommitted_events().is_empty());
    assert!(events
        .iter()
        .any(|e| matches!(e, FleetEvent::PickupReached { at, .. } if *at == c(0, 1))));
    for event in &events {
        statistics.apply_event(event);
    }

    assert_eq!(statistics.tasks_submitted, 2);
    assert_eq!(statistics.tasks_assigned, 1);
    assert_eq!(statistics.tasks_deferred, 1);
    assert_eq!(statistics.tasks_completed, 1);
    assert_eq!(statistics.cells_travelled, 3);
    assert_eq!(statistics.deliveries_per_agv.get(&0), Some(&1));
    assert_eq!(statistics.tasks_in_flight(), 0);
    assert_eq!(statistics.last_activity, events.last().map(|e| e.occurred_at()));
}

#[test]
fn test_random_fleet_uses_distinct_free_cells() {
    let map = Arc::new(GridMap::warehouse());
    let mut rng = StdRng::seed_from_u64(7);
    let scheduler =
        Scheduler::with_random_fleet("random".to_string(), map.clone(), 15, &mut rng, init_noop_logger())
            .unwrap();

    assert_eq!(scheduler.agvs().len(), 15);
    assert_eq!(scheduler.occupied_positions().len(), 15);
    assert!(scheduler.agvs().iter().all(|a| map.is_valid(a.position()) && a.is_idle()));

    let mut rng = StdRng::seed_from_u64(7);
    assert!(
        Scheduler::with_random_fleet("too-many".to_string(), map, 70, &mut rng, init_noop_logger())
            .is_err()
    );
}

#[test]
fn test_add_agv_rejects_bad_starts() {
    let mut scheduler = warehouse_scheduler(&[c(0, 0)]);
    assert!(scheduler.add_agv(c(0, 0)).is_err());
    assert!(scheduler.add_agv(c(4, 2)).is_err());
    assert!(scheduler.add_agv(c(9, 0)).is_err());
    assert_eq!(scheduler.add_agv(c(1, 1)).unwrap(), 1);
}

#[test]
fn test_snapshot_reflects_roster_and_ledger() {
    let mut scheduler = warehouse_scheduler(&[c(0, 0), c(8, 0)]);
    assert!(scheduler.assign_task(Task::new(3, c(0, 2), c(0, 4)).unwrap()));
    scheduler.tick();

    let snapshot = scheduler.snapshot();
    assert_eq!(snapshot.agvs.len(), 2);
    assert_eq!(snapshot.agvs[0].position, c(0, 1));
    assert_eq!(snapshot.agvs[0].path, vec![c(0, 2), c(0, 3), c(0, 4)]);
    assert_eq!(snapshot.agvs[1].status, AgvStatus::Idle);
    assert_eq!(snapshot.tasks[0].assigned_agv, Some(0));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["agvs"][0]["status"], "to_pickup");
    assert_eq!(json["agvs"][0]["position"], serde_json::json!([0, 1]));
    assert_eq!(json["tasks"][0]["status"], "in_progress");
}

#[test]
fn test_cost_tie_goes_to_earlier_roster_entry() {
    let task = Task::new(0, c(2, 2), c(2, 4)).unwrap();
    let open_scheduler = |starts: [Coord; 2]| {
        let mut scheduler = Scheduler::new(
            "tie".to_string(),
            Arc::new(GridMap::open(5).unwrap()),
            init_noop_logger(),
        );
        for start in starts {
            scheduler.add_agv(start).unwrap();
        }
        scheduler
    };

    let west_first = open_scheduler([c(0, 2), c(4, 2)]);
    assert_eq!(west_first.select_best_agv(&task), Some(0));

    let mut east_first = open_scheduler([c(4, 2), c(0, 2)]);
    assert_eq!(east_first.select_best_agv(&task), Some(0));
    assert!(east_first.assign_task(task));
    assert_eq!(east_first.agv(0).unwrap().current_path().front(), Some(&c(3, 2)));
    assert!(east_first.agv(1).unwrap().is_idle());
}
