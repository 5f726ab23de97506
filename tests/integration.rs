//! Integration tests for the leave engine.
//!
//! These tests run the services end to end against a `MemoryStore` seeded
//! from `config/default`:
//! - Required day counts for plain, weekend-spanning and sandwich requests
//! - Consecutive leave, balance and half-day rejections
//! - Workflow balance conservation across approve, reject and delete
//! - Reconciliation idempotence and per-employee isolation
//! - Partial validation messages and access scoping

use chrono::NaiveDate;
use leave_engine::access::{AccessContext, DesignationTree, Role, visible_leave_requests};
use leave_engine::config::{ConfigLoader, EngineSettings};
use leave_engine::error::{Adjacency, EngineError};
use leave_engine::models::{
    AllocationRecordId, Designation, Employee, EmployeeId, HalfDayShift, LeaveRequestStatus,
    LeaveTypeId, NewLeaveRequest, WorkShiftAssignment,
};
use leave_engine::services::{
    LeaveBalanceService, LeaveCountUpdateService, LeaveRequestService, LeaveWorkflow,
};
use leave_engine::store::{LeaveStore, MemoryStore};
use leave_engine::submission::LeaveRequestSubmission;
use rust_decimal::Decimal;
use std::str::FromStr;

// =============================================================================
// Test Helpers
// =============================================================================

const CASUAL: LeaveTypeId = 1;
const SICK: LeaveTypeId = 2;
const EARNED: LeaveTypeId = 3;

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn june(d: u32) -> NaiveDate {
    make_date(2026, 6, d)
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/default").expect("Failed to load config")
}

/// Seeds the configured catalogue plus a three-level organisation:
///
/// - Ravi (employee 3, user 30) heads the company
/// - Meera (employee 2, user 20) leads the team and reports to Ravi
/// - Asha (employee 1, user 10) is an engineer reporting to Meera
///
/// Everyone works the General shift. Asha and Meera hold a 2026 allocation
/// with one record per configured leave type, allotted the yearly grant.
fn create_test_store() -> MemoryStore {
    let loader = load_config();
    let mut store = MemoryStore::from_config(loader.config());

    store.insert_designation(Designation {
        id: 1,
        name: "Director".to_string(),
        parent_id: None,
    });
    store.insert_designation(Designation {
        id: 2,
        name: "Team Lead".to_string(),
        parent_id: Some(1),
    });
    store.insert_designation(Designation {
        id: 3,
        name: "Engineer".to_string(),
        parent_id: Some(2),
    });

    store.insert_employee(
        Employee::new(1, "Asha Rao", "EMP-001")
            .with_user(10)
            .with_designation(3)
            .with_manager(2),
    );
    store.insert_employee(
        Employee::new(2, "Meera Iyer", "EMP-002")
            .with_user(20)
            .with_designation(2)
            .with_manager(3),
    );
    store.insert_employee(
        Employee::new(3, "Ravi Kumar", "EMP-003")
            .with_user(30)
            .with_designation(1),
    );

    let general = loader.get_work_shift("general").unwrap().id;
    for employee_id in [1, 2, 3] {
        store.assign_work_shift(WorkShiftAssignment {
            employee_id,
            work_shift_id: general,
            start_date: make_date(2026, 1, 1),
            end_date: None,
        });
    }

    for employee_id in [1, 2] {
        let allocation = store
            .insert_leave_allocation(
                employee_id,
                make_date(2026, 1, 1),
                make_date(2026, 12, 31),
                Some("2026 grant".to_string()),
            )
            .unwrap();
        for leave_type in loader.config().leave_types() {
            store
                .insert_allocation_record(allocation.id, leave_type.id, leave_type.yearly_grant)
                .unwrap();
        }
    }

    store
}

fn record_id(
    store: &MemoryStore,
    employee_id: EmployeeId,
    leave_type_id: LeaveTypeId,
) -> AllocationRecordId {
    LeaveBalanceService::new(store, EngineSettings::default())
        .allocation_record_for(employee_id, leave_type_id, june(1), june(30))
        .unwrap()
        .expect("record exists")
        .id
}

fn used(store: &MemoryStore, employee_id: EmployeeId, leave_type_id: LeaveTypeId) -> Decimal {
    let id = record_id(store, employee_id, leave_type_id);
    store.allocation_record(id).unwrap().unwrap().used
}

fn settings() -> EngineSettings {
    load_config().settings()
}

fn asha() -> AccessContext {
    AccessContext::employee(10, 1)
}

fn admin() -> AccessContext {
    AccessContext::admin(1)
}

fn submission(
    leave_type_id: LeaveTypeId,
    start: NaiveDate,
    end: NaiveDate,
) -> LeaveRequestSubmission {
    LeaveRequestSubmission::new(leave_type_id, start, end).for_employee(1)
}

fn approved(
    store: &mut MemoryStore,
    employee_id: EmployeeId,
    leave_type_id: LeaveTypeId,
    start: NaiveDate,
    end: NaiveDate,
) {
    store
        .insert_leave_request(
            NewLeaveRequest::new(employee_id, leave_type_id, start, end)
                .with_status(LeaveRequestStatus::Approved),
        )
        .unwrap();
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_default_config_loads_catalogue() {
    let loader = load_config();

    assert_eq!(loader.policy().name, "Default Leave Policy");
    assert_eq!(loader.config().leave_types().len(), 4);
    assert!(loader.get_leave_type("earned").unwrap().is_sandwich_type);
    assert!(!loader.get_leave_type("casual").unwrap().is_sandwich_type);

    let settings = loader.settings();
    assert_eq!(settings.working_day_search_limit, 365);
    assert_eq!(settings.half_day_value, dec("0.5"));
    assert!(!settings.fallback_include_weekends);

    let holidays = loader.holidays();
    assert!(holidays.windows(2).all(|w| w[0].from_date <= w[1].from_date));
    assert!(holidays.iter().any(|h| h.name == "Diwali" && h.days() == 2));
}

#[test]
fn test_missing_config_directory_is_reported() {
    let result = ConfigLoader::load("./config/does-not-exist");
    assert!(matches!(result, Err(EngineError::ConfigNotFound { .. })));
}

// =============================================================================
// Required Days
// =============================================================================

#[test]
fn test_week_of_plain_leave_costs_five_days() {
    let store = create_test_store();
    let service = LeaveRequestService::new(&store, settings());

    let result = service
        .validate_leave_request(&submission(CASUAL, june(8), june(12)), None, &asha())
        .unwrap();

    assert_eq!(result.required_days, dec("5"));
    assert_eq!(result.available_days, dec("12"));
    assert_eq!(result.message(), "Leave request validation passed.");
}

#[test]
fn test_plain_leave_over_weekend_skips_weekoffs() {
    let store = create_test_store();
    let service = LeaveRequestService::new(&store, settings());

    let result = service
        .validate_leave_request(&submission(CASUAL, june(12), june(15)), None, &asha())
        .unwrap();

    assert_eq!(result.required_days, dec("2"));
}

#[test]
fn test_sandwich_leave_over_weekend_charges_every_day() {
    let store = create_test_store();
    let service = LeaveRequestService::new(&store, settings());

    let result = service
        .validate_leave_request(&submission(EARNED, june(12), june(15)), None, &asha())
        .unwrap();

    assert_eq!(result.required_days, dec("4"));
}

#[test]
fn test_configured_holiday_is_not_charged() {
    let store = create_test_store();
    let service = LeaveRequestService::new(&store, settings());

    // Holi falls on Wednesday 2026-03-04.
    let result = service
        .validate_leave_request(
            &submission(CASUAL, make_date(2026, 3, 2), make_date(2026, 3, 6)),
            None,
            &asha(),
        )
        .unwrap();

    assert_eq!(result.required_days, dec("4"));
}

#[test]
fn test_half_day_costs_configured_value() {
    let store = create_test_store();
    let service = LeaveRequestService::new(&store, settings());

    let result = service
        .validate_leave_request(
            &submission(CASUAL, june(9), june(9)).half_day(HalfDayShift::Forenoon),
            None,
            &asha(),
        )
        .unwrap();

    assert_eq!(result.required_days, dec("0.5"));
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_different_type_on_adjacent_working_day_is_rejected() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(8), june(9));
    let service = LeaveRequestService::new(&store, settings());

    let result =
        service.validate_leave_request(&submission(SICK, june(10), june(10)), None, &asha());

    match result {
        Err(EngineError::ConsecutiveLeaveTypeConflict {
            direction: Adjacency::Previous,
            adjacent_day,
            requested_type,
            conflicts,
        }) => {
            assert_eq!(adjacent_day, june(9));
            assert_eq!(requested_type, "Sick Leave");
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].leave_type_name, "Casual Leave");
        }
        other => panic!("Expected consecutive leave conflict, got {:?}", other),
    }
}

#[test]
fn test_adjacency_is_measured_in_working_days() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(15), june(15));
    let service = LeaveRequestService::new(&store, settings());

    // Friday's next working day is the following Monday.
    let result =
        service.validate_leave_request(&submission(SICK, june(12), june(12)), None, &asha());

    assert!(matches!(
        result,
        Err(EngineError::ConsecutiveLeaveTypeConflict {
            direction: Adjacency::Next,
            ..
        })
    ));
}

#[test]
fn test_same_type_on_adjacent_working_day_is_allowed() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(8), june(9));
    let service = LeaveRequestService::new(&store, settings());

    let result =
        service.validate_leave_request(&submission(CASUAL, june(10), june(10)), None, &asha());

    assert!(result.is_ok());
}

#[test]
fn test_insufficient_balance_reports_required_and_available() {
    let mut store = create_test_store();
    let sick = record_id(&store, 1, SICK);
    store.set_used(sick, dec("3")).unwrap();
    let service = LeaveRequestService::new(&store, settings());

    // June 1-10 holds eight working days.
    let result =
        service.validate_leave_request(&submission(SICK, june(1), june(10)), None, &asha());

    match result {
        Err(EngineError::InsufficientBalance {
            required,
            available,
        }) => {
            assert_eq!(required, dec("8"));
            assert_eq!(available, dec("7"));
        }
        other => panic!("Expected insufficient balance, got {:?}", other),
    }
}

#[test]
fn test_half_day_across_dates_is_rejected_before_anything_else() {
    let store = create_test_store();
    let service = LeaveRequestService::new(&store, settings());

    let submission = LeaveRequestSubmission {
        start_date: Some(june(8)),
        end_date: Some(june(9)),
        is_half_date: true,
        ..LeaveRequestSubmission::default()
    };

    let result = service.validate_leave_request(&submission, None, &AccessContext::system());
    assert!(matches!(
        result,
        Err(EngineError::InvalidHalfDayConfig { .. })
    ));
}

#[test]
fn test_overlapping_request_is_rejected_with_conflicts() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(10), june(11));
    let service = LeaveRequestService::new(&store, settings());

    let result =
        service.validate_leave_request(&submission(CASUAL, june(8), june(12)), None, &asha());

    match result {
        Err(EngineError::Overlap { conflicts }) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].start_date, june(10));
        }
        other => panic!("Expected overlap, got {:?}", other),
    }
}

// =============================================================================
// Partial Validation
// =============================================================================

#[test]
fn test_partial_validation_messages() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(10), june(11));
    let service = LeaveRequestService::new(&store, settings());

    let incomplete = LeaveRequestSubmission {
        leave_type_id: Some(CASUAL),
        ..LeaveRequestSubmission::default()
    };
    let outcome = service.validate_leave_request_partial(&incomplete, None, &asha());
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Insufficient data for validation.");

    let outcome = service.validate_leave_request_partial(
        &submission(CASUAL, june(8), june(12)),
        None,
        &asha(),
    );
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Overlapping leave found: "));

    let outcome = service.validate_leave_request_partial(
        &LeaveRequestSubmission::new(CASUAL, june(8), june(8)).for_employee(99),
        None,
        &AccessContext::system(),
    );
    assert_eq!(outcome.message, "Employee not found.");

    let outcome = service.validate_leave_request_partial(
        &submission(CASUAL, june(22), june(23)),
        None,
        &asha(),
    );
    assert!(outcome.success);
    assert_eq!(outcome.message, "Validation passed.");
    assert_eq!(outcome.required_days, Some(dec("2")));
    assert_eq!(outcome.available_days, Some(dec("12")));
}

// =============================================================================
// Workflow
// =============================================================================

#[test]
fn test_approve_then_delete_restores_balance() {
    let mut store = create_test_store();
    let workflow = LeaveWorkflow::new(settings());

    let submitted = workflow
        .submit(&mut store, &asha(), &submission(CASUAL, june(8), june(12)))
        .unwrap();
    assert_eq!(submitted.request.approver_user_id, Some(20));
    assert_eq!(used(&store, 1, CASUAL), Decimal::ZERO);

    let manager = AccessContext::manager(20, Some(2), [1]);
    let decided = workflow
        .decide(
            &mut store,
            &manager,
            submitted.request.id,
            LeaveRequestStatus::Approved,
            "Approved",
        )
        .unwrap();
    assert_eq!(decided.net_days(), dec("5"));
    assert_eq!(used(&store, 1, CASUAL), dec("5"));

    let deleted = workflow
        .delete(&mut store, &admin(), submitted.request.id)
        .unwrap();
    assert_eq!(deleted.net_days(), dec("-5"));
    assert_eq!(used(&store, 1, CASUAL), Decimal::ZERO);
    assert!(store.leave_requests().unwrap().is_empty());
}

#[test]
fn test_rejected_request_never_touches_balance() {
    let mut store = create_test_store();
    let workflow = LeaveWorkflow::new(settings());

    let submitted = workflow
        .submit(&mut store, &asha(), &submission(CASUAL, june(8), june(9)))
        .unwrap();
    let decided = workflow
        .decide(
            &mut store,
            &admin(),
            submitted.request.id,
            LeaveRequestStatus::Rejected,
            "Project deadline",
        )
        .unwrap();

    assert!(decided.adjustments.is_empty());
    assert_eq!(decided.request.approver_comment.as_deref(), Some("Project deadline"));
    assert_eq!(used(&store, 1, CASUAL), Decimal::ZERO);
}

#[test]
fn test_only_assigned_approver_may_decide() {
    let mut store = create_test_store();
    let workflow = LeaveWorkflow::new(settings());

    let submitted = workflow
        .submit(&mut store, &asha(), &submission(CASUAL, june(8), june(9)))
        .unwrap();

    let result = workflow.decide(
        &mut store,
        &asha(),
        submitted.request.id,
        LeaveRequestStatus::Approved,
        "Self-approved",
    );
    assert!(matches!(result, Err(EngineError::PermissionDenied { .. })));
}

#[test]
fn test_failed_decision_rolls_back() {
    let mut store = create_test_store();
    let workflow = LeaveWorkflow::new(settings());
    let request = store
        .insert_leave_request(NewLeaveRequest::new(1, 9, june(8), june(8)))
        .unwrap();

    let result = workflow.decide(
        &mut store,
        &admin(),
        request.id,
        LeaveRequestStatus::Approved,
        "Approved",
    );

    assert!(matches!(result, Err(EngineError::NotFound { .. })));
    let stored = store.leave_request(request.id).unwrap().unwrap();
    assert_eq!(stored.status, LeaveRequestStatus::Requested);
    assert_eq!(stored.approver_comment, None);
}

// =============================================================================
// Reconciliation
// =============================================================================

#[test]
fn test_reconciliation_repairs_drift_and_is_idempotent() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(8), june(12));
    approved(&mut store, 1, EARNED, june(19), june(22));
    approved(&mut store, 2, SICK, june(3), june(3));
    store.set_used(record_id(&store, 1, CASUAL), dec("9")).unwrap();

    let service = LeaveCountUpdateService::new(settings());
    let first = service.recalculate_all(&mut store).unwrap();
    assert!(first.is_success());
    assert_eq!(first.exit_code(), 0);
    assert_eq!(first.total, 3);

    assert_eq!(used(&store, 1, CASUAL), dec("5"));
    assert_eq!(used(&store, 1, EARNED), dec("4"));
    assert_eq!(used(&store, 2, SICK), dec("1"));

    let snapshot: Vec<Decimal> = [(1, CASUAL), (1, EARNED), (2, SICK)]
        .iter()
        .map(|&(e, t)| used(&store, e, t))
        .collect();
    let recounts = service.recalculate_used_counts_for_employee(&mut store, 1).unwrap();
    assert!(recounts.iter().all(|r| !r.changed()));

    service.recalculate_all(&mut store).unwrap();
    let again: Vec<Decimal> = [(1, CASUAL), (1, EARNED), (2, SICK)]
        .iter()
        .map(|&(e, t)| used(&store, e, t))
        .collect();
    assert_eq!(snapshot, again);
}

#[test]
fn test_reconciliation_failure_is_isolated_per_employee() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(8), june(9));

    // Ravi's approved leave references a leave type that was removed.
    let allocation = store
        .insert_leave_allocation(3, make_date(2026, 1, 1), make_date(2026, 12, 31), None)
        .unwrap();
    let orphan = store
        .insert_allocation_record(allocation.id, 9, dec("5"))
        .unwrap();
    store.set_used(orphan.id, dec("1")).unwrap();
    approved(&mut store, 3, 9, june(8), june(8));

    let report = LeaveCountUpdateService::new(settings())
        .recalculate_all(&mut store)
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].employee_id, 3);
    assert_eq!(report.exit_code(), 1);

    assert_eq!(used(&store, 1, CASUAL), dec("2"));
    let orphan = store.allocation_record(orphan.id).unwrap().unwrap();
    assert_eq!(orphan.used, dec("1"));
}

// =============================================================================
// Access
// =============================================================================

#[test]
fn test_visibility_follows_designation_tree() {
    let mut store = create_test_store();
    approved(&mut store, 1, CASUAL, june(8), june(8));
    approved(&mut store, 2, CASUAL, june(15), june(15));
    approved(&mut store, 3, CASUAL, june(22), june(22));

    let tree = DesignationTree::from_store(&store).unwrap();

    let ravi = AccessContext::resolve(&store, 30, Role::Manager, &tree).unwrap();
    assert_eq!(visible_leave_requests(&store, &ravi).unwrap().len(), 3);

    let meera = AccessContext::resolve(&store, 20, Role::Manager, &tree).unwrap();
    let visible: Vec<EmployeeId> = visible_leave_requests(&store, &meera)
        .unwrap()
        .iter()
        .map(|r| r.employee_id)
        .collect();
    assert_eq!(visible, vec![1, 2]);

    let asha = AccessContext::resolve(&store, 10, Role::Employee, &tree).unwrap();
    let visible = visible_leave_requests(&store, &asha).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].employee_id, 1);
    assert!(!asha.can_access(2));
}
