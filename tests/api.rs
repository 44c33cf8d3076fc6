use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use serde_json::{Value, json};

use hrm_attendance::config::Config;
use hrm_attendance::model::{
    attendance::AttendanceRecord,
    business_trip::BusinessTrip,
    employee::{Employee, TrackingStartType},
    leave_balance::LeaveBalance,
    leave_request::RequestStatus,
    role::Role,
};
use hrm_attendance::repository::{RecordSource, memory::InMemoryRecords};
use hrm_attendance::routes;
use hrm_attendance::services::conflicts::FailurePolicy;
use hrm_attendance::utils::schedule_cache::ScheduleCache;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn config(policy: FailurePolicy) -> Config {
    Config {
        database_url: "mysql://localhost/hrm".into(),
        server_addr: "127.0.0.1:8080".into(),
        api_prefix: "/api/v1".into(),
        log_dir: "logs".into(),
        rate_protected_per_min: 1000,
        conflict_debounce: Duration::from_millis(300),
        conflict_failure_policy: policy,
        schedule_cache_ttl: Duration::from_secs(300),
    }
}

fn records() -> InMemoryRecords {
    let this_year = Local::now().year();
    InMemoryRecords::new()
        .with_business_trip(BusinessTrip {
            id: 1,
            user_id: 10,
            start_date: d(2024, 3, 1),
            end_date: d(2024, 3, 3),
            status: RequestStatus::Approved,
            destination: "Torino".into(),
        })
        .with_balance(LeaveBalance {
            user_id: 10,
            year: this_year,
            vacation_days_total: 10.0,
            vacation_days_used: 10.0,
            permission_hours_total: 16.0,
            permission_hours_used: 2.0,
        })
        .with_employee(Employee {
            id: 10,
            first_name: "Sara".into(),
            last_name: "Conti".into(),
            email: "sara.conti@company.com".into(),
            role: Role::Employee,
            is_active: true,
            hire_date: Some(d(2020, 1, 15)),
            tracking_start_type: TrackingStartType::FromHireDate,
        })
        .with_employee(Employee {
            id: 11,
            first_name: "Luca".into(),
            last_name: "Neri".into(),
            email: "luca.neri@company.com".into(),
            role: Role::Employee,
            is_active: true,
            hire_date: None,
            tracking_start_type: TrackingStartType::FromHireDate,
        })
        .with_unified_attendance(AttendanceRecord {
            user_id: 10,
            date: Local::now().date_naive(),
            check_in_time: NaiveTime::from_hms_opt(9, 0, 0),
            check_out_time: None,
            is_business_trip: false,
            is_sick_leave: false,
        })
}

macro_rules! app {
    ($source:expr, $policy:expr) => {{
        let source: Arc<dyn RecordSource> = $source;
        test::init_service(
            App::new()
                .app_data(web::Data::from(source))
                .app_data(web::Data::new(ScheduleCache::default()))
                .app_data(web::Data::new(config($policy)))
                .service(web::scope("/api/v1").configure(routes::api_routes)),
        )
        .await
    }};
}

#[actix_web::test]
async fn conflict_dates_lists_every_day_of_an_approved_trip() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::get()
        .uri("/api/v1/conflicts?employee_ids=10&context=business_trip")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let dates = body["dates"].as_array().unwrap();
    assert!(dates.contains(&json!("2024-03-01")));
    assert!(dates.contains(&json!("2024-03-02")));
    assert!(dates.contains(&json!("2024-03-03")));
    assert!(body["error"].is_null());
}

#[actix_web::test]
async fn check_date_answers_for_one_day() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::get()
        .uri("/api/v1/conflicts/check?employee_ids=10&context=overtime&date=2024-03-02")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["disabled"], json!(true));

    let req = test::TestRequest::get()
        .uri("/api/v1/conflicts/check?employee_ids=10&context=overtime&date=2024-03-05")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["disabled"], json!(false));
}

#[actix_web::test]
async fn empty_selection_has_no_conflicts() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::get()
        .uri("/api/v1/conflicts?employee_ids=&context=overtime")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["dates"], json!([]));
}

#[actix_web::test]
async fn unknown_context_is_a_bad_request() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::get()
        .uri("/api/v1/conflicts?employee_ids=10&context=holiday")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn query_failure_is_reported_in_the_body() {
    let source = Arc::new(records());
    source.set_failing(true);
    let app = app!(source, FailurePolicy::FailClosed);

    let req = test::TestRequest::get()
        .uri("/api/v1/conflicts/check?employee_ids=10&context=overtime&date=2024-03-05")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["disabled"], json!(true));
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn exhausted_vacation_balance_rejects_any_range() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/validate")
        .set_json(json!({
            "employee_id": 10,
            "leave_type": "ferie",
            "date_from": "2026-07-06",
            "date_to": "2026-07-07"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["is_valid"], json!(false));
    assert_eq!(body["exceeds_vacation_limit"], json!(true));
    assert_eq!(body["vacation_days_remaining"], json!(0.0));
}

#[actix_web::test]
async fn permission_with_reversed_times_is_rejected() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/validate")
        .set_json(json!({
            "employee_id": 10,
            "leave_type": "permesso",
            "day": "2026-07-06",
            "time_from": "10:00",
            "time_to": "09:00"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["is_valid"], json!(false));
    assert_eq!(body["error_message"], json!("End time must be after start time"));
}

#[actix_web::test]
async fn employee_without_balance_cannot_request_leave() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/validate")
        .set_json(json!({
            "employee_id": 11,
            "leave_type": "permesso",
            "day": "2026-07-06",
            "time_from": "09:00",
            "time_to": "10:00"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["is_valid"], json!(false));
    assert_eq!(body["exceeds_vacation_limit"], json!(true));
    assert_eq!(body["exceeds_permission_limit"], json!(true));
}

#[actix_web::test]
async fn balance_endpoint_reports_remaining_or_not_found() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::get().uri("/api/v1/leave/balance/10").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["vacation_days_remaining"], json!(0.0));
    assert_eq!(body["permission_hours_remaining"], json!(14.0));

    let req = test::TestRequest::get()
        .uri("/api/v1/leave/balance/10?year=1999")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn attendance_stats_for_known_and_unknown_employees() {
    let app = app!(Arc::new(records()), FailurePolicy::FailClosed);

    let req = test::TestRequest::get().uri("/api/v1/attendance/stats/10").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["has_valid_data"], json!(true));
    let first_of_january = format!("{}-01-01", Local::now().year());
    assert_eq!(body["period_start"], json!(first_of_january));

    let req = test::TestRequest::get().uri("/api/v1/attendance/stats/11").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["has_valid_data"], json!(false));
    assert_eq!(body["reason"], json!("missing hire date"));

    let req = test::TestRequest::get().uri("/api/v1/attendance/stats/99").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
