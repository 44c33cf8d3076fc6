use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ServiceError;
use crate::repository::RecordSource;
use crate::services::balance::{BalanceSummary, LeaveValidationRequest, ValidationResult, validate_for_employee};

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Calendar year, defaults to the current one
    pub year: Option<i32>,
}

/// Check a leave request against the employee's remaining balance
#[utoipa::path(
    post,
    path = "/api/v1/leave/validate",
    request_body(
        content = LeaveValidationRequest,
        description = "Proposed leave request",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Validation outcome; `is_valid` tells whether the request fits", body = ValidationResult),
        (status = 400, description = "Bad request")
    ),
    tag = "Leave"
)]
pub async fn validate_leave(
    source: web::Data<dyn RecordSource>,
    payload: web::Json<LeaveValidationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let year = Local::now().year();
    let result = validate_for_employee(source.get_ref(), &payload, year).await;
    Ok(HttpResponse::Ok().json(result))
}

/// Remaining vacation days and permission hours of an employee
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose balance is requested"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Balance found", body = BalanceSummary),
        (status = 404, description = "No balance configured for the year", body = Object, example = json!({
            "message": "No leave balance configured for 2026"
        }))
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    source: web::Data<dyn RecordSource>,
    path: web::Path<u64>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = path.into_inner();
    let year = query.year.unwrap_or_else(|| Local::now().year());

    let balance = source.leave_balance(employee_id, year).await?;

    match balance {
        Some(balance) => Ok(HttpResponse::Ok().json(BalanceSummary::from(balance))),
        None => Err(ServiceError::NotFound(format!(
            "No leave balance configured for {}",
            year
        ))),
    }
}
