use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::ServiceError;
use crate::repository::RecordSource;
use crate::services::conflicts::{ConflictContext, ConflictSet, compute_conflict_dates};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ConflictQuery {
    /// Comma-separated employee ids, e.g. `12,40`
    #[schema(example = "12,40")]
    pub employee_ids: Option<String>,
    /// business_trip | manual_attendance | overtime
    #[schema(example = "overtime")]
    pub context: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DateCheckQuery {
    /// Comma-separated employee ids, e.g. `12,40`
    #[schema(example = "12,40")]
    pub employee_ids: Option<String>,
    /// business_trip | manual_attendance | overtime
    #[schema(example = "business_trip")]
    pub context: String,
    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DateCheckResponse {
    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = true)]
    pub disabled: bool,
    #[schema(example = json!(null))]
    pub error: Option<String>,
}

/// Parses `1,2, 3` into ids. Blank input is an empty selection.
pub fn parse_employee_ids(raw: Option<&str>) -> Result<Vec<u64>, ServiceError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| ServiceError::BadRequest(format!("Invalid employee id: {}", s)))
        })
        .collect()
}

fn parse_context(raw: &str) -> Result<ConflictContext, ServiceError> {
    raw.parse().map_err(|_| {
        ServiceError::BadRequest(
            "Invalid context. Allowed: business_trip, manual_attendance, overtime".to_string(),
        )
    })
}

/// Blocked dates for the selected employees
#[utoipa::path(
    get,
    path = "/api/v1/conflicts",
    params(ConflictQuery),
    responses(
        (status = 200, description = "Blocked dates; `error` is set when the records could not be loaded", body = ConflictSet),
        (status = 400, description = "Invalid employee ids or context", body = Object, example = json!({
            "message": "Invalid context. Allowed: business_trip, manual_attendance, overtime"
        }))
    ),
    tag = "Conflicts"
)]
pub async fn conflict_dates(
    source: web::Data<dyn RecordSource>,
    config: web::Data<Config>,
    query: web::Query<ConflictQuery>,
) -> Result<HttpResponse, ServiceError> {
    let employee_ids = parse_employee_ids(query.employee_ids.as_deref())?;
    let context = parse_context(&query.context)?;

    let set = compute_conflict_dates(
        source.get_ref(),
        &employee_ids,
        context,
        config.conflict_failure_policy,
    )
    .await;

    Ok(HttpResponse::Ok().json(set))
}

/// Whether one date is unavailable for the selected employees
#[utoipa::path(
    get,
    path = "/api/v1/conflicts/check",
    params(DateCheckQuery),
    responses(
        (status = 200, description = "Availability of the date", body = DateCheckResponse),
        (status = 400, description = "Invalid employee ids, context or date")
    ),
    tag = "Conflicts"
)]
pub async fn check_date(
    source: web::Data<dyn RecordSource>,
    config: web::Data<Config>,
    query: web::Query<DateCheckQuery>,
) -> Result<HttpResponse, ServiceError> {
    let employee_ids = parse_employee_ids(query.employee_ids.as_deref())?;
    let context = parse_context(&query.context)?;

    let set = compute_conflict_dates(
        source.get_ref(),
        &employee_ids,
        context,
        config.conflict_failure_policy,
    )
    .await;

    Ok(HttpResponse::Ok().json(DateCheckResponse {
        date: query.date,
        disabled: set.is_date_disabled(query.date),
        error: set.error,
    }))
}
