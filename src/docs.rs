use crate::api::conflicts::{ConflictQuery, DateCheckQuery, DateCheckResponse};
use crate::model::{
    employee::{Employee, TrackingStartType},
    leave_balance::LeaveBalance,
    leave_request::LeaveType,
    role::Role,
    work_schedule::WorkSchedule,
};
use crate::services::{
    attendance_stats::AttendanceStats,
    balance::{BalanceSummary, LeaveValidationRequest, ValidationResult},
    conflicts::{ConflictContext, ConflictSet},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance Validation API",
        version = "0.1.0",
        description = r#"
## Attendance & leave validation

Read-only checks used by the HR portal before a record is created.

### 🔹 Key Features
- **Conflict dates**
  - Days on which any selected employee is already committed (business trip, leave, sick leave, attendance)
- **Leave balance validation**
  - Vacation days (`ferie`) and permission hours (`permesso`) against the yearly entitlement
- **Attendance statistics**
  - Presence percentage since hire date or start of year, per work schedule

### 📦 Response Format
- JSON responses, dates as `YYYY-MM-DD`
- Validation failures are returned in the body with status 200

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::conflicts::conflict_dates,
        crate::api::conflicts::check_date,

        crate::api::leave_request::validate_leave,
        crate::api::leave_request::leave_balance,

        crate::api::attendance::attendance_stats
    ),
    components(
        schemas(
            ConflictQuery,
            DateCheckQuery,
            DateCheckResponse,
            ConflictContext,
            ConflictSet,
            LeaveType,
            LeaveValidationRequest,
            ValidationResult,
            LeaveBalance,
            BalanceSummary,
            AttendanceStats,
            Employee,
            Role,
            TrackingStartType,
            WorkSchedule
        )
    ),
    tags(
        (name = "Conflicts", description = "Blocked-date computation"),
        (name = "Leave", description = "Leave balance validation"),
        (name = "Attendance", description = "Attendance statistics"),
    )
)]
pub struct ApiDoc;
