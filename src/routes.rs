use crate::{
    api::{attendance, conflicts, health, leave_request},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Helper to build the per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(health);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .configure(api_routes),
    );
}

/// Validation endpoints, mounted under the API prefix.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/conflicts")
            // /conflicts
            .service(web::resource("").route(web::get().to(conflicts::conflict_dates)))
            // /conflicts/check
            .service(web::resource("/check").route(web::get().to(conflicts::check_date))),
    )
    .service(
        web::scope("/leave")
            // /leave/validate
            .service(
                web::resource("/validate").route(web::post().to(leave_request::validate_leave)),
            )
            // /leave/balance/{employee_id}
            .service(
                web::resource("/balance/{employee_id}")
                    .route(web::get().to(leave_request::leave_balance)),
            ),
    )
    .service(
        web::scope("/attendance")
            // /attendance/stats/{employee_id}
            .service(
                web::resource("/stats/{employee_id}")
                    .route(web::get().to(attendance::attendance_stats)),
            ),
    );
}

// FORM OPENS
//  └─ GET /conflicts?employee_ids=..&context=..   (debounced by the client)
//       └─ dates → disabled in the date picker

// FORM SUBMIT (leave)
//  └─ POST /leave/validate
//       └─ is_valid == false → inline error_message

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_builds_for_any_quota() {
        for per_min in [0, 1, 1000, 120_000] {
            let _ = build_limiter(per_min);
        }
    }
}
