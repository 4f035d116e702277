use crate::{
    api::{attendance, daily_report, settings},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("non-zero period and burst size");
        Governor::new(&cfg)
    }

    let cron_limiter = Arc::new(build_limiter(config.rate_cron_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Scheduler trigger: shared secret instead of JWT, registered before the
    // protected scope so the /api prefix doesn't swallow it
    cfg.service(
        web::resource("/api/cron/daily-report")
            .wrap(cron_limiter)
            .route(web::get().to(daily_report::trigger_daily_report)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/leave").route(web::post().to(attendance::record_leave)),
                    ),
            )
            .service(
                web::scope("/reports").service(
                    web::resource("/daily").route(web::get().to(daily_report::preview_daily_report)),
                ),
            )
            .service(
                web::resource("/settings")
                    .route(web::get().to(settings::get_settings))
                    .route(web::put().to(settings::update_settings)),
            ),
    );
}

// CRON
//  └─ GET /api/cron/daily-report
//       └─ Authorization: Bearer CRON_SECRET

// DASHBOARD
//  └─ Authorization: Bearer <jwt from auth provider>
