use actix_web::{web::Data, HttpResponse};
use serde::Serialize;

use crate::{cache::CachePool, database, DbPool};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    status: &'static str,
    services: Services,
}

#[derive(Debug, Serialize)]
struct Services {
    database: String,
    redis: String,
}

impl HealthReport {
    /// Overall status is `ok` only if every dependency reports healthy.
    fn new(database: String, redis: String) -> Self {
        let status = if database == "ok" && redis == "ok" {
            "ok"
        } else {
            "degraded"
        };
        Self {
            status,
            services: Services { database, redis },
        }
    }
}

/// Probes both pools live on every request; no prior result is cached.
#[tracing::instrument(name = "Reporting service health", skip_all)]
pub async fn report_health(pool: Data<DbPool>, cache: Data<CachePool>) -> HttpResponse {
    let database = service_status(database::health_check(&pool).await);
    let redis = service_status(cache.health_check().await);
    HttpResponse::Ok().json(HealthReport::new(database, redis))
}

fn service_status<E: std::fmt::Display>(probe: Result<(), E>) -> String {
    match probe {
        Ok(()) => "ok".into(),
        Err(e) => format!("error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_ok_only_when_both_probes_succeed() {
        let report = HealthReport::new("ok".into(), "ok".into());
        assert_eq!(report.status, "ok");
    }

    #[test]
    fn a_single_failing_probe_degrades_the_report() {
        let report = HealthReport::new("ok".into(), "error: connection refused".into());
        assert_eq!(report.status, "degraded");
        assert_eq!(report.services.redis, "error: connection refused");
        assert_eq!(report.services.database, "ok");

        let report = HealthReport::new("error: timed out".into(), "ok".into());
        assert_eq!(report.status, "degraded");
    }

    #[test]
    fn probe_errors_are_rendered_with_their_message() {
        let probe: Result<(), &str> = Err("connection refused");
        assert_eq!(service_status(probe), "error: connection refused");
        assert_eq!(service_status::<&str>(Ok(())), "ok");
    }
}
