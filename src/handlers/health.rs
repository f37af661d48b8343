use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::db;

/// GET /api/health: liveness plus a store round trip.
pub async fn health(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match db::ping(db.get_ref()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "database": "up",
        })),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unreachable");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "degraded",
                "database": "down",
            }))
        }
    }
}
