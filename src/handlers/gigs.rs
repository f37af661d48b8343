use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::models::gigs::{CreateGig, GigListQuery, UpdateGig};
use crate::services::gigs as gig_service;

/// GET /api/gigs: public feed of gigs, open ones by default.
pub async fn get_gigs(
    db: web::Data<DatabaseConnection>,
    query: web::Query<GigListQuery>,
) -> Result<HttpResponse, AppError> {
    let page = gig_service::list_gigs(db.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/gigs/my-gigs: every gig the caller owns.
pub async fn get_my_gigs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let gigs = gig_service::list_gigs_by_owner(db.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(gigs))
}

/// GET /api/gigs/{id}: a single gig (public).
pub async fn get_gig(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let gig = gig_service::get_gig(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(gig))
}

/// POST /api/gigs: post a new gig owned by the caller.
pub async fn create_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateGig>,
) -> Result<HttpResponse, AppError> {
    let gig = gig_service::create_gig(db.get_ref(), user.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(gig))
}

/// PUT /api/gigs/{id}: owner edit, including cancel and complete.
pub async fn update_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateGig>,
) -> Result<HttpResponse, AppError> {
    let gig =
        gig_service::update_gig(db.get_ref(), path.into_inner(), user.id, body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(gig))
}

/// DELETE /api/gigs/{id}: delete a gig and its bids.
pub async fn delete_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    gig_service::delete_gig(db.get_ref(), id, user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Gig {id} deleted"),
    })))
}
