use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::models::bids::{CreateBid, UpdateBidStatus};
use crate::notify::Notifier;
use crate::services::bids as bid_service;
use crate::services::hire;

/// POST /api/bids: place a bid as the caller.
pub async fn create_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateBid>,
) -> Result<HttpResponse, AppError> {
    let bid = bid_service::create_bid(db.get_ref(), user.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(bid))
}

/// GET /api/bids/my-bids: the caller's bids with their gigs.
pub async fn get_my_bids(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let bids = bid_service::list_bids_for_freelancer(db.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(bids))
}

/// GET /api/bids/gig/{gig_id}: bids on one of the caller's gigs.
pub async fn get_bids_for_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let bids = bid_service::list_bids_for_gig(db.get_ref(), path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(bids))
}

/// GET /api/bids/{id}
pub async fn get_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let bid = bid_service::get_bid(db.get_ref(), path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(bid))
}

/// PUT /api/bids/{id}: withdraw, reject, or accept (hire).
pub async fn update_bid_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBidStatus>,
) -> Result<HttpResponse, AppError> {
    let bid = bid_service::set_bid_status(
        db.get_ref(),
        notifier.get_ref(),
        path.into_inner(),
        user.id,
        body.status,
    )
    .await?;
    Ok(HttpResponse::Ok().json(bid))
}

/// DELETE /api/bids/{id}: remove one of the caller's pending bids.
pub async fn delete_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    bid_service::delete_bid(db.get_ref(), id, user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Bid {id} deleted"),
    })))
}

/// POST /api/bids/{id}/hire: hire the freelancer behind a bid.
pub async fn hire_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let outcome = hire(db.get_ref(), notifier.get_ref(), path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Freelancer hired successfully",
        "bid": outcome.bid,
        "gig": outcome.gig,
    })))
}
