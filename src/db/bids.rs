use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::bids::{self, BidStatus, NewBid};
use crate::models::gigs;

/// Insert a new bid (defaults to Pending status).
///
/// A second bid for the same (gig, freelancer) pair fails here with a
/// unique-constraint violation, whatever any earlier check said.
pub async fn insert_bid<C: ConnectionTrait>(db: &C, input: NewBid) -> Result<bids::Model, DbErr> {
    let new_bid = bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        gig_id: Set(input.gig_id),
        freelancer_id: Set(input.freelancer_id),
        message: Set(input.message),
        price: Set(input.price),
        status: Set(BidStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_bid.insert(db).await
}

/// Fetch a single bid by ID.
pub async fn get_bid_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find_by_id(id).one(db).await
}

/// Check whether a freelancer already bid on a gig.
pub async fn bid_exists_for_gig_and_freelancer<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    freelancer_id: Uuid,
) -> Result<bool, DbErr> {
    let count = bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::FreelancerId.eq(freelancer_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Fetch all bids on a gig, newest first.
pub async fn get_bids_by_gig_id<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .order_by_desc(bids::Column::CreatedAt)
        .order_by_desc(bids::Column::Id)
        .all(db)
        .await
}

/// Fetch all bids placed by a freelancer with the gig each one targets, newest first.
pub async fn get_bids_by_freelancer_with_gig<C: ConnectionTrait>(
    db: &C,
    freelancer_id: Uuid,
) -> Result<Vec<(bids::Model, Option<gigs::Model>)>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::FreelancerId.eq(freelancer_id))
        .order_by_desc(bids::Column::CreatedAt)
        .order_by_desc(bids::Column::Id)
        .find_also_related(gigs::Entity)
        .all(db)
        .await
}

/// Count the bids on a gig that are in `status`.
pub async fn count_by_status<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    status: BidStatus,
) -> Result<u64, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::Status.eq(status))
        .count(db)
        .await
}

/// Move a bid from `from` to `to` only if it is still in `from`.
///
/// Returns the number of rows changed: `0` means the bid moved in the meantime.
pub async fn transition_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    from: BidStatus,
    to: BidStatus,
) -> Result<u64, DbErr> {
    let result = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(to))
        .col_expr(bids::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(from))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Reject every bid on a gig that is still pending, except `keep` if given.
///
/// A single conditional UPDATE: bids that were withdrawn or otherwise moved
/// before this statement runs are left alone.
pub async fn reject_pending_for_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    keep: Option<Uuid>,
) -> Result<u64, DbErr> {
    let mut update = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Rejected))
        .col_expr(bids::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::Status.eq(BidStatus::Pending));

    if let Some(keep) = keep {
        update = update.filter(bids::Column::Id.ne(keep));
    }

    let result = update.exec(db).await?;
    Ok(result.rows_affected)
}

/// Delete a bid only while it is still pending.
pub async fn delete_pending_bid<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<DeleteResult, DbErr> {
    bids::Entity::delete_many()
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await
}
