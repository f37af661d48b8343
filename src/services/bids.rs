use sea_orm::{DatabaseConnection, DbErr, SqlErr, TransactionTrait};
use uuid::Uuid;

use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::error::AppError;
use crate::models::bids::{self, BidActor, BidStatus, BidWithGig, CreateBid, NewBid};
use crate::models::gigs::{self, GigStatus};
use crate::notify::Notifier;
use crate::services::hire;
use crate::validation::validated;

const DUPLICATE_BID: &str = "You have already placed a bid on this gig";
const OWN_GIG: &str = "You cannot bid on your own gig";

fn aborted(e: DbErr) -> AppError {
    AppError::TransactionAborted(e)
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Place a pending bid on an open gig.
///
/// The duplicate check up front gives a friendly error; the unique index on
/// `(gig_id, freelancer_id)` is what actually guarantees one bid per pair.
pub async fn create_bid(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
    input: CreateBid,
) -> Result<bids::Model, AppError> {
    let requested_gig = input.gig_id;
    let input = match validated(input) {
        Ok(input) => input,
        Err(AppError::Validation(mut errors)) => {
            // Report the own-gig refusal alongside the field errors.
            if let Some(gig_id) = requested_gig {
                if let Some(gig) = gig_db::get_gig_by_id(db, gig_id).await? {
                    if gig.owner_id == freelancer_id {
                        errors.insert("gigId".to_string(), OWN_GIG.to_string());
                    }
                }
            }
            return Err(AppError::Validation(errors));
        }
        Err(e) => return Err(e),
    };
    let gig_id = input
        .gig_id
        .ok_or_else(|| AppError::invalid("gigId", "Gig ID is required"))?;

    let gig = gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Gig {gig_id} not found")))?;

    if gig.owner_id == freelancer_id {
        return Err(AppError::forbidden_on("gigId", OWN_GIG));
    }
    if gig.status != GigStatus::Open {
        return Err(gig_not_open(gig.status));
    }
    if bid_db::bid_exists_for_gig_and_freelancer(db, gig_id, freelancer_id).await? {
        return Err(AppError::conflict_on("gigId", DUPLICATE_BID));
    }

    let txn = db.begin().await.map_err(aborted)?;

    // Holds the gig row until commit, so a concurrent hire cannot slip in
    // between this check and the insert.
    if !gig_db::lock_open_gig(&txn, gig_id).await.map_err(aborted)? {
        return Err(gig_not_open(GigStatus::InProgress));
    }

    let bid = bid_db::insert_bid(
        &txn,
        NewBid {
            gig_id,
            freelancer_id,
            message: input.message,
            price: input.price,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict_on("gigId", DUPLICATE_BID)
        } else {
            aborted(e)
        }
    })?;

    txn.commit().await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict_on("gigId", DUPLICATE_BID)
        } else {
            aborted(e)
        }
    })?;

    tracing::info!(bid_id = %bid.id, %gig_id, %freelancer_id, "bid placed");
    Ok(bid)
}

fn gig_not_open(status: GigStatus) -> AppError {
    AppError::conflict_on(
        "gigId",
        format!("Cannot bid on a gig that is not open (status '{status}')"),
    )
}

/// Load a bid and the gig it targets.
async fn load_bid_and_gig(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<(bids::Model, gigs::Model), AppError> {
    let bid = bid_db::get_bid_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Bid {id} not found")))?;

    match gig_db::get_gig_by_id(db, bid.gig_id).await? {
        Some(gig) => Ok((bid, gig)),
        None => {
            tracing::error!(bid_id = %id, gig_id = %bid.gig_id, "bid references a missing gig");
            Err(AppError::not_found(format!("Gig {} not found", bid.gig_id)))
        }
    }
}

/// A single bid, visible to the freelancer who placed it and the gig owner.
pub async fn get_bid(
    db: &DatabaseConnection,
    id: Uuid,
    acting_user: Uuid,
) -> Result<bids::Model, AppError> {
    let (bid, gig) = load_bid_and_gig(db, id).await?;

    if bid.freelancer_id != acting_user && gig.owner_id != acting_user {
        return Err(AppError::forbidden("You do not have access to this bid"));
    }
    Ok(bid)
}

/// Every bid on a gig. Only the gig owner may list them.
pub async fn list_bids_for_gig(
    db: &DatabaseConnection,
    gig_id: Uuid,
    acting_user: Uuid,
) -> Result<Vec<bids::Model>, AppError> {
    let gig = gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Gig {gig_id} not found")))?;

    if gig.owner_id != acting_user {
        return Err(AppError::forbidden(
            "Only the gig owner can view the bids on this gig",
        ));
    }

    Ok(bid_db::get_bids_by_gig_id(db, gig_id).await?)
}

/// A freelancer's own bids, each with a summary of its gig.
pub async fn list_bids_for_freelancer(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
) -> Result<Vec<BidWithGig>, AppError> {
    let rows = bid_db::get_bids_by_freelancer_with_gig(db, freelancer_id).await?;
    Ok(rows
        .into_iter()
        .map(|(bid, gig)| BidWithGig {
            bid,
            gig: gig.map(Into::into),
        })
        .collect())
}

/// Move a pending bid to `next`.
///
/// `withdrawn` is the freelancer's call, `rejected` the gig owner's. `accepted`
/// is a hire and goes through the hire transaction.
pub async fn set_bid_status(
    db: &DatabaseConnection,
    notifier: &Notifier,
    id: Uuid,
    acting_user: Uuid,
    next: BidStatus,
) -> Result<bids::Model, AppError> {
    let actor = BidStatus::Pending
        .transition_to(next)
        .ok_or_else(|| AppError::invalid("status", format!("A bid cannot be moved to '{next}'")))?;

    if actor == BidActor::HireCoordinator {
        return Ok(hire::hire(db, notifier, id, acting_user).await?.bid);
    }

    let (bid, gig) = load_bid_and_gig(db, id).await?;

    match actor {
        BidActor::Freelancer if bid.freelancer_id != acting_user => {
            return Err(AppError::forbidden("You can only withdraw your own bids"));
        }
        BidActor::GigOwner if gig.owner_id != acting_user => {
            return Err(AppError::forbidden(
                "Only the gig owner can reject bids on this gig",
            ));
        }
        _ => {}
    }

    if bid.status != BidStatus::Pending {
        return Err(AppError::conflict(format!(
            "Bid is no longer pending (status '{}')",
            bid.status
        )));
    }

    let moved = bid_db::transition_status(db, id, BidStatus::Pending, next).await?;
    if moved != 1 {
        // Hired, rejected or withdrawn in the meantime.
        return Err(AppError::conflict("Bid is no longer pending"));
    }

    tracing::info!(bid_id = %id, status = %next, %acting_user, "bid status changed");

    bid_db::get_bid_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Bid {id} not found")))
}

/// Delete one of the caller's own bids while it is still pending.
pub async fn delete_bid(
    db: &DatabaseConnection,
    id: Uuid,
    acting_user: Uuid,
) -> Result<(), AppError> {
    let bid = bid_db::get_bid_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Bid {id} not found")))?;

    if bid.freelancer_id != acting_user {
        return Err(AppError::forbidden("You can only delete your own bids"));
    }
    if bid.status != BidStatus::Pending {
        return Err(AppError::conflict(format!(
            "Can only delete pending bids (status '{}')",
            bid.status
        )));
    }

    let result = bid_db::delete_pending_bid(db, id).await?;
    if result.rows_affected == 0 {
        return Err(AppError::conflict("Bid is no longer pending"));
    }

    tracing::info!(bid_id = %id, "bid deleted");
    Ok(())
}
