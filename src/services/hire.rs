//! The hire transaction: accept one bid, reject its pending competitors and
//! move the gig to `in-progress`, all in one store transaction.
//!
//! The gig row is the mutual-exclusion gate. Its `open -> in-progress` update
//! is conditional on the gig still being open and runs before anything else
//! in the transaction, so of two concurrent hires on the same gig exactly one
//! changes a row; the other sees zero affected rows and aborts without having
//! touched its bid.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::error::AppError;
use crate::models::bids::{self, BidStatus};
use crate::models::gigs::{self, GigStatus};
use crate::notify::Notifier;

/// The committed result of a hire.
#[derive(Debug, Clone, Serialize)]
pub struct HireOutcome {
    pub bid: bids::Model,
    pub gig: gigs::Model,
    /// How many competing pending bids were rejected.
    #[serde(skip)]
    pub rejected: u64,
}

/// Hire the freelancer behind `bid_id` on behalf of `acting_user`.
///
/// On success the freelancer is notified; delivery is best-effort and never
/// affects the committed result. On any error nothing was written and the
/// whole call may be retried from scratch.
pub async fn hire(
    db: &DatabaseConnection,
    notifier: &Notifier,
    bid_id: Uuid,
    acting_user: Uuid,
) -> Result<HireOutcome, AppError> {
    let outcome = commit_hire(db, bid_id, acting_user).await?;

    notifier
        .notify_hired(outcome.bid.freelancer_id, &outcome.bid, &outcome.gig)
        .await;

    Ok(outcome)
}

fn aborted(e: DbErr) -> AppError {
    AppError::TransactionAborted(e)
}

async fn commit_hire(
    db: &DatabaseConnection,
    bid_id: Uuid,
    acting_user: Uuid,
) -> Result<HireOutcome, AppError> {
    let txn = db.begin().await.map_err(aborted)?;

    // 1. The bid.
    let bid = bid_db::get_bid_by_id(&txn, bid_id)
        .await
        .map_err(aborted)?
        .ok_or_else(|| AppError::not_found(format!("Bid {bid_id} not found")))?;

    // 2. The gig it targets. Bids cascade with their gig, so a miss here is a
    //    broken reference rather than a client mistake.
    let gig = match gig_db::get_gig_by_id(&txn, bid.gig_id)
        .await
        .map_err(aborted)?
    {
        Some(gig) => gig,
        None => {
            tracing::error!(%bid_id, gig_id = %bid.gig_id, "bid references a missing gig");
            return Err(AppError::not_found(format!("Gig {} not found", bid.gig_id)));
        }
    };

    // 3. Only the owner hires.
    if gig.owner_id != acting_user {
        tracing::info!(%bid_id, %acting_user, "hire refused: not the gig owner");
        return Err(AppError::forbidden(
            "Only the gig owner can hire a freelancer",
        ));
    }

    // 4. The gig must still be open.
    if gig.status != GigStatus::Open {
        return Err(gig_not_open(gig.status));
    }

    // 5. The bid must still be pending.
    if bid.status != BidStatus::Pending {
        return Err(bid_not_pending(bid.status));
    }

    let rejected = write_hire(&txn, &bid, &gig).await?;

    let bid = bid_db::get_bid_by_id(&txn, bid.id)
        .await
        .map_err(aborted)?
        .ok_or_else(|| AppError::not_found(format!("Bid {bid_id} not found")))?;
    let gig = gig_db::get_gig_by_id(&txn, gig.id)
        .await
        .map_err(aborted)?
        .ok_or_else(|| AppError::not_found(format!("Gig {} not found", bid.gig_id)))?;

    txn.commit().await.map_err(aborted)?;

    tracing::info!(
        gig_id = %gig.id,
        bid_id = %bid.id,
        freelancer_id = %bid.freelancer_id,
        rejected,
        "hire committed"
    );

    Ok(HireOutcome { bid, gig, rejected })
}

/// The three hire writes, each conditional on the status read earlier.
///
/// `bid` and `gig` may be stale by the time this runs: every precondition is
/// re-evaluated by the store. On error the caller must drop or roll back `txn`,
/// which undoes a gig update that already went through.
pub(crate) async fn write_hire<C: ConnectionTrait>(
    txn: &C,
    bid: &bids::Model,
    gig: &gigs::Model,
) -> Result<u64, AppError> {
    // The gate first, then the winner, then the losers.
    let claimed = gig_db::transition_status(txn, gig.id, GigStatus::Open, GigStatus::InProgress)
        .await
        .map_err(aborted)?;
    if claimed != 1 {
        tracing::warn!(gig_id = %gig.id, bid_id = %bid.id, "hire lost the race for the gig");
        return Err(gig_not_open(GigStatus::InProgress));
    }

    let accepted = bid_db::transition_status(txn, bid.id, BidStatus::Pending, BidStatus::Accepted)
        .await
        .map_err(aborted)?;
    if accepted != 1 {
        // Withdrawn or rejected between the read and the write.
        tracing::warn!(gig_id = %gig.id, bid_id = %bid.id, "bid left pending before it could be accepted");
        return Err(AppError::conflict("Bid is no longer pending"));
    }

    bid_db::reject_pending_for_gig(txn, gig.id, Some(bid.id))
        .await
        .map_err(aborted)
}

fn gig_not_open(status: GigStatus) -> AppError {
    AppError::conflict(format!(
        "Gig already has an active hire or is closed (status '{status}')"
    ))
}

fn bid_not_pending(status: BidStatus) -> AppError {
    AppError::conflict(format!("Bid is no longer pending (status '{status}')"))
}
