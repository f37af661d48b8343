use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use uuid::Uuid;

use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::error::AppError;
use crate::models::Page;
use crate::models::gigs::{self, CreateGig, GigListQuery, GigStatus, UpdateGig};
use crate::validation::validated;

fn aborted(e: DbErr) -> AppError {
    AppError::TransactionAborted(e)
}

/// Post a new open gig for `owner_id`.
pub async fn create_gig(
    db: &DatabaseConnection,
    owner_id: Uuid,
    input: CreateGig,
) -> Result<gigs::Model, AppError> {
    let input = validated(input)?;
    let gig = gig_db::insert_gig(db, input, owner_id).await?;
    tracing::info!(gig_id = %gig.id, %owner_id, "gig created");
    Ok(gig)
}

pub async fn get_gig(db: &DatabaseConnection, id: Uuid) -> Result<gigs::Model, AppError> {
    gig_db::get_gig_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Gig {id} not found")))
}

/// The public feed: one page of gigs in the requested status.
pub async fn list_gigs(
    db: &DatabaseConnection,
    query: &GigListQuery,
) -> Result<Page<gigs::Model>, AppError> {
    Ok(gig_db::list_gigs(db, query.status(), query.title(), query.page(), query.limit()).await?)
}

pub async fn list_gigs_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<gigs::Model>, AppError> {
    Ok(gig_db::get_gigs_by_owner(db, owner_id).await?)
}

/// Owner edit. Field changes and any status change land together.
///
/// Cancelling an open gig rejects every pending bid in the same transaction.
/// Moving a gig to `in-progress` is refused: that only happens through a hire.
pub async fn update_gig(
    db: &DatabaseConnection,
    id: Uuid,
    acting_user: Uuid,
    input: UpdateGig,
) -> Result<gigs::Model, AppError> {
    let input = validated(input)?;

    let txn = db.begin().await.map_err(aborted)?;

    let gig = gig_db::get_gig_by_id(&txn, id)
        .await
        .map_err(aborted)?
        .ok_or_else(|| AppError::not_found(format!("Gig {id} not found")))?;

    if gig.owner_id != acting_user {
        return Err(AppError::forbidden("You can only update your own gigs"));
    }

    let next = match input.status {
        Some(next) if next != gig.status => {
            let next = gig
                .status
                .owner_transition(next)
                .map_err(|e| AppError::conflict_on("status", e.to_string()))?;
            Some(next)
        }
        _ => None,
    };

    let from = gig.status;
    gig_db::update_gig_fields(&txn, gig, &input)
        .await
        .map_err(aborted)?;

    if let Some(next) = next {
        let moved = gig_db::transition_status(&txn, id, from, next)
            .await
            .map_err(aborted)?;
        if moved != 1 {
            return Err(AppError::conflict(format!(
                "Gig status changed while it was being updated (expected '{from}')"
            )));
        }

        if next == GigStatus::Cancelled {
            let rejected = bid_db::reject_pending_for_gig(&txn, id, None)
                .await
                .map_err(aborted)?;
            tracing::info!(gig_id = %id, rejected, "gig cancelled, pending bids rejected");
        }
    }

    let updated = gig_db::get_gig_by_id(&txn, id)
        .await
        .map_err(aborted)?
        .ok_or_else(|| AppError::not_found(format!("Gig {id} not found")))?;

    txn.commit().await.map_err(aborted)?;

    Ok(updated)
}

/// Delete a gig and, through the foreign key, all of its bids.
///
/// Refused while a hire holds the gig.
pub async fn delete_gig(
    db: &DatabaseConnection,
    id: Uuid,
    acting_user: Uuid,
) -> Result<(), AppError> {
    let gig = get_gig(db, id).await?;

    if gig.owner_id != acting_user {
        return Err(AppError::forbidden("You can only delete your own gigs"));
    }
    if gig.status.is_locked_by_hire() {
        return Err(AppError::conflict(
            "Cannot delete a gig that has an active hire",
        ));
    }

    let result = gig_db::delete_gig_unless_hired(db, id).await?;
    if result.rows_affected == 0 {
        // Hired or deleted between the read and the delete.
        return match gig_db::get_gig_by_id(db, id).await? {
            Some(_) => Err(AppError::conflict(
                "Cannot delete a gig that has an active hire",
            )),
            None => Err(AppError::not_found(format!("Gig {id} not found"))),
        };
    }

    tracing::info!(gig_id = %id, "gig deleted");
    Ok(())
}
