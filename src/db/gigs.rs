use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func, LikeExpr};
use sea_orm::*;
use uuid::Uuid;

use crate::models::Page;
use crate::models::gigs::{self, CreateGig, GigStatus, UpdateGig};

/// Insert a new gig owned by `owner_id`. New gigs are always open.
pub async fn insert_gig<C: ConnectionTrait>(
    db: &C,
    input: CreateGig,
    owner_id: Uuid,
) -> Result<gigs::Model, DbErr> {
    let new_gig = gigs::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        budget: Set(input.budget),
        owner_id: Set(owner_id),
        status: Set(GigStatus::Open),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_gig.insert(db).await
}

/// Fetch a single gig by ID.
pub async fn get_gig_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).one(db).await
}

/// Fetch all gigs for an owner, newest first.
pub async fn get_gigs_by_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> Result<Vec<gigs::Model>, DbErr> {
    gigs::Entity::find()
        .filter(gigs::Column::OwnerId.eq(owner_id))
        .order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .all(db)
        .await
}

/// One page of gigs in `status`, newest first, optionally narrowed to titles
/// containing `title` (case-insensitive). `page` is 1-indexed.
pub async fn list_gigs<C: ConnectionTrait>(
    db: &C,
    status: GigStatus,
    title: Option<&str>,
    page: u64,
    limit: u64,
) -> Result<Page<gigs::Model>, DbErr> {
    let mut query = gigs::Entity::find().filter(gigs::Column::Status.eq(status));

    if let Some(title) = title {
        let pattern = format!("%{}%", escape_like(&title.to_lowercase()));
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(gigs::Column::Title)))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    let paginator = query
        .order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .paginate(db, limit);

    let totals = paginator.num_items_and_pages().await?;
    // Past the last page the offset is meaningless and `page * limit` can overflow.
    let items = if page > totals.number_of_pages {
        Vec::new()
    } else {
        paginator.fetch_page(page.saturating_sub(1)).await?
    };

    Ok(Page {
        items,
        total: totals.number_of_items,
        page,
        pages: totals.number_of_pages,
    })
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Apply the non-status fields of an owner edit.
pub async fn update_gig_fields<C: ConnectionTrait>(
    db: &C,
    gig: gigs::Model,
    input: &UpdateGig,
) -> Result<gigs::Model, DbErr> {
    let mut active: gigs::ActiveModel = gig.into();

    if let Some(title) = &input.title {
        active.title = Set(title.clone());
    }
    if let Some(description) = &input.description {
        active.description = Set(description.clone());
    }
    if let Some(budget) = input.budget {
        active.budget = Set(budget);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Move a gig from `from` to `to` only if it is still in `from`.
///
/// Returns the number of rows changed: `0` means another writer got there first.
pub async fn transition_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    from: GigStatus,
    to: GigStatus,
) -> Result<u64, DbErr> {
    let result = gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(to))
        .col_expr(gigs::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(from))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Take a write lock on a gig row while it is open, without changing it.
///
/// Used inside a transaction so a concurrent hire on the same gig waits for the
/// caller to commit. Returns `false` if the gig is missing or no longer open.
pub async fn lock_open_gig<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(GigStatus::Open))
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Delete a gig unless a hire currently holds it. Bids go with it (FK cascade).
pub async fn delete_gig_unless_hired<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<DeleteResult, DbErr> {
    gigs::Entity::delete_many()
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.ne(GigStatus::InProgress))
        .exec(db)
        .await
}
