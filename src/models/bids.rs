use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::models::gigs::GigSummary;
use crate::validation::Normalize;

/// Bid status stored as a lowercase string in the database.
///
/// `Pending` is the only state a bid ever leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

impl BidStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BidStatus::Pending => "pending",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
            BidStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != BidStatus::Pending
    }

    /// Who may drive a bid from `self` to `next`, or `None` if no such move exists.
    pub fn transition_to(self, next: BidStatus) -> Option<BidActor> {
        match (self, next) {
            (BidStatus::Pending, BidStatus::Withdrawn) => Some(BidActor::Freelancer),
            (BidStatus::Pending, BidStatus::Rejected) => Some(BidActor::GigOwner),
            (BidStatus::Pending, BidStatus::Accepted) => Some(BidActor::HireCoordinator),
            _ => None,
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The party allowed to perform a bid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidActor {
    /// The freelancer who placed the bid.
    Freelancer,
    /// The owner of the gig the bid targets.
    GigOwner,
    /// The gig owner, but only through a hire.
    HireCoordinator,
}

/// SeaORM entity for the `bids` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub gig_id: Uuid,
    pub freelancer_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub status: BidStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gigs::Entity",
        from = "Column::GigId",
        to = "super::gigs::Column::Id"
    )]
    Gig,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for `POST /api/bids`. The freelancer comes from the token.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBid {
    #[validate(required(message = "Gig ID is required"))]
    pub gig_id: Option<Uuid>,
    #[validate(length(min = 10, max = 500, message = "Message must be between 10 and 500 characters"))]
    pub message: String,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: f64,
}

impl Normalize for CreateBid {
    fn normalize(mut self) -> Self {
        self.message = self.message.trim().to_string();
        self
    }
}

/// Validated input handed to the store.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub gig_id: Uuid,
    pub freelancer_id: Uuid,
    pub message: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBidStatus {
    pub status: BidStatus,
}

/// A bid with the gig it targets, as shown on a freelancer's dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidWithGig {
    #[serde(flatten)]
    pub bid: Model,
    pub gig: Option<GigSummary>,
}
