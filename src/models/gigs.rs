use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::validation::Normalize;

/// Gig lifecycle, stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "kebab-case")]
pub enum GigStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl GigStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GigStatus::Open => "open",
            GigStatus::InProgress => "in-progress",
            GigStatus::Completed => "completed",
            GigStatus::Cancelled => "cancelled",
        }
    }

    /// Check a status change requested by the gig owner.
    ///
    /// `open -> in-progress` is never an owner edit: it only happens as part of a
    /// hire, together with the accepted bid.
    pub fn owner_transition(self, next: GigStatus) -> Result<GigStatus, GigTransitionError> {
        match (self, next) {
            (GigStatus::Open, GigStatus::Cancelled) => Ok(next),
            (GigStatus::InProgress, GigStatus::Completed) => Ok(next),
            (_, GigStatus::InProgress) => Err(GigTransitionError::HireOnly),
            (from, to) => Err(GigTransitionError::Invalid { from, to }),
        }
    }

    /// Whether a hire currently holds this gig.
    pub fn is_locked_by_hire(self) -> bool {
        self == GigStatus::InProgress
    }
}

impl fmt::Display for GigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GigTransitionError {
    #[error("A gig only becomes in-progress by hiring one of its bids")]
    HireOnly,
    #[error("Cannot change gig status from '{from}' to '{to}'")]
    Invalid { from: GigStatus, to: GigStatus },
}

/// SeaORM entity for the `gigs` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gigs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub budget: f64,
    pub owner_id: Uuid,
    pub status: GigStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateGig {
    #[validate(length(min = 5, max = 100, message = "Title must be between 5 and 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Description must be between 10 and 2000 characters"
    ))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Budget must be greater than 0"))]
    pub budget: f64,
}

impl Normalize for CreateGig {
    fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self
    }
}

/// Owner edit of a gig. Every field is optional; only provided fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateGig {
    #[validate(length(min = 5, max = 100, message = "Title must be between 5 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Description must be between 10 and 2000 characters"
    ))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Budget must be greater than 0"))]
    pub budget: Option<f64>,
    pub status: Option<GigStatus>,
}

impl Normalize for UpdateGig {
    fn normalize(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }
}

/// Query parameters for the public gig feed.
#[derive(Debug, Clone, Deserialize)]
pub struct GigListQuery {
    pub status: Option<GigStatus>,
    pub title: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl GigListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// The feed shows open gigs unless a status is asked for.
    pub fn status(&self) -> GigStatus {
        self.status.unwrap_or(GigStatus::Open)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// The subset of a gig that travels with a bid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GigSummary {
    pub id: Uuid,
    pub title: String,
    pub budget: f64,
    pub status: GigStatus,
}

impl From<Model> for GigSummary {
    fn from(g: Model) -> Self {
        Self {
            id: g.id,
            title: g.title,
            budget: g.budget,
            status: g.status,
        }
    }
}
