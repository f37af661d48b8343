//! Shared fixtures for the integration tests: a migrated in-memory SQLite
//! store, seed helpers, and a token minter for HTTP tests.
#![allow(dead_code)]

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use uuid::Uuid;

use gigmarket_backend::auth::jwt::Claims;
use gigmarket_backend::db::bids as bid_db;
use gigmarket_backend::models::bids::{self, BidStatus, CreateBid};
use gigmarket_backend::models::gigs::{self, CreateGig, GigStatus};
use gigmarket_backend::notify::{ConnectionRegistry, Notifier};
use gigmarket_backend::services::{bids as bid_service, gigs as gig_service};

pub const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

/// A fresh, migrated database. One connection, so transactions run one at a time.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None).await.expect("migrations failed");
    db
}

pub fn notifier() -> Notifier {
    Notifier::new(Arc::new(ConnectionRegistry::new()))
}

pub async fn seed_gig(db: &DatabaseConnection, owner_id: Uuid, title: &str) -> gigs::Model {
    gig_service::create_gig(
        db,
        owner_id,
        CreateGig {
            title: title.to_string(),
            description: "A description that is long enough".to_string(),
            budget: 500.0,
        },
    )
    .await
    .expect("failed to seed gig")
}

pub async fn seed_bid(
    db: &DatabaseConnection,
    gig_id: Uuid,
    freelancer_id: Uuid,
    price: f64,
) -> bids::Model {
    bid_service::create_bid(db, freelancer_id, bid_input(gig_id, price))
        .await
        .expect("failed to seed bid")
}

pub fn bid_input(gig_id: Uuid, price: f64) -> CreateBid {
    CreateBid {
        gig_id: Some(gig_id),
        message: "I can deliver this within a week".to_string(),
        price,
    }
}

pub async fn bid_status(db: &DatabaseConnection, id: Uuid) -> BidStatus {
    bid_db::get_bid_by_id(db, id)
        .await
        .unwrap()
        .expect("bid should exist")
        .status
}

pub async fn gig_status(db: &DatabaseConnection, id: Uuid) -> GigStatus {
    gig_service::get_gig(db, id).await.unwrap().status
}

/// At most one accepted bid per gig, and exactly one once the gig is hired.
pub async fn assert_hire_invariant(db: &DatabaseConnection, gig_id: Uuid) {
    let accepted = bid_db::count_by_status(db, gig_id, BidStatus::Accepted)
        .await
        .unwrap();
    let status = gig_status(db, gig_id).await;

    assert!(accepted <= 1, "gig {gig_id} has {accepted} accepted bids");
    let hired = matches!(status, GigStatus::InProgress | GigStatus::Completed);
    assert_eq!(
        hired,
        accepted == 1,
        "gig {gig_id} is '{status}' with {accepted} accepted bids"
    );
}

pub fn mint_token(user_id: Uuid) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some(format!("{user_id}@example.com")),
        role: Some("authenticated".to_string()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}
