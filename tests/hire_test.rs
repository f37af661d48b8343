//! The hire transaction against a real (in-memory) store.
//!
//! Run with: `cargo test --test hire_test`
mod common;

use std::sync::Arc;
use uuid::Uuid;

use common::*;
use gigmarket_backend::models::bids::BidStatus;
use gigmarket_backend::models::gigs::GigStatus;
use gigmarket_backend::notify::protocol::ServerEvent;
use gigmarket_backend::notify::{ConnectionRegistry, Delivery, Notifier};
use gigmarket_backend::services::bids as bid_service;
use gigmarket_backend::services::hire;

#[tokio::test]
async fn hire_accepts_one_bid_and_rejects_the_rest() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Design a company logo").await;

    let winner = seed_bid(&db, gig.id, Uuid::new_v4(), 300.0).await;
    let loser_a = seed_bid(&db, gig.id, Uuid::new_v4(), 250.0).await;
    let loser_b = seed_bid(&db, gig.id, Uuid::new_v4(), 400.0).await;

    let outcome = hire(&db, &notifier(), winner.id, owner).await.unwrap();

    assert_eq!(outcome.bid.id, winner.id);
    assert_eq!(outcome.bid.status, BidStatus::Accepted);
    assert_eq!(outcome.gig.status, GigStatus::InProgress);
    assert_eq!(outcome.rejected, 2);

    assert_eq!(bid_status(&db, loser_a.id).await, BidStatus::Rejected);
    assert_eq!(bid_status(&db, loser_b.id).await, BidStatus::Rejected);
    assert_hire_invariant(&db, gig.id).await;
}

#[tokio::test]
async fn hire_with_a_single_bid_rejects_nothing() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Write product copy").await;
    let only = seed_bid(&db, gig.id, Uuid::new_v4(), 120.0).await;

    let outcome = hire(&db, &notifier(), only.id, owner).await.unwrap();

    assert_eq!(outcome.rejected, 0);
    assert_hire_invariant(&db, gig.id).await;
}

#[tokio::test]
async fn withdrawn_bids_are_left_alone() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Translate a website").await;

    let winner = seed_bid(&db, gig.id, Uuid::new_v4(), 90.0).await;
    let quitter_id = Uuid::new_v4();
    let quitter = seed_bid(&db, gig.id, quitter_id, 80.0).await;
    bid_service::set_bid_status(&db, &notifier(), quitter.id, quitter_id, BidStatus::Withdrawn)
        .await
        .unwrap();

    let outcome = hire(&db, &notifier(), winner.id, owner).await.unwrap();

    assert_eq!(outcome.rejected, 0);
    assert_eq!(bid_status(&db, quitter.id).await, BidStatus::Withdrawn);
}

#[tokio::test]
async fn second_hire_on_the_same_gig_conflicts_and_changes_nothing() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Build a landing page").await;
    let first = seed_bid(&db, gig.id, Uuid::new_v4(), 300.0).await;
    let second = seed_bid(&db, gig.id, Uuid::new_v4(), 310.0).await;

    hire(&db, &notifier(), first.id, owner).await.unwrap();

    // The losing bid is already rejected, so either guard may fire.
    let err = hire(&db, &notifier(), second.id, owner).await.unwrap_err();
    assert!(err.is_conflict(), "{err:?}");

    // Re-hiring the winner fails on the gig, which is no longer open.
    let err = hire(&db, &notifier(), first.id, owner).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(err.to_string().contains("active hire"), "{err}");

    assert_eq!(bid_status(&db, first.id).await, BidStatus::Accepted);
    assert_eq!(bid_status(&db, second.id).await, BidStatus::Rejected);
    assert_hire_invariant(&db, gig.id).await;
}

#[tokio::test]
async fn only_the_owner_can_hire() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Edit a podcast episode").await;
    let bid = seed_bid(&db, gig.id, Uuid::new_v4(), 60.0).await;

    let err = hire(&db, &notifier(), bid.id, Uuid::new_v4()).await.unwrap_err();

    assert!(err.is_forbidden());
    assert_eq!(bid_status(&db, bid.id).await, BidStatus::Pending);
    assert_eq!(gig_status(&db, gig.id).await, GigStatus::Open);
}

#[tokio::test]
async fn unknown_bid_is_not_found() {
    let db = setup_db().await;

    let err = hire(&db, &notifier(), Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn withdrawn_bid_cannot_be_hired() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Fix a WordPress plugin").await;
    let freelancer = Uuid::new_v4();
    let bid = seed_bid(&db, gig.id, freelancer, 75.0).await;

    bid_service::set_bid_status(&db, &notifier(), bid.id, freelancer, BidStatus::Withdrawn)
        .await
        .unwrap();

    let err = hire(&db, &notifier(), bid.id, owner).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(err.to_string().contains("no longer pending"), "{err}");
    assert_eq!(gig_status(&db, gig.id).await, GigStatus::Open);
    assert_hire_invariant(&db, gig.id).await;
}

#[tokio::test]
async fn cancelled_gig_cannot_be_hired() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Record a voice-over").await;
    let bid = seed_bid(&db, gig.id, Uuid::new_v4(), 150.0).await;

    gigmarket_backend::services::gigs::update_gig(
        &db,
        gig.id,
        owner,
        gigmarket_backend::models::gigs::UpdateGig {
            status: Some(GigStatus::Cancelled),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = hire(&db, &notifier(), bid.id, owner).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(bid_status(&db, bid.id).await, BidStatus::Rejected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_hires_on_one_gig_have_exactly_one_winner() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Migrate a database").await;

    let mut bid_ids = Vec::new();
    for i in 0..5 {
        let bid = seed_bid(&db, gig.id, Uuid::new_v4(), 100.0 + i as f64).await;
        bid_ids.push(bid.id);
    }

    let notifier = notifier();
    let mut tasks = Vec::new();
    for bid_id in bid_ids.clone() {
        let db = db.clone();
        let notifier = notifier.clone();
        tasks.push(tokio::spawn(async move {
            hire(&db, &notifier, bid_id, owner).await
        }));
    }

    let mut winners = Vec::new();
    for task in tasks {
        match task.await.unwrap() {
            Ok(outcome) => winners.push(outcome.bid.id),
            Err(e) => assert!(e.is_conflict(), "loser must see a conflict: {e:?}"),
        }
    }

    assert_eq!(winners.len(), 1, "exactly one hire must commit");
    for bid_id in bid_ids {
        let expected = if bid_id == winners[0] {
            BidStatus::Accepted
        } else {
            BidStatus::Rejected
        };
        assert_eq!(bid_status(&db, bid_id).await, expected);
    }
    assert_hire_invariant(&db, gig.id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn withdraw_racing_a_hire_never_leaves_a_half_hire() {
    let db = setup_db().await;
    let owner = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Animate an explainer video").await;
    let freelancer = Uuid::new_v4();
    let bid = seed_bid(&db, gig.id, freelancer, 800.0).await;

    let notifier = notifier();
    let (hired, withdrawn) = tokio::join!(
        hire(&db, &notifier, bid.id, owner),
        bid_service::set_bid_status(&db, &notifier, bid.id, freelancer, BidStatus::Withdrawn),
    );

    // Exactly one side wins; the other sees a conflict.
    assert!(hired.is_ok() != withdrawn.is_ok());
    match hired {
        Ok(_) => {
            assert!(withdrawn.unwrap_err().is_conflict());
            assert_eq!(bid_status(&db, bid.id).await, BidStatus::Accepted);
            assert_eq!(gig_status(&db, gig.id).await, GigStatus::InProgress);
        }
        Err(e) => {
            assert!(e.is_conflict());
            assert_eq!(bid_status(&db, bid.id).await, BidStatus::Withdrawn);
            assert_eq!(gig_status(&db, gig.id).await, GigStatus::Open);
        }
    }
    assert_hire_invariant(&db, gig.id).await;
}

#[tokio::test]
async fn connected_freelancer_is_notified() {
    let db = setup_db().await;
    let registry = Arc::new(ConnectionRegistry::new());
    let notifier = Notifier::new(registry.clone());

    let owner = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Illustrate a children's book").await;
    let bid = seed_bid(&db, gig.id, freelancer, 650.0).await;

    let (_, mut rx) = registry.register(freelancer).await;
    hire(&db, &notifier, bid.id, owner).await.unwrap();

    match rx.recv().await {
        Some(ServerEvent::BidAccepted(payload)) => {
            assert_eq!(payload.bid_id, bid.id);
            assert_eq!(payload.gig_title, "Illustrate a children's book");
            assert_eq!(payload.budget, 500.0);
            assert_eq!(payload.bid_price, 650.0);
            assert_eq!(payload.message, "Congratulations! Your bid has been accepted!");
        }
        other => panic!("expected bid_accepted, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_delivery_does_not_undo_the_hire() {
    let db = setup_db().await;
    let registry = Arc::new(ConnectionRegistry::new());
    let notifier = Notifier::new(registry.clone());

    let owner = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let gig = seed_gig(&db, owner, "Audit a smart contract").await;
    let bid = seed_bid(&db, gig.id, freelancer, 2000.0).await;

    // Registered, but the session is already gone.
    let (_, rx) = registry.register(freelancer).await;
    drop(rx);
    assert_eq!(
        registry.send(freelancer, ServerEvent::Pong).await,
        Delivery::Closed
    );

    let outcome = hire(&db, &notifier, bid.id, owner).await.unwrap();

    assert_eq!(outcome.bid.status, BidStatus::Accepted);
    assert_hire_invariant(&db, gig.id).await;
}
