use std::sync::Arc;
use uuid::Uuid;

use crate::models::{bids, gigs};
use crate::notify::protocol::{BidAccepted, ServerEvent};
use crate::notify::registry::{ConnectionRegistry, Delivery};

const BID_ACCEPTED_MESSAGE: &str = "Congratulations! Your bid has been accepted!";

/// Best-effort push of hire results to freelancers.
///
/// Never fails: a missing or closed connection only means the freelancer sees
/// the result the next time they load their bids.
#[derive(Debug, Clone)]
pub struct Notifier {
    registry: Arc<ConnectionRegistry>,
}

impl Notifier {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Tell `freelancer_id` that `bid` was accepted on `gig`.
    pub async fn notify_hired(
        &self,
        freelancer_id: Uuid,
        bid: &bids::Model,
        gig: &gigs::Model,
    ) -> Delivery {
        let event = ServerEvent::BidAccepted(BidAccepted {
            message: BID_ACCEPTED_MESSAGE.to_string(),
            gig_title: gig.title.clone(),
            budget: gig.budget,
            bid_id: bid.id,
            bid_price: bid.price,
            timestamp: chrono::Utc::now(),
        });

        let delivery = self.registry.send(freelancer_id, event).await;
        match delivery {
            Delivery::Delivered => {
                tracing::info!(%freelancer_id, bid_id = %bid.id, "hire notification sent")
            }
            Delivery::NotConnected => {
                tracing::info!(%freelancer_id, bid_id = %bid.id, "freelancer not connected, notification skipped")
            }
            Delivery::Closed => {
                tracing::warn!(%freelancer_id, bid_id = %bid.id, "notification channel closed, notification dropped")
            }
        }
        delivery
    }
}
