pub mod bids;
pub mod gigs;
pub mod health;

use actix_web::web;

use crate::notify::session;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health));

    // ── Gig routes (reads are public, writes need a JWT) ──
    cfg.service(
        web::scope("/gigs")
            .route("", web::get().to(gigs::get_gigs))
            .route("", web::post().to(gigs::create_gig))
            .route("/my-gigs", web::get().to(gigs::get_my_gigs))
            .route("/{id}", web::get().to(gigs::get_gig))
            .route("/{id}", web::put().to(gigs::update_gig))
            .route("/{id}", web::delete().to(gigs::delete_gig)),
    );

    // ── Bid routes (all require a valid JWT) ──
    cfg.service(
        web::scope("/bids")
            .route("", web::post().to(bids::create_bid))
            .route("/my-bids", web::get().to(bids::get_my_bids))
            .route("/gig/{gig_id}", web::get().to(bids::get_bids_for_gig))
            .route("/{id}", web::get().to(bids::get_bid))
            .route("/{id}", web::put().to(bids::update_bid_status))
            .route("/{id}", web::delete().to(bids::delete_bid))
            .route("/{id}/hire", web::post().to(bids::hire_bid)),
    );

    // ── Notifications (token in the query string) ──
    cfg.route("/notifications/ws", web::get().to(session::ws_connect));
}
