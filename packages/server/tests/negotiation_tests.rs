//! Integration tests for the offer negotiation lifecycle.
//!
//! Covers:
//! - Accept cascade (listing sold, siblings rejected, counterparty notified)
//! - Counter-offer turn flipping
//! - Terminal offers and turn enforcement
//! - Concurrent accepts on one listing
//! - Realtime delivery only after commit

mod common;

use common::{create_listing, create_trader, price, TestHarness};
use market_core::common::{MarketError, Page};
use market_core::domains::listings::{Listing, ListingStatus};
use market_core::domains::notifications::Notification;
use market_core::domains::offers::{Offer, OfferAction, OfferStatus};
use market_core::kernel::EventKind;
use test_context::test_context;

// ============================================================================
// Accept cascade
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn accepting_one_offer_sells_listing_and_rejects_siblings(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer_one = create_trader(&ctx.db_pool, "Buyer One").await.unwrap();
    let buyer_two = create_trader(&ctx.db_pool, "Buyer Two").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();

    let first = ctx
        .negotiation
        .create_offer(listing.id, buyer_one.id, price(90))
        .await
        .unwrap();
    let second = ctx
        .negotiation
        .create_offer(listing.id, buyer_two.id, price(95))
        .await
        .unwrap();
    assert_eq!(first.status, OfferStatus::PendingSeller);
    ctx.dispatcher.clear();

    let accepted = ctx
        .negotiation
        .respond(first.id, seller.id, OfferAction::Accept)
        .await
        .unwrap();
    assert_eq!(accepted.status, OfferStatus::Accepted);

    let listing = Listing::find_by_id(listing.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(listing.status, ListingStatus::Sold);

    let sibling = Offer::find_by_id(second.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sibling.status, OfferStatus::Rejected);

    let notifications = Notification::find_for_recipient(buyer_one.id, Page::default(), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains("accepted"));

    assert_eq!(
        ctx.dispatcher.kinds_sent_to(buyer_one.id),
        vec![EventKind::OfferUpdate, EventKind::NewNotification]
    );
    assert_eq!(
        ctx.dispatcher.kinds_sent_to(buyer_two.id),
        vec![EventKind::OfferUpdate]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn no_new_offers_on_a_sold_listing(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let latecomer = create_trader(&ctx.db_pool, "Latecomer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();

    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(100))
        .await
        .unwrap();
    ctx.negotiation
        .respond(offer.id, seller.id, OfferAction::Accept)
        .await
        .unwrap();

    let result = ctx
        .negotiation
        .create_offer(listing.id, latecomer.id, price(150))
        .await;
    assert!(matches!(result, Err(MarketError::ListingSold)));
}

// ============================================================================
// Counters and turns
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn counter_offers_flip_the_turn_and_price(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 130).await.unwrap();

    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(100))
        .await
        .unwrap();

    let countered = ctx
        .negotiation
        .respond(offer.id, seller.id, OfferAction::Counter { new_price: price(120) })
        .await
        .unwrap();
    assert_eq!(countered.status, OfferStatus::PendingBuyer);
    assert_eq!(countered.price, price(120));

    let countered_back = ctx
        .negotiation
        .respond(offer.id, buyer.id, OfferAction::Counter { new_price: price(110) })
        .await
        .unwrap();
    assert_eq!(countered_back.status, OfferStatus::PendingSeller);
    assert_eq!(countered_back.price, price(110));

    // Seller accepts the buyer's counter at the countered price
    let accepted = ctx
        .negotiation
        .respond(offer.id, seller.id, OfferAction::Accept)
        .await
        .unwrap();
    assert_eq!(accepted.price, price(110));

    let buyer_notes = Notification::find_for_recipient(buyer.id, Page::default(), &ctx.db_pool)
        .await
        .unwrap();
    assert!(buyer_notes[0].message.contains("of 110"));
    assert!(buyer_notes[0].message.contains("accepted"));
    assert!(buyer_notes[1].message.contains("counter-offer of 120"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn responding_out_of_turn_is_forbidden(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let stranger = create_trader(&ctx.db_pool, "Stranger").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();
    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(80))
        .await
        .unwrap();

    let buyer_accepts_own = ctx
        .negotiation
        .respond(offer.id, buyer.id, OfferAction::Accept)
        .await;
    assert!(matches!(buyer_accepts_own, Err(MarketError::ForbiddenTurn)));

    let stranger_rejects = ctx
        .negotiation
        .respond(offer.id, stranger.id, OfferAction::Reject)
        .await;
    assert!(matches!(stranger_rejects, Err(MarketError::ForbiddenTurn)));

    let unchanged = Offer::find_by_id(offer.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, OfferStatus::PendingSeller);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn closed_offers_refuse_every_response(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();
    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(80))
        .await
        .unwrap();

    let rejected = ctx
        .negotiation
        .respond(offer.id, seller.id, OfferAction::Reject)
        .await
        .unwrap();

    for (actor, action) in [
        (seller.id, OfferAction::Reject),
        (seller.id, OfferAction::Accept),
        (buyer.id, OfferAction::Counter { new_price: price(90) }),
    ] {
        let result = ctx.negotiation.respond(offer.id, actor, action).await;
        assert!(matches!(result, Err(MarketError::OfferClosed)), "{:?}", action);
    }

    let unchanged = Offer::find_by_id(offer.id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, OfferStatus::Rejected);
    assert_eq!(unchanged.price, price(80));
    assert_eq!(unchanged.updated_at, rejected.updated_at);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn sellers_cannot_bid_on_their_own_listing(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();

    let result = ctx
        .negotiation
        .create_offer(listing.id, seller.id, price(100))
        .await;
    assert!(matches!(result, Err(MarketError::SelfOffer)));

    let zero = ctx
        .negotiation
        .create_offer(listing.id, seller.id, price(0))
        .await;
    assert!(matches!(zero, Err(MarketError::InvalidPrice)));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_accepts_on_one_listing_yield_one_sale(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer_one = create_trader(&ctx.db_pool, "Buyer One").await.unwrap();
    let buyer_two = create_trader(&ctx.db_pool, "Buyer Two").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();

    let first = ctx
        .negotiation
        .create_offer(listing.id, buyer_one.id, price(90))
        .await
        .unwrap();
    let second = ctx
        .negotiation
        .create_offer(listing.id, buyer_two.id, price(95))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        ctx.negotiation.respond(first.id, seller.id, OfferAction::Accept),
        ctx.negotiation.respond(second.id, seller.id, OfferAction::Accept),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(
        loser,
        Err(MarketError::OfferClosed) | Err(MarketError::ListingSold)
    ));

    let offers = Offer::find_by_listing(listing.id, &ctx.db_pool).await.unwrap();
    let accepted = offers
        .iter()
        .filter(|o| o.status == OfferStatus::Accepted)
        .count();
    assert_eq!(accepted, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_responses_to_one_offer_serialize(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();
    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(90))
        .await
        .unwrap();

    let (accept, reject) = tokio::join!(
        ctx.negotiation.respond(offer.id, seller.id, OfferAction::Accept),
        ctx.negotiation.respond(offer.id, seller.id, OfferAction::Reject),
    );

    assert!(accept.is_ok() != reject.is_ok());
    let loser = if accept.is_err() { accept } else { reject };
    assert!(matches!(loser, Err(MarketError::OfferClosed)));
}

// ============================================================================
// Post-commit delivery
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn failed_responses_send_nothing(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();
    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(90))
        .await
        .unwrap();
    ctx.dispatcher.clear();

    let result = ctx
        .negotiation
        .respond(offer.id, buyer.id, OfferAction::Accept)
        .await;
    assert!(result.is_err());

    assert!(ctx.dispatcher.sent().is_empty());
    let seller_notes = Notification::find_for_recipient(seller.id, Page::default(), &ctx.db_pool)
        .await
        .unwrap();
    // Only the new-offer notification from creation
    assert_eq!(seller_notes.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn realtime_failures_do_not_undo_the_change(ctx: &TestHarness) {
    let offline = ctx.with_failing_dispatcher();
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();

    let offer = offline
        .negotiation
        .create_offer(listing.id, buyer.id, price(90))
        .await
        .unwrap();
    let accepted = offline
        .negotiation
        .respond(offer.id, seller.id, OfferAction::Accept)
        .await
        .unwrap();

    assert_eq!(accepted.status, OfferStatus::Accepted);
    assert!(offline.dispatcher.attempts() > 0);
    assert!(offline.dispatcher.sent().is_empty());
}
