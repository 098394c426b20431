//! Integration tests for the review gate.

mod common;

use common::{
    create_broker, create_demand, create_hired_demand, create_listing, create_trader, price,
    TestHarness,
};
use market_core::common::{MarketError, MemberId, Page};
use market_core::domains::members::Member;
use market_core::domains::offers::{Offer, OfferAction};
use market_core::domains::reviews::{Review, ReviewTarget, SubmitReview};
use market_core::kernel::EventKind;
use test_context::test_context;

fn review(
    reviewer_id: MemberId,
    reviewee_id: MemberId,
    target: ReviewTarget,
    rating: i32,
) -> SubmitReview {
    SubmitReview {
        reviewer_id,
        reviewee_id,
        target,
        rating,
        review_text: Some("Smooth deal".to_string()),
    }
}

/// Seller, buyer and an accepted offer between them.
async fn accepted_offer(ctx: &TestHarness) -> (Member, Member, Offer) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();
    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(100))
        .await
        .unwrap();
    let offer = ctx
        .negotiation
        .respond(offer.id, seller.id, OfferAction::Accept)
        .await
        .unwrap();
    (seller, buyer, offer)
}

#[test_context(TestHarness)]
#[tokio::test]
async fn both_parties_can_review_an_accepted_offer_once(ctx: &TestHarness) {
    let (seller, buyer, offer) = accepted_offer(ctx).await;
    let target = ReviewTarget::Offer(offer.id);
    ctx.dispatcher.clear();

    let submitted = ctx
        .reviews
        .submit_review(review(buyer.id, seller.id, target, 5))
        .await
        .unwrap();
    assert_eq!(submitted.rating, 5);
    assert_eq!(submitted.offer_id, Some(offer.id));
    assert_eq!(
        ctx.dispatcher.kinds_sent_to(seller.id),
        vec![EventKind::ReviewReceived, EventKind::NewNotification]
    );

    // Different rating and text still counts as a duplicate
    let mut again = review(buyer.id, seller.id, target, 1);
    again.review_text = None;
    let duplicate = ctx.reviews.submit_review(again).await;
    assert!(matches!(duplicate, Err(MarketError::DuplicateReview)));

    ctx.reviews
        .submit_review(review(seller.id, buyer.id, target, 4))
        .await
        .unwrap();

    let received = Review::find_for_reviewee(seller.id, Page::default(), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(received.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pending_offers_cannot_be_reviewed(ctx: &TestHarness) {
    let seller = create_trader(&ctx.db_pool, "Seller").await.unwrap();
    let buyer = create_trader(&ctx.db_pool, "Buyer").await.unwrap();
    let listing = create_listing(&ctx.db_pool, &seller, 100).await.unwrap();
    let offer = ctx
        .negotiation
        .create_offer(listing.id, buyer.id, price(90))
        .await
        .unwrap();

    let result = ctx
        .reviews
        .submit_review(review(buyer.id, seller.id, ReviewTarget::Offer(offer.id), 3))
        .await;
    assert!(matches!(result, Err(MarketError::DealNotCompleted)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn demand_reviews_unlock_on_completion(ctx: &TestHarness) {
    let trader = create_trader(&ctx.db_pool, "Trader").await.unwrap();
    let broker = create_broker(&ctx.db_pool, "Broker").await.unwrap();
    let demand = create_hired_demand(ctx, &trader, &broker).await.unwrap();
    let target = ReviewTarget::Demand(demand.id);

    let early = ctx
        .reviews
        .submit_review(review(trader.id, broker.id, target, 5))
        .await;
    assert!(matches!(early, Err(MarketError::DealNotCompleted)));

    ctx.engagement
        .complete(demand.id, trader.id, broker.id)
        .await
        .unwrap();

    let submitted = ctx
        .reviews
        .submit_review(review(trader.id, broker.id, target, 5))
        .await
        .unwrap();
    assert_eq!(submitted.demand_id, Some(demand.id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_counterparty_can_be_reviewed(ctx: &TestHarness) {
    let (seller, buyer, offer) = accepted_offer(ctx).await;
    let outsider = create_trader(&ctx.db_pool, "Outsider").await.unwrap();
    let target = ReviewTarget::Offer(offer.id);

    let by_outsider = ctx
        .reviews
        .submit_review(review(outsider.id, seller.id, target, 2))
        .await;
    assert!(matches!(by_outsider, Err(MarketError::Forbidden(_))));

    let of_outsider = ctx
        .reviews
        .submit_review(review(buyer.id, outsider.id, target, 2))
        .await;
    assert!(matches!(of_outsider, Err(MarketError::Forbidden(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn ratings_outside_one_to_five_are_rejected(ctx: &TestHarness) {
    let (seller, buyer, offer) = accepted_offer(ctx).await;
    let target = ReviewTarget::Offer(offer.id);

    for rating in [0, 6] {
        let result = ctx
            .reviews
            .submit_review(review(buyer.id, seller.id, target, rating))
            .await;
        assert!(matches!(result, Err(MarketError::InvalidRating(r)) if r == rating));
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_duplicate_reviews_store_one(ctx: &TestHarness) {
    let (seller, buyer, offer) = accepted_offer(ctx).await;
    let target = ReviewTarget::Offer(offer.id);

    let (a, b) = tokio::join!(
        ctx.reviews.submit_review(review(buyer.id, seller.id, target, 5)),
        ctx.reviews.submit_review(review(buyer.id, seller.id, target, 4)),
    );
    assert!(a.is_ok() != b.is_ok());
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(loser, Err(MarketError::DuplicateReview)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_deals_are_not_found(ctx: &TestHarness) {
    let trader = create_trader(&ctx.db_pool, "Trader").await.unwrap();
    let other = create_trader(&ctx.db_pool, "Other").await.unwrap();
    let never_hired = create_demand(&ctx.db_pool, &trader).await.unwrap();

    let missing = ctx
        .reviews
        .submit_review(review(
            trader.id,
            other.id,
            ReviewTarget::Offer(market_core::common::OfferId::new()),
            5,
        ))
        .await;
    assert!(matches!(missing, Err(MarketError::NotFound("Offer"))));

    let unhired = ctx
        .reviews
        .submit_review(review(trader.id, other.id, ReviewTarget::Demand(never_hired.id), 5))
        .await;
    assert!(matches!(unhired, Err(MarketError::DealNotCompleted)));
}
