use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use super::actions;
use super::machines::OfferAction;
use super::models::Offer;
use crate::common::{ListingId, MarketError, MarketResult, MemberId, OfferId, Page};
use crate::domains::listings::Listing;
use crate::kernel::{BaseRealtimeDispatcher, Outbox};

/// Negotiation Engine - the only writer of offers and listing sale state.
///
/// Every operation is one transaction; realtime events go out only after it
/// commits.
#[derive(Clone)]
pub struct NegotiationEngine {
    pool: PgPool,
    dispatcher: Arc<dyn BaseRealtimeDispatcher>,
}

impl NegotiationEngine {
    pub fn new(pool: PgPool, dispatcher: Arc<dyn BaseRealtimeDispatcher>) -> Self {
        Self { pool, dispatcher }
    }

    pub async fn create_offer(
        &self,
        listing_id: ListingId,
        buyer_id: MemberId,
        price: Decimal,
    ) -> MarketResult<Offer> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let offer = actions::create_offer(listing_id, buyer_id, price, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(offer)
    }

    pub async fn respond(
        &self,
        offer_id: OfferId,
        actor_id: MemberId,
        action: OfferAction,
    ) -> MarketResult<Offer> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let offer =
            actions::respond_to_offer(offer_id, actor_id, action, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(offer)
    }

    /// An offer, visible to its buyer and seller only.
    pub async fn offer(&self, offer_id: OfferId, member_id: MemberId) -> MarketResult<Offer> {
        let offer = Offer::find_by_id(offer_id, &self.pool)
            .await?
            .ok_or(MarketError::NotFound("Offer"))?;
        if !offer.is_party(member_id) {
            return Err(MarketError::forbidden("not a party to this offer"));
        }
        Ok(offer)
    }

    /// Every offer on a listing. Seller only.
    pub async fn offers_on_listing(
        &self,
        listing_id: ListingId,
        seller_id: MemberId,
    ) -> MarketResult<Vec<Offer>> {
        let listing = Listing::find_by_id(listing_id, &self.pool)
            .await?
            .ok_or(MarketError::NotFound("Listing"))?;
        if listing.seller_id != seller_id {
            return Err(MarketError::forbidden("only the seller can see all offers"));
        }
        Ok(Offer::find_by_listing(listing_id, &self.pool).await?)
    }

    pub async fn offers_for_member(
        &self,
        member_id: MemberId,
        page: Page,
    ) -> MarketResult<Vec<Offer>> {
        Ok(Offer::find_for_member(member_id, page, &self.pool).await?)
    }
}
