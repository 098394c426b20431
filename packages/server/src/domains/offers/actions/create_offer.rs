//! Create offer action - opens a negotiation on an available listing

use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::info;

use crate::common::{validate_price, ListingId, MarketError, MarketResult, MemberId};
use crate::domains::listings::{Listing, ListingStatus};
use crate::domains::notifications::Notification;
use crate::domains::offers::models::Offer;
use crate::kernel::{EventKind, Outbox};

/// Create an offer in `pending_seller` and tell the seller about it.
pub async fn create_offer(
    listing_id: ListingId,
    buyer_id: MemberId,
    price: Decimal,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<Offer> {
    let price = validate_price(price)?;

    let listing = Listing::find_for_share(listing_id, &mut *conn)
        .await?
        .ok_or(MarketError::NotFound("Listing"))?;

    if listing.status == ListingStatus::Sold {
        return Err(MarketError::ListingSold);
    }
    if listing.seller_id == buyer_id {
        return Err(MarketError::SelfOffer);
    }

    let offer = Offer::create(listing.id, buyer_id, listing.seller_id, price, &mut *conn).await?;

    let notification = Notification::append(
        listing.seller_id,
        &format!("New offer of {} on \"{}\"", offer.price, listing.title),
        Some(&format!("/offers/{}", offer.id)),
        &mut *conn,
    )
    .await?;

    outbox.emit(listing.seller_id, EventKind::NewOffer, &offer)?;
    outbox.notification(&notification)?;

    info!(
        offer_id = %offer.id,
        listing_id = %listing.id,
        buyer_id = %buyer_id,
        price = %offer.price,
        "Offer created"
    );

    Ok(offer)
}
