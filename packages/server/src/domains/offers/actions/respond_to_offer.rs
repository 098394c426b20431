//! Respond to offer action - accept, reject or counter on your turn

use sqlx::PgConnection;
use tracing::info;

use crate::common::{MarketError, MarketResult, MemberId, OfferId};
use crate::domains::listings::Listing;
use crate::domains::notifications::Notification;
use crate::domains::offers::machines::{decide, OfferAction, Side};
use crate::domains::offers::models::{Offer, OfferStatus};
use crate::kernel::{EventKind, Outbox};

/// Apply one response to an offer.
///
/// Locks are taken listing-then-offer so a response racing an accept on a
/// sibling offer waits instead of deadlocking. On accept, the listing is sold
/// and every other pending offer on it is rejected in this same transaction.
pub async fn respond_to_offer(
    offer_id: OfferId,
    actor_id: MemberId,
    action: OfferAction,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<Offer> {
    let listing_id = Offer::find_by_id_in(offer_id, &mut *conn)
        .await?
        .ok_or(MarketError::NotFound("Offer"))?
        .listing_id;

    let listing = match action {
        OfferAction::Accept => Listing::find_for_update(listing_id, &mut *conn).await?,
        _ => Listing::find_for_share(listing_id, &mut *conn).await?,
    }
    .ok_or(MarketError::NotFound("Listing"))?;

    let offer = Offer::find_for_update(offer_id, &mut *conn)
        .await?
        .ok_or(MarketError::NotFound("Offer"))?;

    let side = Side::of(&offer, actor_id);
    let next = decide(offer.status, side, &action)?;
    let counterparty = offer.counterparty_of(actor_id);
    // Whose proposal is being answered, from the recipient's point of view
    let proposal = if side == Some(Side::Seller) {
        "offer"
    } else {
        "counter-offer"
    };

    let (updated, message, closed_siblings) = match action {
        OfferAction::Accept => {
            if !Listing::mark_sold_if_available(listing.id, &mut *conn).await? {
                return Err(MarketError::ListingSold);
            }
            let updated =
                Offer::apply_transition(offer.id, OfferStatus::Accepted, offer.price, &mut *conn)
                    .await?;
            let siblings =
                Offer::reject_pending_siblings(listing.id, offer.id, &mut *conn).await?;
            let message = format!(
                "Your {} of {} on \"{}\" was accepted",
                proposal, updated.price, listing.title
            );
            (updated, message, siblings)
        }
        OfferAction::Reject => {
            let updated =
                Offer::apply_transition(offer.id, OfferStatus::Rejected, offer.price, &mut *conn)
                    .await?;
            let message = format!("Your {} on \"{}\" was rejected", proposal, listing.title);
            (updated, message, Vec::new())
        }
        OfferAction::Counter { new_price } => {
            let updated = Offer::apply_transition(offer.id, next, new_price, &mut *conn).await?;
            let message = format!(
                "New counter-offer of {} on \"{}\"",
                updated.price, listing.title
            );
            (updated, message, Vec::new())
        }
    };

    let notification = Notification::append(
        counterparty,
        &message,
        Some(&format!("/offers/{}", updated.id)),
        &mut *conn,
    )
    .await?;

    outbox.emit(counterparty, EventKind::OfferUpdate, &updated)?;
    outbox.notification(&notification)?;
    for sibling in &closed_siblings {
        outbox.emit(sibling.buyer_id, EventKind::OfferUpdate, sibling)?;
    }

    info!(
        offer_id = %updated.id,
        listing_id = %listing.id,
        actor_id = %actor_id,
        action = action.name(),
        from = %offer.status,
        to = %updated.status,
        closed_siblings = closed_siblings.len(),
        "Offer transitioned"
    );

    Ok(updated)
}
