//! Offer state machine.
//!
//! ```text
//!                counter (seller)
//!   pending_seller ───────────────▶ pending_buyer
//!        │   ▲                          │
//!        │   └──────────────────────────┤ counter (buyer)
//!        │ accept / reject              │ accept / reject
//!        ▼                              ▼
//!     accepted | rejected          accepted | rejected
//! ```
//!
//! `decide` is pure: it validates one response against the current status
//! and returns the next status. Persisting it and the accept cascade are the
//! caller's job.

use rust_decimal::Decimal;

use super::models::{Offer, OfferStatus};
use crate::common::{validate_price, MarketError, MarketResult, MemberId};

/// Which side of the negotiation an actor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buyer,
    Seller,
}

impl Side {
    pub fn of(offer: &Offer, actor: MemberId) -> Option<Side> {
        if actor == offer.seller_id {
            Some(Side::Seller)
        } else if actor == offer.buyer_id {
            Some(Side::Buyer)
        } else {
            None
        }
    }

    /// The pending status that hands the turn to this side.
    fn pending(self) -> OfferStatus {
        match self {
            Side::Buyer => OfferStatus::PendingBuyer,
            Side::Seller => OfferStatus::PendingSeller,
        }
    }

    fn other(self) -> Side {
        match self {
            Side::Buyer => Side::Seller,
            Side::Seller => Side::Buyer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    Accept,
    Reject,
    Counter { new_price: Decimal },
}

impl OfferAction {
    /// Parse a `responseType` + optional `newPrice` pair from the API.
    pub fn parse(response_type: &str, new_price: Option<Decimal>) -> MarketResult<Self> {
        match response_type {
            "accept" => Ok(OfferAction::Accept),
            "reject" => Ok(OfferAction::Reject),
            "counter" => {
                let new_price = validate_price(new_price.ok_or(MarketError::InvalidPrice)?)?;
                Ok(OfferAction::Counter { new_price })
            }
            other => Err(MarketError::InvalidAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OfferAction::Accept => "accept",
            OfferAction::Reject => "reject",
            OfferAction::Counter { .. } => "counter",
        }
    }
}

/// Validate `action` by `side` against `status` and return the next status.
///
/// - non-participants are refused with `ForbiddenTurn`
/// - terminal offers are refused with `OfferClosed`
/// - responding out of turn is refused with `ForbiddenTurn`
pub fn decide(
    status: OfferStatus,
    side: Option<Side>,
    action: &OfferAction,
) -> MarketResult<OfferStatus> {
    let side = side.ok_or(MarketError::ForbiddenTurn)?;

    if status.is_terminal() {
        return Err(MarketError::OfferClosed);
    }

    if status != side.pending() {
        return Err(MarketError::ForbiddenTurn);
    }

    Ok(match action {
        OfferAction::Accept => OfferStatus::Accepted,
        OfferAction::Reject => OfferStatus::Rejected,
        OfferAction::Counter { .. } => side.other().pending(),
    })
}
