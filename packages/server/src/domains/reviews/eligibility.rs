//! Who may review whom, and when.

use crate::common::{MarketError, MarketResult, MemberId};
use crate::domains::demands::{Demand, DemandStatus};
use crate::domains::offers::{Offer, OfferStatus};

/// The two sides of a deal and whether it has closed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deal {
    /// Seller for offers, trader for demands
    pub owner: MemberId,
    /// Buyer for offers, hired broker for demands
    pub counterparty: Option<MemberId>,
    pub completed: bool,
}

impl Deal {
    pub fn from_offer(offer: &Offer) -> Self {
        Self {
            owner: offer.seller_id,
            counterparty: Some(offer.buyer_id),
            completed: offer.status == OfferStatus::Accepted,
        }
    }

    pub fn from_demand(demand: &Demand) -> Self {
        Self {
            owner: demand.trader_id,
            counterparty: demand.hired_broker_id,
            completed: demand.status == DemandStatus::Completed,
        }
    }

    /// A completed deal may be reviewed by either party, about the other.
    pub fn check_review(&self, reviewer: MemberId, reviewee: MemberId) -> MarketResult<()> {
        let counterparty = match self.counterparty {
            Some(id) if self.completed => id,
            _ => return Err(MarketError::DealNotCompleted),
        };

        let expected = if reviewer == self.owner {
            counterparty
        } else if reviewer == counterparty {
            self.owner
        } else {
            return Err(MarketError::forbidden("not a party to this deal"));
        };

        if reviewee != expected {
            return Err(MarketError::forbidden("you can only review the other party"));
        }
        Ok(())
    }
}

/// Ratings are whole stars from 1 to 5.
pub fn validate_rating(rating: i32) -> MarketResult<i16> {
    if (1..=5).contains(&rating) {
        Ok(rating as i16)
    } else {
        Err(MarketError::InvalidRating(rating))
    }
}
