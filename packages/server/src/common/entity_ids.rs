//! Typed ID definitions for all marketplace entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Member entities (traders and brokers).
pub struct Member;

/// Marker type for Listing entities (items posted for sale).
pub struct Listing;

/// Marker type for Offer entities (negotiations on a listing).
pub struct Offer;

/// Marker type for Demand entities (buy-side requests).
pub struct Demand;

/// Marker type for Review entities.
pub struct Review;

/// Marker type for Notification entities.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type MemberId = Id<Member>;
pub type ListingId = Id<Listing>;
pub type OfferId = Id<Offer>;
pub type DemandId = Id<Demand>;
pub type ReviewId = Id<Review>;
pub type NotificationId = Id<Notification>;
