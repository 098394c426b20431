// Business domains
pub mod auth;
pub mod demands;
pub mod listings;
pub mod members;
pub mod notifications;
pub mod offers;
pub mod reviews;
