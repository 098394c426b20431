// HTTP routes
pub mod demands;
pub mod health;
pub mod listings;
pub mod members;
pub mod notifications;
pub mod offers;
pub mod reviews;
pub mod stream;

pub use health::*;
