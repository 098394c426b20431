//! Reviews domain - post-deal feedback between the two parties of an
//! accepted offer or a completed demand.

pub mod actions;
pub mod eligibility;
pub mod gate;
pub mod models;

pub use actions::SubmitReview;
pub use gate::ReviewGate;
pub use models::{Review, ReviewTarget};
