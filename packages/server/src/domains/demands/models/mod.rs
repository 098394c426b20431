pub mod demand;
pub mod demand_interest;

pub use demand::{Demand, DemandStatus};
pub use demand_interest::DemandInterest;
