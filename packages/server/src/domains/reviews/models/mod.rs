pub mod review;

pub use review::{Review, ReviewTarget};
