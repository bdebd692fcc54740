pub mod analyze;
pub mod combine;

pub use analyze::*;
pub use combine::*;
