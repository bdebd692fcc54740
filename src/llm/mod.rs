pub mod canned;
pub mod client;
pub mod normalize;
pub mod prompts;

pub use canned::*;
pub use client::*;
pub use normalize::*;
pub use prompts::*;
