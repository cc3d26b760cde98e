pub mod client;
pub mod models;
pub mod token;

pub use client::{StoryPhase, StoryPublisher};
pub use token::exchange_token;
