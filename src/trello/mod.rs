pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod types;

pub use cached_client::CachedTrelloClient;
pub use client::TrelloClient;
pub use types::{Board, CardAction};
