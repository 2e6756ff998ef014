mod cache;
mod client;

pub use cache::*;
pub use client::*;
