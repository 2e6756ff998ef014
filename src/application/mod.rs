// Application layer - orchestration over the cached collections plus the
// pure reporting functions.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
