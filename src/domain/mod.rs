mod birthday;
mod booking;
mod consent;
mod customer;
mod dates;
mod expense;
mod lead;
mod money;
mod pagination;
mod payment;
mod range;

pub use birthday::*;
pub use booking::*;
pub use consent::*;
pub use customer::*;
pub use dates::*;
pub use expense::*;
pub use lead::*;
pub use money::*;
pub use pagination::*;
pub use payment::*;
pub use range::*;
