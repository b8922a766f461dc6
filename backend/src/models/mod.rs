pub mod macros;
pub mod role_order;
pub mod roster;

pub use role_order::*;
pub use roster::*;
