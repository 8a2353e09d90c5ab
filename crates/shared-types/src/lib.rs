//! # Shared Types Crate
//!
//! Domain entities shared by every crate in the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities, amounts, flight keys and
//!   status codes are defined here and nowhere else.
//! - **Explicit Identity**: every mutating call carries the caller's
//!   [`Address`]; there is no ambient sender.
//! - **Integral Value**: amounts are `u128` wei, never floating point.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
