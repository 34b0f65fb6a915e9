//! # Ratewatch Shared
//!
//! Wire types shared by the server and anything that talks to it.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
