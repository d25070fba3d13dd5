//! Analysis Service Interface
//!
//! Request and response handling for an external chat-completion style
//! analysis service. A plan crosses this boundary only as a [`PlanDigest`];
//! the HTTP exchange itself belongs to the caller.
//!
//! [`PlanDigest`]: crate::digest::PlanDigest

mod error;
mod request;
mod response;

pub use error::AssistantError;
pub use request::*;
pub use response::*;
