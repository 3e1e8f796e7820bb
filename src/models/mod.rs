//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod conversation;
pub mod handler;
pub mod outcome;
pub mod response;
pub mod settings;

pub use conversation::*;
pub use handler::*;
pub use outcome::*;
pub use response::*;
pub use settings::*;
