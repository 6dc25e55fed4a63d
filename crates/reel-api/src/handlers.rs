//! Request handlers.

pub mod download;
pub mod export;
pub mod health;
pub mod sessions;
pub mod uploads;

pub use download::*;
pub use export::*;
pub use health::*;
pub use sessions::*;
pub use uploads::*;
