pub mod aggregator;
pub mod classify;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod platform;
pub mod resolve;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::platform::*;
    pub use crate::resolve::*;
}
