//! Kakao i Open Builder skill contracts and value types.
//!
//! This crate exposes the response components a skill server assembles (cards, quick replies,
//! contexts), validates them against the platform's structural rules and renders them into the
//! wire JSON the platform expects. It also parses inbound skill and validation payloads and
//! builds event API requests. No I/O happens here.
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod interaction;
pub mod payload;
pub mod render;
pub mod response;
pub mod telemetry;
pub mod validate;

pub use components::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use event::*;
pub use interaction::*;
pub use payload::*;
pub use render::*;
pub use response::*;
pub use telemetry::*;
