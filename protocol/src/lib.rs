//! Wire types shared by the tutor orchestrator client.
//!
//! Everything that crosses the HTTP boundary lives here so the TUI, the one-shot CLI and tests
//! agree on one contract.

mod ids;
pub use ids::ChatId;
pub use ids::IdParseError;
pub use ids::UserId;
pub mod protocol;
pub mod tools;
