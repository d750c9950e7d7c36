//! Predicts the outcome of persuade, intimidate and bribe checks in a game's
//! dialogue menu and annotates the topic list with the result.
//!
//! The host engine is reached only through [`host::DialogueHost`]; everything
//! else here is plain data and logic driven from the menu's message callback.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod host;
pub mod overlay;
pub mod processor;
pub mod scenario;
pub mod session;
pub mod speech;
pub mod template;

pub use config::Settings;
pub use host::DialogueHost;
pub use session::{DialogueSession, UiMessage};
