//! The interactive core: a single-consumer message loop over explicit state.
//!
//! All input (translated key presses and completed command results) enters as
//! a [`Message`] on one queue. [`update`] applies each message to the
//! [`Model`] and returns the [`Command`]s to run; commands execute off the
//! loop and feed their results back in as new messages. The model is never
//! touched from anywhere else.

pub mod command;
pub mod dispatch;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::{Key, Message};
pub use model::{Banner, Model, Pane, View};
pub use update::update;
