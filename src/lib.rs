//! wand-layout - panel docking and layout engine for controller-mounted panels
//!
//! Panels live on a ring around a handheld controller (the "wand") in three
//! angular stacks, or float freely in the world. This crate implements the
//! Elm-style core: a `LayoutEngine` model stepped by `tick` for per-frame
//! input and by `update` for discrete messages, producing panel transforms
//! and fire-and-forget commands.

pub mod commands;
pub mod config;
pub mod config_paths;
pub mod depenetration;
pub mod docking;
pub mod engine;
pub mod gaps;
pub mod geometry;
pub mod layout_store;
pub mod messages;
pub mod mode;
pub mod panel;
pub mod rotation;
pub mod tracing;
pub mod transition;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::LayoutConfig;
pub use engine::{FrameInput, FrameOutput, LayoutEngine};
pub use messages::Msg;
pub use update::update;
