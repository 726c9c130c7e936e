//! Swelld exports SwellDreams character records as portable PNG character
//! cards.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`png_text`] implements the PNG `tEXt` chunk codec: building chunks,
//!   splicing them in front of the terminal chunk, and reading them back.
//! - [`character`] defines the internal record model supplied by callers
//!   (persona, story branches, constant reminders).
//! - [`card`] converts a record into the interchange `chara_card_v3` card
//!   consumed by third-party frontends.
//! - [`export`] assembles the two output profiles: the orchestration
//!   pipeline, the native full-fidelity envelope, avatar handling, and
//!   re-import of exported files.
//! - [`core`] owns configuration and shared constants.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`cli::run`].

pub mod card;
pub mod character;
pub mod cli;
pub mod core;
pub mod export;
pub mod png_text;
