//! Writing components into a project.
//!
//! [`ComponentAdder`] resolves a component, renders its files with the
//! project's variables and reconciles each one with what is already on disk.
//! Existing files with other content go through [`conflict`].

pub mod adder;
pub mod conflict;

pub use adder::{AddReport, ComponentAdder, FileOutcome};
pub use conflict::{resolve_conflict, Choice, Resolution, CONFLICT_PROMPT_KEY};
