//! Shared primitives for the weft router.
//!
//! This crate contains:
//! - **Element names** — validated hierarchical `/`-separated names, scope
//!   prefixes, and ancestor walking ([`name`])
//! - **Diagnostics** — the leveled reporting collaborator that configuration
//!   code emits warnings and errors through ([`report`])

pub mod name;
pub mod report;
