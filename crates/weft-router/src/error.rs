//! Configuration error kinds.
//!
//! Parse-time kinds (`MalformedName`, `InvalidParameter`) are local and
//! non-fatal: the offending directive is dropped and parsing continues.
//! `UnresolvedTarget` is a post-graph warning subject to policy. Only the
//! registration kinds (`AlreadyScheduled`, `NoScheduler`) can halt router
//! startup, because an element with no scheduler slot cannot run.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed element name {0:?}")]
    MalformedName(String),
    #[error("invalid scheduling parameter {0:?}")]
    InvalidParameter(String),
    #[error("scheduling directive targets unknown element {0:?}")]
    UnresolvedTarget(String),
    #[error("element {0:?} is already scheduled")]
    AlreadyScheduled(String),
    #[error("no scheduler available for element {0:?}")]
    NoScheduler(String),
}
