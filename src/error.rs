//! # Error Types
//!
//! Errors returned by the UI system and the editor gizmo. Invalid handles,
//! rejected input and failed resource acquisition are all reported through
//! [`UiError`]; nothing in this crate panics on bad input from the host.

use crate::ui::handle::{ControlHandle, ControlKind};
use thiserror::Error;

/// Failure kinds surfaced by UI and editor operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UiError {
    /// The handle is the invalid sentinel, stale, or points at a free slot.
    #[error("invalid or stale control handle {0:?}")]
    InvalidHandle(ControlHandle),

    /// The handle resolves, but to a different kind of control.
    #[error("expected a {expected} control, found a {found}")]
    WrongKind {
        expected: ControlKind,
        found: ControlKind,
    },

    /// Every slot of the kind is in use.
    #[error("no free {0} slots remain")]
    CapacityExhausted(ControlKind),

    /// A render buffer range, binding set instance, font or atlas could not be obtained.
    #[error("resource acquisition failed: {0}")]
    ResourceAcquisition(String),

    /// The operation was rejected because its input does not validate.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The request would break a structural invariant of the control tree.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The root control cannot be destroyed or reparented.
    #[error("the root control cannot be destroyed or reparented")]
    RootImmutable,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, UiError>;
