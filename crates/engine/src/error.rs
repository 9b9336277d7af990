//! The module contains the errors the engine can report.
//!
//! None of them ever escapes [`summarize`]: the aggregator recovers from each
//! one locally by excluding the offending record from the affected breakdown.
//! They are public so callers inspecting a single [`ReceiptRecord`] can see
//! why it would be left out.
//!
//! The errors are:
//!
//! - [`MissingAmount`] when a record has no extracted total yet.
//! - [`InvalidAmount`] when the total cannot be read as a finite decimal.
//! - [`AmountOverflow`] when a total, or a sum it joins, falls outside the
//!   decimal range.
//! - [`InvalidTimestamp`] when no calendar date can be derived for a record.
//!
//!  [`summarize`]: crate::summarize
//!  [`ReceiptRecord`]: crate::ReceiptRecord
//!  [`MissingAmount`]: EngineError::MissingAmount
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`AmountOverflow`]: EngineError::AmountOverflow
//!  [`InvalidTimestamp`]: EngineError::InvalidTimestamp
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Missing amount")]
    MissingAmount,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
