//! Error types for the observable core

use std::fmt;

use thiserror::Error;

use crate::events::SubscriptionId;

/// Errors raised while declaring observable properties on a type.
///
/// These surface at setup time, before any instance of the type exists.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("property `{name}` is already registered on `{type_name}`")]
    Duplicate {
        type_name: &'static str,
        name: &'static str,
    },

    #[error("cannot register `{name}` on `{type_name}`: instances of the type already exist")]
    Sealed {
        type_name: &'static str,
        name: &'static str,
    },
}

/// A single handler that failed during a dispatch.
pub struct HandlerFailure {
    pub subscription: SubscriptionId,
    pub error: anyhow::Error,
}

impl fmt::Debug for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFailure")
            .field("subscription", &self.subscription)
            .field("error", &format_args!("{:#}", self.error))
            .finish()
    }
}

/// Aggregated handler failures from one or more dispatch passes.
///
/// Every handler in a pass runs before this is returned, so the failures are
/// listed in the order the handlers ran.
#[derive(Debug)]
pub struct DispatchError {
    failures: Vec<HandlerFailure>,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} event handler(s) failed", self.failures.len())?;
        if let Some(first) = self.failures.first() {
            write!(f, "; first: {:#}", first.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {}

impl DispatchError {
    /// Build from a non-empty list of failures.
    pub(crate) fn from_failures(failures: Vec<HandlerFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// The first handler failure of the dispatch
    pub fn first(&self) -> &HandlerFailure {
        &self.failures[0]
    }

    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<HandlerFailure> {
        self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always false; a `DispatchError` holds at least one failure.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Append the failures of a later dispatch
    pub fn merge(&mut self, other: DispatchError) {
        self.failures.extend(other.failures);
    }

    /// Fold a sequence of dispatch results into one, keeping every failure.
    pub fn collect(results: impl IntoIterator<Item = Result<(), DispatchError>>) -> Result<(), DispatchError> {
        let mut acc: Option<DispatchError> = None;
        for result in results {
            if let Err(err) = result {
                match acc.as_mut() {
                    Some(existing) => existing.merge(err),
                    None => acc = Some(err),
                }
            }
        }
        match acc {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Crate-level error type
#[derive(Debug, Error)]
pub enum ObservableError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("registration {subscription:?} does not belong to event source `{source_label}`")]
    InvalidHandler {
        subscription: SubscriptionId,
        source_label: &'static str,
    },

    #[error(transparent)]
    HandlerExecution(#[from] DispatchError),

    #[error("index {index} out of bounds for collection of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl ObservableError {
    /// The handler failures, if this error came from a dispatch
    pub fn dispatch(&self) -> Option<&DispatchError> {
        match self {
            ObservableError::HandlerExecution(err) => Some(err),
            _ => None,
        }
    }
}
