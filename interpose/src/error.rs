// vim: tw=80
use thiserror::Error;

use crate::verify::{Times, plural};

/// Everything that can go wrong while stubbing, calling or verifying a mock.
///
/// The non-`try_` entry points panic with this error's message, which fails
/// the calling test.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A non-relaxed mock was called with no matching stub.
    #[error("No matching stub found for {mock}.{call}{near_misses}")]
    NoStubFound {
        mock: String,
        call: String,
        /// Pre-rendered description of stubs for the same method that did
        /// not match.  Empty if there are none.
        near_misses: String
    },

    /// A capture slot was read before anything was captured into it.
    #[error("Slot<{ty}> was never captured")]
    EmptyCapture {
        ty: &'static str
    },

    #[error("Verification failed for {mock}.{call}: expected to be called {expected}, but was called {actual} {}", plural(.actual))]
    VerificationFailed {
        mock: String,
        call: String,
        expected: Times,
        actual: usize
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String
    },

    #[error("No mock method was called while recording")]
    NothingRecorded,

    #[error("every or verify may not be nested inside another every or verify")]
    NestedRecording,

    #[error("{unused} argument matcher(s) could not be assigned to an argument of {call}")]
    MatcherMisuse {
        call: String,
        unused: usize
    },

    /// A literal argument equals the placeholder of a matcher whose
    /// placeholder never varies, so the matcher's position is unknown.
    #[error("Cannot tell which argument of {call} an argument matcher belongs to.  Wrap literal arguments in eq() or use a matcher for every argument")]
    AmbiguousMatcher {
        call: String
    },

    #[error("{mock} has calls that were never verified:\n{calls}")]
    UnverifiedCalls {
        mock: String,
        calls: String
    }
}
