// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! The toolkit error taxonomy.
//!
//! Errors fall into three groups:
//!
//! - Programmer-error signals ([`Error::WidgetDisposed`],
//!   [`Error::ThreadInvalidAccess`], [`Error::InvalidArgument`], ...) raised
//!   by the state/thread checks that guard every public widget operation.
//!   These are never swallowed; callers are expected to treat them as bugs.
//! - Remote failures ([`Error::Remote`]): the automation service rejected a
//!   call. These are surfaced to the caller of the widget operation that
//!   triggered the round trip.
//! - Bootstrap failures ([`Error::Bootstrap`]): the session handshake did not
//!   complete. Fatal; the session caches the failure and never retries.

use thiserror::Error;

use crate::remote::api::RemoteCallError;

/// Alias for `Result` with the toolkit [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the toolkit.
///
/// `Clone` is required because the session bootstrap caches its outcome and
/// replays it to every later caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The widget has been disposed and can no longer be used.
    #[error("widget is disposed")]
    WidgetDisposed,

    /// A widget or display was touched from a thread other than the one that
    /// created its display.
    #[error("invalid thread access")]
    ThreadInvalidAccess,

    /// An argument did not satisfy the operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A control passed to a scoped layout call is not a descendant of the
    /// receiver.
    #[error("control is not in the receiver's widget tree")]
    InvalidParent,

    /// A remote peer that the operation needs does not exist (yet).
    #[error("no remote handle available: {0}")]
    NoHandles(&'static str),

    /// The display has been disposed.
    #[error("display is disposed")]
    DeviceDisposed,

    /// A runnable handed to the display could not be executed.
    #[error("failed to execute runnable: {0}")]
    FailedExec(String),

    /// The operation is not supported by the remote backend.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// The remote session handshake failed.
    #[error("remote session bootstrap failed: {0}")]
    Bootstrap(String),

    /// A remote call was rejected by the automation service.
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteCallError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::api::RemoteCallError;

    #[test]
    fn remote_errors_convert() {
        fn fails() -> Result<()> {
            Err(RemoteCallError::UnknownProperty("Label".into()))?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(matches!(err, Error::Remote(RemoteCallError::UnknownProperty(name)) if name == "Label"));
    }

    #[test]
    fn bootstrap_errors_clone() {
        let err = Error::Bootstrap("no office".into());
        assert_eq!(err.clone(), err);
    }
}
