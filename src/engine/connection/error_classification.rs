//! Classification of engine connection failures.
//!
//! `Bollard` reports a missing or unreadable socket in several shapes: a
//! dedicated `SocketNotFoundError`, a bare I/O error, or an I/O error buried
//! in a hyper source chain. Set-up failures are folded into one
//! [`ConnectionFault`] per cause so the run report names what went wrong.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::ConnectionFault;

/// Extract the filesystem path from a socket URI.
///
/// Only `unix://` and `npipe://` endpoints carry a path.
pub(super) fn extract_socket_path(socket_uri: &str) -> Option<&Path> {
    socket_uri
        .strip_prefix("unix://")
        .or_else(|| socket_uri.strip_prefix("npipe://"))
        .map(Path::new)
}

/// Map an I/O error kind to a path-specific fault, if it has one.
fn fault_for_kind(kind: ErrorKind, socket_path: Option<&Path>) -> Option<ConnectionFault> {
    let path = socket_path?.to_path_buf();
    match kind {
        ErrorKind::PermissionDenied => Some(ConnectionFault::PermissionDenied { path }),
        ErrorKind::NotFound => Some(ConnectionFault::SocketNotFound { path }),
        _ => None,
    }
}

/// Find the most specific I/O error kind carried by a `Bollard` error.
fn io_kind(bollard_error: &bollard::errors::Error) -> Option<ErrorKind> {
    if let bollard::errors::Error::IOError { err } = bollard_error {
        return Some(io_error_kind_in_chain(err).unwrap_or_else(|| err.kind()));
    }
    io_error_kind_in_chain(bollard_error)
}

/// Classify a `Bollard` error raised while creating the client.
///
/// Falls back to `ConnectionFailed` for anything without a recognisable
/// filesystem cause.
pub(super) fn classify_connection_error(
    bollard_error: &bollard::errors::Error,
    socket_uri: &str,
) -> ConnectionFault {
    let socket_path = extract_socket_path(socket_uri);

    if matches!(
        bollard_error,
        bollard::errors::Error::SocketNotFoundError(_)
    ) {
        if let Some(fault) = fault_for_kind(ErrorKind::NotFound, socket_path) {
            return fault;
        }
    }

    io_kind(bollard_error)
        .and_then(|kind| fault_for_kind(kind, socket_path))
        .unwrap_or_else(|| ConnectionFault::ConnectionFailed {
            message: bollard_error.to_string(),
        })
}

/// Classify a `Bollard` error raised by the set-up ping.
///
/// The client is created lazily, so a vanished or locked socket only shows up
/// here; those keep their path-specific fault, everything else is a failed
/// health check.
pub(super) fn classify_ping_error(
    bollard_error: &bollard::errors::Error,
    socket_uri: &str,
) -> ConnectionFault {
    io_kind(bollard_error)
        .and_then(|kind| fault_for_kind(kind, extract_socket_path(socket_uri)))
        .unwrap_or_else(|| ConnectionFault::HealthCheckFailed {
            message: bollard_error.to_string(),
        })
}

/// Walk the error source chain looking for an `io::Error` kind.
fn io_error_kind_in_chain(error: &dyn std::error::Error) -> Option<ErrorKind> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = error.source();
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return Some(io_err.kind());
        }
        current = err.source();
    }
    None
}
