//! Conditional logging helpers
//!
//! Decide between an Error report and an Info success line, optionally
//! turning the error into a `PolicyFailure`. The Error message is always
//! published before the failure is returned.

use std::fmt::Display;

use contracts::Severity;

use crate::bus::Bus;
use crate::error::DispatcherError;

/// Publish one Error message (`msg`, then `detail` on the following lines)
///
/// # Errors
/// `PolicyFailure` carrying `msg` when `throw` is set
pub fn log_errors(bus: &Bus, msg: &str, detail: &str, throw: bool) -> Result<(), DispatcherError> {
    if detail.is_empty() {
        bus.add_message(Severity::Error, msg);
    } else {
        bus.add_message(Severity::Error, &format!("{msg}\n{detail}"));
    }

    if throw {
        return Err(DispatcherError::policy_failure(msg));
    }
    Ok(())
}

/// Error report when `is_error`, otherwise `good_title` at Info
pub fn log_outcome(
    bus: &Bus,
    is_error: bool,
    err_title: &str,
    err_detail: &str,
    good_title: &str,
    throw: bool,
) -> Result<(), DispatcherError> {
    if is_error {
        log_errors(bus, err_title, err_detail, throw)
    } else {
        bus.add_message(Severity::Info, good_title);
        Ok(())
    }
}

/// Error when `items` is non-empty; the items become the detail, one per line
pub fn log_if_any_error<T: Display>(
    bus: &Bus,
    items: &[T],
    err_msg: &str,
    good_msg: &str,
    throw: bool,
) -> Result<(), DispatcherError> {
    let detail = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    log_outcome(bus, !items.is_empty(), err_msg, &detail, good_msg, throw)
}

/// Error when `items` is empty
pub fn log_if_none_error<T>(
    bus: &Bus,
    items: &[T],
    err_msg: &str,
    good_msg: &str,
    throw: bool,
) -> Result<(), DispatcherError> {
    log_outcome(bus, items.is_empty(), err_msg, "", good_msg, throw)
}

/// Error when `item` is absent
pub fn log_if_null_error<T>(
    bus: &Bus,
    item: Option<&T>,
    err_msg: &str,
    good_msg: &str,
    throw: bool,
) -> Result<(), DispatcherError> {
    log_outcome(bus, item.is_none(), err_msg, "", good_msg, throw)
}
