//! Native backend adapter: best-effort writing through a host plist facility.
//!
//! A native backend is an unreliable collaborator: its library may be missing,
//! load without the symbols we need, or fail at write time. [`try_write_native`]
//! folds every one of those cases (panics included) into a [`NativeWriteOutcome`]
//! so the dispatcher can fall back to the portable encoder. Nothing here returns
//! an [`crate::XcplistError`].
//!
//! Availability is probed on every call and never cached, so a facility that
//! appears or disappears between calls is picked up.

#[cfg(all(target_os = "macos", feature = "native"))]
mod core_foundation;

#[cfg(all(target_os = "macos", feature = "native"))]
pub use core_foundation::CoreFoundationBackend;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::value::Dictionary;

/// Why a native backend cannot be used right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The native library could not be located or loaded.
    LibraryNotFound(String),
    /// The library loaded, but a required type or function is missing.
    MissingSymbol(String),
    /// No native facility exists for this platform or build.
    Unsupported,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::LibraryNotFound(lib) => write!(f, "library {lib} could not be loaded"),
            Unavailable::MissingSymbol(sym) => write!(f, "required symbol {sym} is missing"),
            Unavailable::Unsupported => f.write_str("no native backend on this platform"),
        }
    }
}

/// Result of probing a native backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(Unavailable),
}

/// A native write that was attempted and did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFailure(pub String);

impl fmt::Display for NativeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Advisory outcome of [`try_write_native`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeWriteOutcome {
    Succeeded,
    Unavailable(Unavailable),
    Failed(NativeFailure),
}

/// A host facility able to write plist files.
///
/// Implementations may assume `dict` came out of coercion or decoding, so it
/// only holds strings, dictionaries and arrays. A successful write must leave a
/// file that [`crate::read_plist`] decodes to an equal dictionary.
pub trait NativeBackend {
    /// Human-readable name for logs.
    fn name(&self) -> &'static str;

    /// Check whether the facility can be used right now.
    fn probe(&self) -> Availability;

    /// Write `dict` to `path`.
    fn write(&self, dict: &Dictionary, path: &Path) -> Result<(), NativeFailure>;
}

impl<B: NativeBackend + ?Sized> NativeBackend for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn probe(&self) -> Availability {
        (**self).probe()
    }

    fn write(&self, dict: &Dictionary, path: &Path) -> Result<(), NativeFailure> {
        (**self).write(dict, path)
    }
}

/// Backend for builds without a native facility. Always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNativeBackend;

impl NativeBackend for NoNativeBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn probe(&self) -> Availability {
        Availability::Unavailable(Unavailable::Unsupported)
    }

    fn write(&self, _dict: &Dictionary, _path: &Path) -> Result<(), NativeFailure> {
        Err(NativeFailure("no native backend".to_string()))
    }
}

/// The native backend used by [`crate::write_plist`] for this build.
#[cfg(all(target_os = "macos", feature = "native"))]
pub type DefaultBackend = CoreFoundationBackend;

/// The native backend used by [`crate::write_plist`] for this build.
#[cfg(not(all(target_os = "macos", feature = "native")))]
pub type DefaultBackend = NoNativeBackend;

/// Probe `backend` and, if it is available, write through it.
pub fn try_write_native<B: NativeBackend + ?Sized>(
    backend: &B,
    dict: &Dictionary,
    path: &Path,
) -> NativeWriteOutcome {
    let probed = panic::catch_unwind(AssertUnwindSafe(|| backend.probe()));
    match probed {
        Ok(Availability::Available) => {}
        Ok(Availability::Unavailable(reason)) => {
            log::trace!("native backend {} unavailable: {reason}", backend.name());
            return NativeWriteOutcome::Unavailable(reason);
        }
        Err(_) => {
            return NativeWriteOutcome::Failed(NativeFailure(format!(
                "native backend {} panicked while probing",
                backend.name()
            )));
        }
    }

    match panic::catch_unwind(AssertUnwindSafe(|| backend.write(dict, path))) {
        Ok(Ok(())) => NativeWriteOutcome::Succeeded,
        Ok(Err(failure)) => NativeWriteOutcome::Failed(failure),
        Err(_) => NativeWriteOutcome::Failed(NativeFailure(format!(
            "native backend {} panicked while writing",
            backend.name()
        ))),
    }
}
