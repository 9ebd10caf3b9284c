//! Public read/write entry points.
//!
//! Writing coerces the input, tries the native backend and, when that reports
//! anything but success, encodes with the portable XML encoder and replaces the
//! target atomically. Coercion failures abort before the filesystem is touched.
//!
//! Reading resolves the path, distinguishes a missing file from a malformed one,
//! and decodes either text dialect.

use std::fs;
use std::io;
use std::path::Path;

use crate::atomic::write_atomic;
use crate::coerce::{coerce_path, coerce_root, ToPlistDictionary, ToPlistPath};
use crate::decoder::decode;
use crate::encoder::{check_encodable, encode};
use crate::error::{Result, XcplistError};
use crate::native::{
    try_write_native, DefaultBackend, NativeBackend, NativeWriteOutcome, NoNativeBackend,
};
use crate::value::Dictionary;

/// Which encoder produced a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Native,
    Pure,
}

/// Plist writer with a pluggable native backend.
///
/// [`write_plist`] uses `PlistWriter::default()`. Build one with
/// [`PlistWriter::with_backend`] to supply another backend, or
/// [`PlistWriter::pure`] to always use the portable encoder.
#[derive(Debug, Clone, Default)]
pub struct PlistWriter<B = DefaultBackend> {
    backend: B,
}

impl PlistWriter<NoNativeBackend> {
    /// A writer that never attempts a native write.
    pub fn pure() -> Self {
        PlistWriter {
            backend: NoNativeBackend,
        }
    }
}

impl<B: NativeBackend> PlistWriter<B> {
    pub fn with_backend(backend: B) -> Self {
        PlistWriter { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Coerce `value`, write it to `path`, and report which encoder was used.
    pub fn write<V, P>(&self, value: &V, path: &P) -> Result<Strategy>
    where
        V: ToPlistDictionary + ?Sized,
        P: ToPlistPath + ?Sized,
    {
        let path = coerce_path(path)?;
        let dict = coerce_root(value)?;
        self.write_dictionary(&dict, &path)
    }

    /// Write an already-coerced dictionary.
    ///
    /// Strings XML cannot carry are rejected before either encoder runs, so the
    /// target is left untouched.
    pub fn write_dictionary(&self, dict: &Dictionary, path: &Path) -> Result<Strategy> {
        check_encodable(dict)?;
        match try_write_native(&self.backend, dict, path) {
            NativeWriteOutcome::Succeeded => {
                log::debug!(
                    "wrote {} with native backend {}",
                    path.display(),
                    self.backend.name()
                );
                return Ok(Strategy::Native);
            }
            NativeWriteOutcome::Unavailable(reason) => {
                log::debug!("native backend unavailable ({reason}), using XML encoder");
            }
            NativeWriteOutcome::Failed(failure) => {
                log::debug!(
                    "native backend {} failed ({failure}), using XML encoder",
                    self.backend.name()
                );
            }
        }

        write_atomic(path, &encode(dict))?;
        log::debug!("wrote {} with XML encoder", path.display());
        Ok(Strategy::Pure)
    }
}

/// Coerce `value` into a dictionary and write it as a plist at `path`.
///
/// # Errors
///
/// - [`XcplistError::Type`] if `path` or `value` cannot be coerced; nothing is
///   written in that case
/// - [`XcplistError::Io`] if the destination cannot be written
pub fn write_plist<V, P>(value: &V, path: &P) -> Result<()>
where
    V: ToPlistDictionary + ?Sized,
    P: ToPlistPath + ?Sized,
{
    PlistWriter::<DefaultBackend>::default()
        .write(value, path)
        .map(|_| ())
}

/// Read the plist at `path` (XML or ASCII dialect).
///
/// # Errors
///
/// - [`XcplistError::Type`] if `path` cannot be coerced, or the document holds a
///   value type other than string, dict or array
/// - [`XcplistError::NotFound`] if `path` does not exist
/// - [`XcplistError::Unparsable`] if the file is not a well-formed plist
/// - [`XcplistError::Io`] for other read failures
pub fn read_plist<P: ToPlistPath + ?Sized>(path: &P) -> Result<Dictionary> {
    let path = coerce_path(path)?;
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(XcplistError::NotFound(path));
        }
        Err(e) => return Err(e.into()),
    };
    decode(&bytes).map_err(|e| e.with_path(&path))
}
