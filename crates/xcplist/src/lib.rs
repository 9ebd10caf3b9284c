//! # xcplist
//!
//! Property-list reader and writer whose XML output is byte-for-byte what Xcode
//! writes, so project files can be rewritten without spurious diffs.
//!
//! The value model is deliberately small: strings, ordered dictionaries and
//! arrays. Booleans, numbers and other scalars are coerced to strings on write,
//! and rejected on read.
//!
//! ## Quick start
//!
//! ```rust
//! use xcplist::{read_plist, write_plist, PlistValue};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("Info.plist");
//!
//! let value = serde_json::json!({ "archiveVersion": "1.0", "objects": {} });
//! write_plist(&value, &path).unwrap();
//!
//! let dict = read_plist(&path).unwrap();
//! assert_eq!(dict["archiveVersion"], PlistValue::from("1.0"));
//! ```
//!
//! ## Modules
//!
//! - [`coerce`]: caller data to the restricted value model
//! - [`encoder`]: dictionary to canonical XML plist bytes
//! - [`decoder`]: XML or ASCII plist bytes to a dictionary
//! - [`native`]: optional host plist facility with silent fallback
//! - [`dispatch`]: `read_plist`, `write_plist` and [`PlistWriter`]
//! - [`error`]: error types

pub mod atomic;
pub mod coerce;
pub mod decoder;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod native;
pub mod value;

pub use coerce::{
    coerce_path, coerce_root, coerce_value, from_serialize, Stringify, ToPlistDictionary,
    ToPlistKey, ToPlistPath, ToPlistValue,
};
pub use decoder::{decode, decode_str, sniff, Dialect};
pub use dispatch::{read_plist, write_plist, PlistWriter, Strategy};
pub use encoder::{check_encodable, encode, encode_to_string};
pub use error::{ErrorKind, XcplistError};
pub use native::{
    try_write_native, Availability, DefaultBackend, NativeBackend, NativeFailure, NativeWriteOutcome,
    NoNativeBackend, Unavailable,
};
pub use value::{Dictionary, PlistValue};
