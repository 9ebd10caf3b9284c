//! CoreFoundation backend, resolved at runtime with dlopen2.
//!
//! Nothing is linked at build time: the framework is opened on every probe and
//! write, and any missing symbol makes the backend unavailable instead of
//! failing to start the process.

use std::ffi::c_void;
use std::path::Path;
use std::ptr;

use dlopen2::raw::Library;

use super::{Availability, NativeBackend, NativeFailure, Unavailable};
use crate::atomic::write_atomic;
use crate::value::{Dictionary, PlistValue};

type CFTypeRef = *const c_void;
type CFIndex = isize;

const CORE_FOUNDATION: &str = "/System/Library/Frameworks/CoreFoundation.framework/CoreFoundation";
const K_CF_STRING_ENCODING_UTF8: u32 = 0x0800_0100;
const K_CF_PROPERTY_LIST_XML_FORMAT_V1_0: CFIndex = 100;

/// Writes plists through `CFPropertyListCreateData`.
///
/// `CFDictionary` does not keep insertion order, so key order in the written
/// file is CoreFoundation's, not the caller's. Contents read back equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreFoundationBackend;

impl NativeBackend for CoreFoundationBackend {
    fn name(&self) -> &'static str {
        "CoreFoundation"
    }

    fn probe(&self) -> Availability {
        match Api::load() {
            Ok(_) => Availability::Available,
            Err(reason) => Availability::Unavailable(reason),
        }
    }

    fn write(&self, dict: &Dictionary, path: &Path) -> Result<(), NativeFailure> {
        let api = Api::load().map_err(|reason| NativeFailure(reason.to_string()))?;
        let root = api.dictionary(dict)?;

        let mut error: CFTypeRef = ptr::null();
        // SAFETY: `root` is a live CFDictionary; `error` is a valid out-pointer.
        let data = unsafe {
            (api.property_list_create_data)(
                ptr::null(),
                root.0,
                K_CF_PROPERTY_LIST_XML_FORMAT_V1_0,
                0,
                &mut error,
            )
        };
        if data.is_null() {
            if !error.is_null() {
                drop(Owned(error, &api));
            }
            return Err(NativeFailure(
                "CFPropertyListCreateData returned NULL".to_string(),
            ));
        }
        let data = Owned(data, &api);

        // SAFETY: `data` is a live CFData; the slice does not outlive it.
        let bytes = unsafe {
            let len = (api.data_get_length)(data.0);
            let start = (api.data_get_byte_ptr)(data.0);
            if start.is_null() || len < 0 {
                return Err(NativeFailure("CFData has no bytes".to_string()));
            }
            std::slice::from_raw_parts(start, len as usize)
        };

        write_atomic(path, bytes).map_err(|e| NativeFailure(format!("write failed: {e}")))
    }
}

/// Resolved CoreFoundation entry points. Keeps the library open while alive.
struct Api {
    string_create_with_bytes:
        unsafe extern "C" fn(CFTypeRef, *const u8, CFIndex, u32, u8) -> CFTypeRef,
    dictionary_create_mutable:
        unsafe extern "C" fn(CFTypeRef, CFIndex, *const c_void, *const c_void) -> CFTypeRef,
    dictionary_set_value: unsafe extern "C" fn(CFTypeRef, CFTypeRef, CFTypeRef),
    array_create_mutable: unsafe extern "C" fn(CFTypeRef, CFIndex, *const c_void) -> CFTypeRef,
    array_append_value: unsafe extern "C" fn(CFTypeRef, CFTypeRef),
    property_list_create_data:
        unsafe extern "C" fn(CFTypeRef, CFTypeRef, CFIndex, usize, *mut CFTypeRef) -> CFTypeRef,
    data_get_length: unsafe extern "C" fn(CFTypeRef) -> CFIndex,
    data_get_byte_ptr: unsafe extern "C" fn(CFTypeRef) -> *const u8,
    release: unsafe extern "C" fn(CFTypeRef),
    dictionary_key_callbacks: *const c_void,
    dictionary_value_callbacks: *const c_void,
    array_callbacks: *const c_void,
    _lib: Library,
}

/// A +1 reference released on drop.
struct Owned<'a>(CFTypeRef, &'a Api);

impl Drop for Owned<'_> {
    fn drop(&mut self) {
        // SAFETY: every `Owned` wraps a reference obtained from a Create call.
        unsafe { (self.1.release)(self.0) }
    }
}

impl Api {
    fn load() -> Result<Api, Unavailable> {
        let lib = Library::open(CORE_FOUNDATION)
            .map_err(|e| Unavailable::LibraryNotFound(format!("{CORE_FOUNDATION}: {e}")))?;

        macro_rules! symbol {
            ($name:literal) => {
                // SAFETY: the field types match the CoreFoundation declarations.
                unsafe { lib.symbol($name) }
                    .map_err(|_| Unavailable::MissingSymbol($name.to_string()))?
            };
        }

        Ok(Api {
            string_create_with_bytes: symbol!("CFStringCreateWithBytes"),
            dictionary_create_mutable: symbol!("CFDictionaryCreateMutable"),
            dictionary_set_value: symbol!("CFDictionarySetValue"),
            array_create_mutable: symbol!("CFArrayCreateMutable"),
            array_append_value: symbol!("CFArrayAppendValue"),
            property_list_create_data: symbol!("CFPropertyListCreateData"),
            data_get_length: symbol!("CFDataGetLength"),
            data_get_byte_ptr: symbol!("CFDataGetBytePtr"),
            release: symbol!("CFRelease"),
            dictionary_key_callbacks: symbol!("kCFTypeDictionaryKeyCallBacks"),
            dictionary_value_callbacks: symbol!("kCFTypeDictionaryValueCallBacks"),
            array_callbacks: symbol!("kCFTypeArrayCallBacks"),
            _lib: lib,
        })
    }

    fn value(&self, value: &PlistValue) -> Result<Owned<'_>, NativeFailure> {
        match value {
            PlistValue::String(s) => self.string(s),
            PlistValue::Dictionary(d) => self.dictionary(d),
            PlistValue::Array(items) => self.array(items),
        }
    }

    fn string(&self, s: &str) -> Result<Owned<'_>, NativeFailure> {
        // SAFETY: pointer/length describe a valid UTF-8 buffer.
        let cf = unsafe {
            (self.string_create_with_bytes)(
                ptr::null(),
                s.as_ptr(),
                s.len() as CFIndex,
                K_CF_STRING_ENCODING_UTF8,
                0,
            )
        };
        self.own(cf, "CFStringCreateWithBytes")
    }

    fn dictionary(&self, dict: &Dictionary) -> Result<Owned<'_>, NativeFailure> {
        // SAFETY: the callback symbols are the CFType callback structs.
        let cf = unsafe {
            (self.dictionary_create_mutable)(
                ptr::null(),
                0,
                self.dictionary_key_callbacks,
                self.dictionary_value_callbacks,
            )
        };
        let cf = self.own(cf, "CFDictionaryCreateMutable")?;
        for (key, value) in dict {
            let key = self.string(key)?;
            let value = self.value(value)?;
            // SAFETY: all three are live; the dictionary retains key and value.
            unsafe { (self.dictionary_set_value)(cf.0, key.0, value.0) };
        }
        Ok(cf)
    }

    fn array(&self, items: &[PlistValue]) -> Result<Owned<'_>, NativeFailure> {
        // SAFETY: the callback symbol is the CFType array callback struct.
        let cf = unsafe { (self.array_create_mutable)(ptr::null(), 0, self.array_callbacks) };
        let cf = self.own(cf, "CFArrayCreateMutable")?;
        for item in items {
            let item = self.value(item)?;
            // SAFETY: both are live; the array retains the item.
            unsafe { (self.array_append_value)(cf.0, item.0) };
        }
        Ok(cf)
    }

    fn own(&self, cf: CFTypeRef, what: &str) -> Result<Owned<'_>, NativeFailure> {
        if cf.is_null() {
            return Err(NativeFailure(format!("{what} returned NULL")));
        }
        Ok(Owned(cf, self))
    }
}
