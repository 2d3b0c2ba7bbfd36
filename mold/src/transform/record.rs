//! Input records.
//!
//! Anything that can look up a value by string key can be molded. Records
//! backed by JSON values hand out borrowed values; string maps wrap theirs in
//! `Value::String` on the fly.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A key/value record to be transformed.
pub trait Record {
    /// The raw value stored under `key`, if any.
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        (**self).lookup(key)
    }
}

impl Record for Map<String, Value> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

/// Only objects have keys; any other value behaves as an empty record.
impl Record for Value {
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.as_object().and_then(|obj| obj.get(key)).map(Cow::Borrowed)
    }
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

impl<S: BuildHasher> Record for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(|s| Cow::Owned(Value::String(s.clone())))
    }
}

impl Record for BTreeMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(Cow::Borrowed)
    }
}

impl Record for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.get(key).map(|s| Cow::Owned(Value::String(s.clone())))
    }
}
