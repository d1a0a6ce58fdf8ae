//! Program interface description
//!
//! Maps method and event names to their binary encodings. Call input is a
//! 4-byte method selector followed by the bincode-encoded argument tuple;
//! selectors are derived from the method name so the mapping is stable across
//! processes.

use crate::errors::LangError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Derive the 4-byte selector for a method name
pub fn selector(name: &str) -> [u8; 4] {
    let digest = Sha256::digest(name.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// One callable method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub selector: [u8; 4],
    /// Whether the method mutates program state
    pub mutates: bool,
}

/// One emitted event kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    /// Wire tag the node attaches to raw events
    pub tag: u8,
    pub name: String,
}

/// Interface description of one program
#[derive(Debug, Clone, Default)]
pub struct Abi {
    methods: HashMap<String, MethodSpec>,
    events: Vec<EventSpec>,
}

impl Abi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, name: &str, mutates: bool) -> Self {
        self.methods.insert(
            name.to_string(),
            MethodSpec {
                name: name.to_string(),
                selector: selector(name),
                mutates,
            },
        );
        self
    }

    pub fn with_event(mut self, tag: u8, name: &str) -> Self {
        self.events.push(EventSpec {
            tag,
            name: name.to_string(),
        });
        self
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    /// Resolve a raw event tag to its schema name
    pub fn event_name(&self, tag: u8) -> Option<&str> {
        self.events
            .iter()
            .find(|spec| spec.tag == tag)
            .map(|spec| spec.name.as_str())
    }

    pub fn events(&self) -> &[EventSpec] {
        &self.events
    }

    /// Encode a call: selector followed by the argument tuple.
    ///
    /// Fails with a codec-layer [`LangError`] before any network round trip
    /// when the method is unknown or the arguments do not serialize.
    pub fn encode_call<A: Serialize>(&self, method: &str, args: &A) -> Result<Vec<u8>, LangError> {
        let spec = self
            .method(method)
            .ok_or_else(|| LangError::Codec(format!("unknown method `{method}`")))?;
        let mut input = spec.selector.to_vec();
        let encoded = bincode::serialize(args)
            .map_err(|e| LangError::Codec(format!("arguments for `{method}`: {e}")))?;
        input.extend_from_slice(&encoded);
        Ok(input)
    }
}
