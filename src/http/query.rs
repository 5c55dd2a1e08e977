//! Query string resolution.
//!
//! The raw query string is the base. Single-valued parameters replace any
//! prior values for their key, then multi-valued parameters replace the whole
//! list for their key. Multi-valued entries therefore win over single-valued
//! ones sharing a key.

use std::collections::{BTreeMap, HashMap};

use url::form_urlencoded;

/// Merge `single` and `multi` over `raw`, returning the encoded query string.
///
/// When neither map has entries the raw string is returned untouched, so
/// its original encoding and parameter order survive.
pub fn resolve_query(
    raw: &str,
    single: &HashMap<String, String>,
    multi: &HashMap<String, Vec<String>>,
) -> String {
    if single.is_empty() && multi.is_empty() {
        return raw.to_string();
    }

    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        values
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    for (key, value) in single {
        values.insert(key.clone(), vec![value.clone()]);
    }

    for (key, list) in multi {
        values.insert(key.clone(), list.clone());
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, list) in &values {
        for value in list {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}
