//! Response key normalization
//!
//! The DataGroomer server speaks snake_case JSON. Every response is passed
//! through [`camel_case_keys`] before it is decoded, so client-side schemas
//! only ever see camelCase keys (`next_blob_upload_url` → `nextBlobUploadUrl`).
//!
//! Conversion is idempotent: normalizing an already normalized value is a
//! no-op, which lets callers normalize defensively.

use serde_json::{Map, Value};

/// Recursively rewrite every object key from snake_case to camelCase
///
/// Arrays are walked element-wise and keep their order and length; the
/// array itself is never treated as a keyed container. Scalars pass through
/// unchanged. The input is not modified; a fresh value is returned.
///
/// When two keys of the same object normalize to the same camelCase key,
/// the one that comes later in object order wins.
pub fn camel_case_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(to_camel_case(key), camel_case_keys(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(camel_case_keys).collect()),
        other => other.clone(),
    }
}

/// Convert a single key to camelCase
///
/// Words are split at any non-alphanumeric character, at a lowercase or digit
/// followed by an uppercase letter, and before the last capital of an acronym
/// run (`HTTPServer` → `http` + `Server`). The first word is lowercased and
/// each following word is capitalized.
///
/// ```
/// use groomer_common::case::to_camel_case;
///
/// assert_eq!(to_camel_case("next_blob_upload_url"), "nextBlobUploadUrl");
/// assert_eq!(to_camel_case("dataFiles"), "dataFiles");
/// assert_eq!(to_camel_case("42"), "42");
/// ```
pub fn to_camel_case(key: &str) -> String {
    // Runs of single-letter words ("a_b_c" -> "aBC") read back as an acronym,
    // so repeat until the key is stable. Each pass can only drop capitals.
    let mut current = convert_once(key);
    for _ in 0..=current.len() {
        let next = convert_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn convert_once(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (index, word) in split_words(key).iter().enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if index == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            for c in chars {
                out.extend(c.to_lowercase());
            }
        }
    }
    out
}

fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_numeric()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
