//! Payload normalizer: maps heterogeneous inbound webhook shapes to one
//! canonical [`ContactIntent`].
//!
//! Every extraction walks the source's ordered fallback chain of dot paths;
//! the first candidate resolving to a non-empty string wins. Email is the
//! only required field and is accepted without syntax validation.

use serde_json::Value;

use crate::models::ContactIntent;
use crate::source::SourceSystem;
use crate::{Error, Result};

#[tracing::instrument(level = "debug", skip(payload))]
pub fn normalize(source: SourceSystem, payload: &Value) -> Result<ContactIntent> {
    if !payload.is_object() {
        return Err(Error::InvalidPayload(
            "webhook body must be a json object".to_string(),
        ));
    }

    let email =
        first_text(payload, source.email_paths()).ok_or(Error::MissingIdentity)?;

    let mut intent = ContactIntent::new(email)?;
    intent.source_record_id = first_scalar(payload, source.record_id_paths());
    intent.first_name = first_text(payload, source.first_name_paths());
    intent.last_name = first_text(payload, source.last_name_paths());
    intent.phone = first_text(payload, source.phone_paths());
    intent.company = first_text(payload, source.company_paths());

    // Senders that only deliver a combined name field: split on the first
    // space. A single token becomes the first name alone.
    if intent.first_name.is_none() && intent.last_name.is_none() {
        if let Some(full) = first_text(payload, source.full_name_paths()) {
            let (first, last) = split_full_name(&full);
            intent.first_name = Some(first);
            intent.last_name = last;
        }
    }

    Ok(intent)
}

/// First path whose value is a non-empty string (post-trim).
fn first_text(payload: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        lookup(payload, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Like [`first_text`], but also accepts numeric values (foreign ids arrive
/// as either).
fn first_scalar(payload: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        let v = lookup(payload, path)?;
        match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

/// Resolve a dot-delimited path (`contact.email`) inside a JSON object.
fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// `"Jane Mary Doe"` -> ("Jane", Some("Mary Doe")); `"Solo"` -> ("Solo", None).
fn split_full_name(full: &str) -> (String, Option<String>) {
    let full = full.trim();
    match full.split_once(' ') {
        Some((first, rest)) => {
            let rest = rest.trim();
            let last = if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
            (first.to_string(), last)
        }
        None => (full.to_string(), None),
    }
}
