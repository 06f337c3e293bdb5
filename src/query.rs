//! Query-parameter encoding of entity fields.
//!
//! Entities describe their encodable fields through [`QueryFields`] in a
//! fixed order; [`encode`] turns that description into `&k1=v1&k2=v2`.

use crate::time::format_timestamp;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use url::form_urlencoded::byte_serialize;

/// A field value tagged with its semantic type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Option<Cow<'a, str>>),
    List(&'a [String]),
    Flag(Option<bool>),
    Timestamp(Option<&'a DateTime<Utc>>),
    /// Values with no query representation, always omitted
    Opaque,
}

impl<'a> FieldValue<'a> {
    /// Borrowed text value
    pub fn text(value: Option<&'a str>) -> Self {
        FieldValue::Text(value.map(Cow::Borrowed))
    }

    /// Render the value, or `None` when it should not be sent
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Text(Some(s)) if !s.is_empty() => Some(s.to_string()),
            FieldValue::List(items) if !items.is_empty() => Some(items.join(",")),
            FieldValue::Flag(Some(b)) => Some(b.to_string()),
            FieldValue::Timestamp(Some(t)) => Some(format_timestamp(t)),
            _ => None,
        }
    }
}

/// Ordered description of an entity's encodable fields.
pub trait QueryFields {
    fn query_fields(&self) -> Vec<(&'static str, FieldValue<'_>)>;
}

/// Lower-case the first character, leaving the rest untouched
pub fn first_letter_lowercase(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Encode the populated, non-excluded fields as `&key=value` pairs.
///
/// Values are form-urlencoded so that `&`, `#`, `+` and `=` stay inside
/// their own pair. Exclusions are matched against the query key. Returns an
/// empty string when no field qualifies.
pub fn encode<E: QueryFields + ?Sized>(entity: &E, excluded: &[&str]) -> String {
    entity
        .query_fields()
        .into_iter()
        .filter_map(|(name, value)| {
            let key = first_letter_lowercase(name);
            if excluded.contains(&key.as_str()) {
                return None;
            }
            value.render().map(|v| {
                let escaped: String = byte_serialize(v.as_bytes()).collect();
                format!("&{key}={escaped}")
            })
        })
        .collect()
}
