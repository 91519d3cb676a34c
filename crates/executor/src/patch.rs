//! JSON decoding for records and partial updates.
//!
//! A partial update body is a JSON object. Each known key decodes to a
//! [`Field`]: a missing key is [`Field::Absent`], `null` is [`Field::Null`],
//! and a value of the right JSON type is [`Field::Value`]. The `id` key and
//! unknown keys are ignored. Whether a value is blank, and whether the merged
//! record is valid, is decided by the engine.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tripstore_core::{Field, LocationPatch, UserPatch, VisitPatch};

use crate::{Error, Result};

/// Decode a full record for a create.
pub fn decode_record<R: DeserializeOwned>(body: &str) -> Result<R> {
    Ok(serde_json::from_str(body)?)
}

/// Patch types that can be decoded from a JSON object.
pub trait DecodePatch: Sized {
    /// Build the patch from the object's fields.
    fn from_object(object: &Map<String, Value>) -> Result<Self>;
}

/// Decode a partial update body.
pub fn decode_patch<P: DecodePatch>(body: &str) -> Result<P> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(object) => P::from_object(&object),
        _ => Err(Error::invalid("update body must be a JSON object")),
    }
}

fn text(object: &Map<String, Value>, key: &str) -> Result<Field<String>> {
    match object.get(key) {
        None => Ok(Field::Absent),
        Some(Value::Null) => Ok(Field::Null),
        Some(Value::String(s)) => Ok(Field::Value(s.clone())),
        Some(_) => Err(Error::invalid(format!("{} must be a string", key))),
    }
}

fn integer(object: &Map<String, Value>, key: &str) -> Result<Field<i64>> {
    match object.get(key) {
        None => Ok(Field::Absent),
        Some(Value::Null) => Ok(Field::Null),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Field::Value)
            .ok_or_else(|| Error::invalid(format!("{} must be an integer", key))),
        Some(_) => Err(Error::invalid(format!("{} must be an integer", key))),
    }
}

impl DecodePatch for UserPatch {
    fn from_object(object: &Map<String, Value>) -> Result<Self> {
        Ok(UserPatch {
            first_name: text(object, "first_name")?,
            last_name: text(object, "last_name")?,
            birth_date: integer(object, "birth_date")?,
            gender: text(object, "gender")?,
            email: text(object, "email")?,
        })
    }
}

impl DecodePatch for LocationPatch {
    fn from_object(object: &Map<String, Value>) -> Result<Self> {
        Ok(LocationPatch {
            distance: integer(object, "distance")?,
            city: text(object, "city")?,
            place: text(object, "place")?,
            country: text(object, "country")?,
        })
    }
}

impl DecodePatch for VisitPatch {
    fn from_object(object: &Map<String, Value>) -> Result<Self> {
        Ok(VisitPatch {
            user: integer(object, "user")?,
            location: integer(object, "location")?,
            visited_at: integer(object, "visited_at")?,
            mark: integer(object, "mark")?,
        })
    }
}
