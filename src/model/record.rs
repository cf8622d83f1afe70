use mongodb::bson::{to_document, Document};
use rocket::serde::json::{serde_json::Map, Json, Value};

use crate::error::{Error, Result};

/// A JSON object as submitted by a client, on its way into the database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Accept a creation request body.
    ///
    /// An absent, unparseable, or blank body (`null`, `{}`, `[]`, `""`,
    /// `false`, `0`) is rejected. Any other non-object body is accepted as a
    /// record with no fields, so it fails the required field check instead.
    pub fn from_body(body: Option<Json<Value>>) -> Result<Self> {
        match body {
            Some(Json(value)) if !is_blank(&value) => match value {
                Value::Object(fields) => Ok(Self(fields)),
                _ => Ok(Self::default()),
            },
            _ => Err(Error::bad_request("No data provided")),
        }
    }

    /// Check that every field in `fields` is present, reporting the first
    /// one that isn't.
    pub fn require(&self, fields: &[&str]) -> Result<()> {
        match fields.iter().find(|field| !self.0.contains_key(**field)) {
            Some(missing) => Err(Error::bad_request(format!(
                "Missing required field: {missing}"
            ))),
            None => Ok(()),
        }
    }

    /// Convert to BSON for storage.
    pub fn to_document(&self) -> Result<Document> {
        Ok(to_document(&self.0)?)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
