use mongodb::bson::{Bson, Document};
use rocket::serde::json::Value;

/// Render a stored document as plain JSON.
///
/// Uses relaxed extended JSON, so strings, numbers, booleans, arrays and
/// nested objects written from JSON come back unchanged.
pub fn document_to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}
