//! DB-compatible types.
//!
//! None of the collections have a schema: an entity is whatever document the
//! client sent, provided it carried the entity's required fields when it was
//! created.

use mongodb::bson::Document;
use rocket::serde::json::{Json, Value};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::model::{
    mongodb::{document_to_json, MongoCollection},
    record::Record,
};

pub mod election;
pub mod vote_record;
pub mod voter;

/// A document stored in its own collection.
pub trait Entity:
    MongoCollection + Serialize + DeserializeOwned + From<Document> + Unpin + Send + Sync
{
    /// Fields a new entity must carry, in the order they are checked.
    const REQUIRED_FIELDS: &'static [&'static str];

    fn into_document(self) -> Document;

    /// Validate a creation request body and convert it for storage.
    fn from_body(body: Option<Json<Value>>) -> Result<Self> {
        let record = Record::from_body(body)?;
        record.require(Self::REQUIRED_FIELDS)?;
        Ok(Self::from(record.to_document()?))
    }

    fn into_json(self) -> Value {
        document_to_json(self.into_document())
    }
}
