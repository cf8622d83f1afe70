use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use super::Entity;

/// Application-level election identifier, distinct from the document `_id`.
pub const ELECTION_ID: &str = "election_id";

/// An election, as stored in the database. Several documents may share an
/// `election_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Election(Document);

impl From<Document> for Election {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

impl Entity for Election {
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["election_id", "name", "session", "positions"];

    fn into_document(self) -> Document {
        self.0
    }
}
