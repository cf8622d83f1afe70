use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use super::Entity;

/// Field voters are listed and de-registered by.
pub const YEAR_GROUP: &str = "year_group";

/// A registered voter, as stored in the database.
///
/// Registration requires the fields in [`Voter::REQUIRED_FIELDS`]; updates
/// go through a key lookup and may add or change anything. The student ID is
/// not unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Voter(Document);

impl From<Document> for Voter {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

impl Entity for Voter {
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["name", "email", "student_id", "year_group", "major"];

    fn into_document(self) -> Document {
        self.0
    }
}
