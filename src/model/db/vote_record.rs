use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use super::Entity;

pub const ELECTION_ID: &str = "election_id";

/// A cast vote. Nothing checks that the election, voter or candidate exist,
/// or that the student hasn't voted already.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteRecord(Document);

impl From<Document> for VoteRecord {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

impl Entity for VoteRecord {
    const REQUIRED_FIELDS: &'static [&'static str] = &["election_id", "student_id", "candidate_id"];

    fn into_document(self) -> Document {
        self.0
    }
}
