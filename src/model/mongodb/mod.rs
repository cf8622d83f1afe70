mod bson;
mod collection;
mod queries;

pub use bson::document_to_json;
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use queries::{
    delete_matching, equality_filter, find_matching, upsert_merge, DeleteOutcome,
    DELETE_BATCH_SIZE,
};
