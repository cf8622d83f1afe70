//! The handful of store operations the API is built from: equality lookups,
//! bulk deletion of what such a lookup matched, and keyed merge updates.

use mongodb::{
    bson::{doc, Bson, Document},
    error::Error as DbError,
    options::{FindOptions, UpdateOptions},
};
use rocket::futures::TryStreamExt;
use serde::de::DeserializeOwned;

use super::{Coll, MongoCollection};

/// Most IDs sent in one `$in` delete, keeping the command far below BSON's
/// 16 MB document limit.
pub const DELETE_BATCH_SIZE: usize = 1000;

/// A filter matching documents whose top-level `field` equals `value` exactly.
pub fn equality_filter(field: &str, value: &str) -> Document {
    doc! { field: value }
}

/// All documents whose `field` equals `value`, without the store-assigned `_id`.
pub async fn find_matching<T>(coll: &Coll<T>, field: &str, value: &str) -> Result<Vec<T>, DbError>
where
    T: MongoCollection + DeserializeOwned + Unpin + Send + Sync,
{
    let options = FindOptions::builder().projection(doc! { "_id": 0 }).build();
    coll.find(equality_filter(field, value), options)
        .await?
        .try_collect()
        .await
}

/// The result of a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Documents the filter matched.
    pub matched: u64,
    /// Documents the store reports as removed. Can fall short of `matched`
    /// if a concurrent writer got there first.
    pub deleted: u64,
}

/// Delete every document whose `field` equals `value`.
///
/// The matching IDs are read first and then deleted in batches of
/// [`DELETE_BATCH_SIZE`], so exactly the documents that were observed are
/// targeted. Not atomic: documents inserted between the two steps survive.
/// Matching nothing deletes nothing.
pub async fn delete_matching<T>(
    coll: &Coll<T>,
    field: &str,
    value: &str,
) -> Result<DeleteOutcome, DbError>
where
    T: MongoCollection,
{
    let options = FindOptions::builder().projection(doc! { "_id": 1 }).build();
    let ids: Vec<Bson> = coll
        .clone_with_type::<Document>()
        .find(equality_filter(field, value), options)
        .await?
        .try_collect::<Vec<Document>>()
        .await?
        .into_iter()
        .filter_map(|mut matched| matched.remove("_id"))
        .collect();

    let matched = ids.len() as u64;
    let mut deleted = 0;
    for batch in ids.chunks(DELETE_BATCH_SIZE) {
        let result = coll
            .delete_many(doc! { "_id": { "$in": batch.to_vec() } }, None)
            .await?;
        deleted += result.deleted_count;
    }
    Ok(DeleteOutcome { matched, deleted })
}

/// Merge `fields` into the document stored under `key`, creating it if it
/// doesn't exist. Supplied top-level fields overwrite, all others are kept.
///
/// Field names are taken literally: `"contact.phone"` is one field, not a
/// path into `contact`, and values are never read as expressions. Needs
/// MongoDB 5.0 or later. An `_id` among the fields is ignored; the key
/// always wins.
pub async fn upsert_merge<T>(coll: &Coll<T>, key: &str, mut fields: Document) -> Result<(), DbError>
where
    T: MongoCollection,
{
    fields.remove("_id");
    let options = UpdateOptions::builder().upsert(true).build();
    coll.update_one(doc! { "_id": key }, literal_merge(fields), options)
        .await?;
    Ok(())
}

/// An update pipeline overlaying `fields` onto the current document.
fn literal_merge(fields: Document) -> Vec<Document> {
    vec![doc! {
        "$replaceWith": {
            "$mergeObjects": ["$$ROOT", { "$literal": fields }]
        }
    }]
}
