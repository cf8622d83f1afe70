use std::ops::Deref;

use log::debug;
use mongodb::{bson::doc, error::Error as DbError, Collection, Database, IndexModel};
use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
};

use crate::model::db::{
    election::{Election, ELECTION_ID},
    vote_record::{VoteRecord, ELECTION_ID as VOTE_ELECTION_ID},
    voter::{Voter, YEAR_GROUP},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Wrap the managed [`Database`] in a collection handle.
    ///
    /// Fails with a 500 if no database is managed by the rocket.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.rocket().state::<Database>() {
            Some(db) => request::Outcome::Success(Coll::from_db(db)),
            None => request::Outcome::Failure((Status::InternalServerError, ())),
        }
    }
}

impl MongoCollection for Voter {
    const NAME: &'static str = "voters";
}

impl MongoCollection for Election {
    const NAME: &'static str = "elections";
}

impl MongoCollection for VoteRecord {
    const NAME: &'static str = "voteapp";
}

/// Ensure the indexes backing the equality lookups exist on the given
/// database. None of them are unique: duplicate voters, elections and votes
/// are all accepted.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let voter_index = IndexModel::builder()
        .keys(doc! { YEAR_GROUP: 1 })
        .build();
    Coll::<Voter>::from_db(db)
        .create_index(voter_index, None)
        .await?;

    let election_index = IndexModel::builder()
        .keys(doc! { ELECTION_ID: 1 })
        .build();
    Coll::<Election>::from_db(db)
        .create_index(election_index, None)
        .await?;

    let vote_index = IndexModel::builder()
        .keys(doc! { VOTE_ELECTION_ID: 1 })
        .build();
    Coll::<VoteRecord>::from_db(db)
        .create_index(vote_index, None)
        .await?;

    Ok(())
}
