#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::{config::DatabaseFairing, logging::LoggerFairing};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// Path prefix every API route is mounted under.
pub const API_BASE: &str = "/api/v1";

/// Assemble the server. The database connection is made when the returned
/// rocket is ignited.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount(API_BASE, api::routes())
        .attach(LoggerFairing)
        .attach(DatabaseFairing)
}

/// Assemble the server around an existing database connection, skipping
/// the database fairing.
#[cfg(test)]
pub(crate) async fn rocket_for_db(db_client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = db_client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("Failed to create test indexes");

    rocket::build()
        .mount(API_BASE, api::routes())
        .attach(LoggerFairing)
        .manage(db_client)
        .manage(db)
}

/// Connect to the database configured for the test profile.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .unwrap_or_else(|_| panic!("Could not connect to database with `db_uri` \"{db_uri}\""))
}

/// A fresh database name, so concurrent tests don't see each other's data.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}
