use rocket::{
    serde::json::{serde_json::Map, Json, Value},
    Route,
};

use crate::{
    api::common,
    error::Result,
    logging::RequestId,
    model::{
        api::Message,
        db::voter::{Voter, YEAR_GROUP},
        mongodb::{upsert_merge, Coll},
        record::Record,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        register_voter,
        deregister_voters,
        update_voter,
        retrieve_voters
    ]
}

#[post("/voters", data = "<voter>")]
async fn register_voter(voter: Option<Json<Value>>, voters: Coll<Voter>) -> Result<Json<Message>> {
    common::create(&voters, voter).await?;
    Ok(Message::json("Voter registered successfully"))
}

/// De-register every voter in `year_group`. Without the parameter this is a
/// 400 rather than a match on voters lacking the field.
#[delete("/voters?<year_group>")]
async fn deregister_voters(
    id: RequestId,
    year_group: Option<String>,
    voters: Coll<Voter>,
) -> Result<Json<Message>> {
    let year_group = common::required_param(YEAR_GROUP, year_group)?;
    common::delete_all_matching(
        id,
        &voters,
        YEAR_GROUP,
        &year_group,
        "No voters found for the given year group.",
    )
    .await?;
    Ok(Message::json("Voters de-registered successfully."))
}

/// Merge the body into the voter stored under `student_id`, creating it if
/// needed, and echo the body back. Field names are stored as given, dots
/// included.
#[put("/voters/<student_id>", data = "<record>")]
async fn update_voter(
    student_id: String,
    record: Json<Map<String, Value>>,
    voters: Coll<Voter>,
) -> Result<Json<Map<String, Value>>> {
    let fields = Record::from(record.0.clone()).to_document()?;
    upsert_merge(&voters, &student_id, fields).await?;
    Ok(record)
}

/// List every voter in `year_group`. Without the parameter this is a 400.
#[get("/voters?<year_group>")]
async fn retrieve_voters(
    year_group: Option<String>,
    voters: Coll<Voter>,
) -> Result<Json<Vec<Value>>> {
    let year_group = common::required_param(YEAR_GROUP, year_group)?;
    common::list_matching(&voters, YEAR_GROUP, &year_group).await
}

#[cfg(test)]
mod tests {
    use mongodb::{
        bson::{doc, Document},
        Database,
    };
    use rocket::{
        http::Status,
        local::asynchronous::Client,
        serde::json::{json, Value},
    };

    use super::*;
    use crate::api::common::testing::*;
    use crate::model::mongodb::DELETE_BATCH_SIZE;

    #[backend_test]
    async fn register_then_retrieve(client: Client, db: Database) {
        let response = post_json(&client, "/voters/", &Voter::example_json()).await;
        expect_message(response, "Voter registered successfully").await;

        // Exactly one document, holding exactly what was sent.
        let stored = all_documents::<Voter>(&db).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get_str("email").unwrap(), "a@x.com");

        let listed = expect_json(get(&client, "/voters?year_group=2026").await).await;
        assert_eq!(listed, json!([Voter::example_json()]));
    }

    #[backend_test]
    async fn register_rejects_bad_bodies(client: Client, db: Database) {
        let response = post_raw(&client, "/voters/", "").await;
        expect_error(response, Status::BadRequest, "No data provided").await;

        let response = post_raw(&client, "/voters/", "not json").await;
        expect_error(response, Status::BadRequest, "No data provided").await;

        let response = post_json(&client, "/voters/", &json!({})).await;
        expect_error(response, Status::BadRequest, "No data provided").await;

        // The first missing field in declared order is named.
        let response = post_json(&client, "/voters/", &json!({ "name": "A", "major": "CS" })).await;
        expect_error(response, Status::BadRequest, "Missing required field: email").await;

        let mut body = Voter::example_json();
        body.as_object_mut().unwrap().remove("major");
        let response = post_json(&client, "/voters/", &body).await;
        expect_error(response, Status::BadRequest, "Missing required field: major").await;

        assert!(all_documents::<Voter>(&db).await.is_empty());
    }

    #[backend_test]
    async fn duplicate_registrations_are_kept(client: Client, db: Database) {
        for _ in 0..2 {
            let response = post_json(&client, "/voters/", &Voter::example_json()).await;
            expect_message(response, "Voter registered successfully").await;
        }
        assert_eq!(all_documents::<Voter>(&db).await.len(), 2);
    }

    #[backend_test]
    async fn retrieve_filters_by_year_group(client: Client) {
        for voter in [
            Voter::example_json(),
            Voter::example2_json(),
            Voter::example3_json(),
        ] {
            post_json(&client, "/voters/", &voter).await;
        }

        let listed = expect_json(get(&client, "/voters?year_group=2026").await).await;
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&Voter::example_json()));
        assert!(listed.contains(&Voter::example2_json()));

        let listed = expect_json(get(&client, "/voters?year_group=2027").await).await;
        assert_eq!(listed, json!([Voter::example3_json()]));

        // Matching is exact and on strings.
        let response = get(&client, "/voters?year_group=2025").await;
        expect_error(response, Status::NotFound, "data not found").await;
        let response = get(&client, "/voters?year_group=202").await;
        expect_error(response, Status::NotFound, "data not found").await;

        let response = get(&client, "/voters").await;
        expect_error(
            response,
            Status::BadRequest,
            "Missing required query parameter: year_group",
        )
        .await;
    }

    #[backend_test]
    async fn deregister_removes_all_matches(client: Client, db: Database) {
        for voter in [
            Voter::example_json(),
            Voter::example2_json(),
            Voter::example3_json(),
        ] {
            post_json(&client, "/voters/", &voter).await;
        }

        let response = delete(&client, "/voters?year_group=2026").await;
        expect_message(response, "Voters de-registered successfully.").await;

        let remaining = all_documents::<Voter>(&db).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].get_str("year_group").unwrap(), "2027");

        // Nothing left to match, and nothing else is touched.
        let response = delete(&client, "/voters?year_group=2026").await;
        expect_error(
            response,
            Status::NotFound,
            "No voters found for the given year group.",
        )
        .await;
        assert_eq!(all_documents::<Voter>(&db).await, remaining);

        let response = delete(&client, "/voters").await;
        expect_error(
            response,
            Status::BadRequest,
            "Missing required query parameter: year_group",
        )
        .await;
        assert_eq!(all_documents::<Voter>(&db).await, remaining);
    }

    #[backend_test]
    async fn update_merges_fields(client: Client, db: Database, voters: Coll<Voter>) {
        let stored = doc! {
            "_id": "10452",
            "name": "Kofi Mensah",
            "email": "kofi.mensah@example.edu",
            "student_id": "10452",
            "year_group": "2026",
            "major": "Economics",
        };
        voters
            .insert_one(Voter::from(stored.clone()), None)
            .await
            .unwrap();

        let update = json!({ "major": "CS" });
        let echoed = expect_json(put_json(&client, "/voters/10452", &update).await).await;
        assert_eq!(echoed, update);

        let mut expected = stored;
        expected.insert("major", "CS");
        assert_eq!(find_by_key(&db, "10452").await, Some(expected));
        assert_eq!(all_documents::<Voter>(&db).await.len(), 1);
    }

    #[backend_test]
    async fn update_creates_missing_voters(client: Client, db: Database) {
        let update = json!({ "name": "Ama Owusu", "year_group": "2027" });
        let echoed = expect_json(put_json(&client, "/voters/11873", &update).await).await;
        assert_eq!(echoed, update);
        assert_eq!(
            find_by_key(&db, "11873").await,
            Some(doc! { "_id": "11873", "name": "Ama Owusu", "year_group": "2027" })
        );

        // The created voter shows up in listings, without its key.
        let listed = expect_json(get(&client, "/voters?year_group=2027").await).await;
        assert_eq!(listed, json!([update]));

        // An empty merge leaves the voter as it was.
        let echoed = expect_json(put_json(&client, "/voters/11873", &json!({})).await).await;
        assert_eq!(echoed, json!({}));
        assert_eq!(
            find_by_key(&db, "11873").await,
            Some(doc! { "_id": "11873", "name": "Ama Owusu", "year_group": "2027" })
        );

        // An empty merge on an unknown key still creates it.
        expect_json(put_json(&client, "/voters/99999", &json!({})).await).await;
        assert_eq!(
            find_by_key(&db, "99999").await,
            Some(doc! { "_id": "99999" })
        );
    }

    #[backend_test]
    async fn update_cannot_move_the_key(client: Client, db: Database) {
        let update: Value = json!({ "_id": "elsewhere", "major": "Law" });
        let echoed = expect_json(put_json(&client, "/voters/10452", &update).await).await;
        assert_eq!(echoed, update);
        assert_eq!(
            find_by_key(&db, "10452").await,
            Some(doc! { "_id": "10452", "major": "Law" })
        );
        assert_eq!(find_by_key(&db, "elsewhere").await, None);
    }

    #[backend_test]
    async fn update_keeps_dotted_fields_literal(client: Client, db: Database, voters: Coll<Voter>) {
        let stored = doc! {
            "_id": "10452",
            "name": "Kofi Mensah",
            "year_group": "2026",
            "contact": "none",
        };
        voters
            .insert_one(Voter::from(stored.clone()), None)
            .await
            .unwrap();

        // `contact` holds a string, so a path update would fail outright.
        let update = json!({ "contact.phone": "0241234567", "note": "$name" });
        let echoed = expect_json(put_json(&client, "/voters/10452", &update).await).await;
        assert_eq!(echoed, update);

        let mut expected = stored;
        expected.insert("contact.phone", "0241234567");
        expected.insert("note", "$name");
        assert_eq!(find_by_key(&db, "10452").await, Some(expected));

        let listed = expect_json(get(&client, "/voters?year_group=2026").await).await;
        assert_eq!(
            listed,
            json!([{
                "name": "Kofi Mensah",
                "year_group": "2026",
                "contact": "none",
                "contact.phone": "0241234567",
                "note": "$name",
            }])
        );
    }

    #[backend_test]
    async fn deregister_spans_delete_batches(client: Client, db: Database, voters: Coll<Voter>) {
        let cohort = (0..DELETE_BATCH_SIZE * 2 + 5)
            .map(|n| Voter::from(doc! { "student_id": n.to_string(), "year_group": "2026" }));
        voters.insert_many(cohort, None).await.unwrap();
        voters
            .insert_one(Voter::from(doc! { "student_id": "x", "year_group": "2027" }), None)
            .await
            .unwrap();

        let response = delete(&client, "/voters?year_group=2026").await;
        expect_message(response, "Voters de-registered successfully.").await;

        let remaining = all_documents::<Voter>(&db).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].get_str("year_group").unwrap(), "2027");
    }

    async fn find_by_key(db: &Database, key: &str) -> Option<Document> {
        Coll::<Voter>::from_db(db)
            .clone_with_type::<Document>()
            .find_one(doc! { "_id": key }, None)
            .await
            .unwrap()
    }
}
