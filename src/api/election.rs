use rocket::{
    serde::json::{Json, Value},
    Route,
};

use crate::{
    api::common,
    error::Result,
    logging::RequestId,
    model::{
        api::Message,
        db::election::{Election, ELECTION_ID},
        mongodb::Coll,
    },
};

pub fn routes() -> Vec<Route> {
    routes![create_election, retrieve_elections, delete_elections]
}

#[post("/elections", data = "<election>")]
async fn create_election(
    election: Option<Json<Value>>,
    elections: Coll<Election>,
) -> Result<Json<Message>> {
    common::create(&elections, election).await?;
    Ok(Message::json("Election registered successfully"))
}

/// List every election document carrying `election_id`. Without the
/// parameter this is a 400.
#[get("/elections?<election_id>")]
async fn retrieve_elections(
    election_id: Option<String>,
    elections: Coll<Election>,
) -> Result<Json<Vec<Value>>> {
    let election_id = common::required_param(ELECTION_ID, election_id)?;
    common::list_matching(&elections, ELECTION_ID, &election_id).await
}

/// Remove every election document carrying the given `election_id`. Without
/// the parameter this is a 400 and nothing is removed.
#[delete("/elections?<election_id>")]
async fn delete_elections(
    id: RequestId,
    election_id: Option<String>,
    elections: Coll<Election>,
) -> Result<Json<Message>> {
    let election_id = common::required_param(ELECTION_ID, election_id)?;
    common::delete_all_matching(
        id,
        &elections,
        ELECTION_ID,
        &election_id,
        "No elections found for election id.",
    )
    .await?;
    Ok(Message::json("Elections removed successfully."))
}
