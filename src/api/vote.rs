use rocket::{
    serde::json::{Json, Value},
    Route,
};

use crate::{
    api::common,
    error::Result,
    model::{api::Message, db::vote_record::VoteRecord, mongodb::Coll},
};

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

#[post("/voteapp", data = "<vote>")]
async fn cast_vote(vote: Option<Json<Value>>, votes: Coll<VoteRecord>) -> Result<Json<Message>> {
    common::create(&votes, vote).await?;
    Ok(Message::json("VoteApp registered successfully"))
}
