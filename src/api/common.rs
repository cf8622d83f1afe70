use log::{info, warn};
use rocket::serde::json::{Json, Value};

use crate::{
    error::{Error, Result},
    logging::RequestId,
    model::{
        db::Entity,
        mongodb::{delete_matching, find_matching, Coll},
    },
};

/// Reported when a listing matches nothing.
pub const DATA_NOT_FOUND: &str = "data not found";

/// Unwrap a query parameter the route cannot do without.
pub fn required_param(name: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| Error::bad_request(format!("Missing required query parameter: {name}")))
}

/// Validate a creation body and insert it as a new document.
pub async fn create<T: Entity>(coll: &Coll<T>, body: Option<Json<Value>>) -> Result<()> {
    let entity = T::from_body(body)?;
    coll.insert_one(entity, None).await?;
    Ok(())
}

/// Every entity whose `field` equals `value`, as plain JSON objects.
pub async fn list_matching<T: Entity>(
    coll: &Coll<T>,
    field: &str,
    value: &str,
) -> Result<Json<Vec<Value>>> {
    let found = find_matching(coll, field, value).await?;
    if found.is_empty() {
        return Err(Error::not_found(DATA_NOT_FOUND));
    }
    Ok(Json(found.into_iter().map(Entity::into_json).collect()))
}

/// Delete every entity whose `field` equals `value`, failing with
/// `not_found` if there are none.
///
/// Success is reported even if fewer documents were removed than matched.
pub async fn delete_all_matching<T: Entity>(
    id: RequestId,
    coll: &Coll<T>,
    field: &str,
    value: &str,
    not_found: &str,
) -> Result<()> {
    let outcome = delete_matching(coll, field, value).await?;
    if outcome.matched == 0 {
        return Err(Error::not_found(not_found));
    }
    if outcome.deleted < outcome.matched {
        warn!(
            "req{id} matched {} {} with {field} = {value:?} but only {} were deleted",
            outcome.matched,
            coll.name(),
            outcome.deleted,
        );
    } else {
        info!("req{id} deleted {} {}", outcome.deleted, coll.name());
    }
    Ok(())
}
