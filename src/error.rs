use log::error;
use mongodb::{bson::ser::Error as BsonError, error::Error as DbError};
use rocket::{http::Status, response::Responder, serde::json::Json, Request};
use thiserror::Error;

use crate::{logging::RequestTrace, model::api::ErrorBody};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Unsupported value: {0}")]
    Bson(#[from] BsonError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl Error {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// The status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) => Status::InternalServerError,
            Self::Bson(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
        }
    }
}

/// Client errors become a JSON `{"error": ...}` body; database failures are
/// logged and answered with a bare 500.
impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match self {
            Self::Db(err) => {
                let id = RequestTrace::of(req).id;
                error!("req{id} database failure: {err}");
                Err(status)
            }
            other => (status, Json(ErrorBody::new(other.to_string()))).respond_to(req),
        }
    }
}
