use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{response, Request, Response};

use super::service::ServiceError;

/// JSON error body returned by every route.
#[derive(Debug, serde::Serialize)]
pub struct Error {
    #[serde(skip)]
    status: Status,
    code: u16,
    message: String,
    solution: String,
}

impl Error {
    pub fn new(status: Status, message: String, solution: String) -> Self {
        Self { status, code: status.code, message, solution }
    }
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => Error::new(
                Status::NotFound,
                format!("No channel found with id {id}"),
                "Check that the channel id is the right one".to_string(),
            ),
            ServiceError::Store(err) => {
                log::error!("Storage failure: {err}");
                Error::new(
                    Status::InternalServerError,
                    "Unable to reach channel storage".to_string(),
                    "Retry later".to_string(),
                )
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body = serde_json::to_string(&self).unwrap_or("{}".to_string());
        Response::build()
            .sized_body(body.len(), Cursor::new(body))
            .header(ContentType::JSON)
            .status(self.status)
            .ok()
    }
}
