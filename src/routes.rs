mod run;
mod submit;

pub use run::post_run_handler;
pub use submit::{SubmitRequest, post_submit_handler};

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};

use crate::dispatcher::ExecutionResult;

/// Malformed bodies get the same `{result, error}` shape as every run response
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::info!("JSON decode error: {err}");
    let response = HttpResponse::BadRequest().json(ExecutionResult {
        stdout: String::new(),
        error: format!("Bad request: {err}"),
    });
    InternalError::from_response(err, response).into()
}

/// Registers every endpoint; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(post_run_handler)
        .service(post_submit_handler);
}
