use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, post, web};

use crate::dispatcher::{Dispatcher, ExecutionRequest, ExecutionResult};

#[post("/api/run")]
pub async fn post_run_handler(
    dispatcher: web::Data<Dispatcher>,
    body: web::Json<ExecutionRequest>,
) -> impl Responder {
    let request = body.into_inner();
    log::info!(
        "runCode request: language={}, files={}",
        request.language,
        request.files.len()
    );

    let dispatcher = dispatcher.into_inner();
    let outcome = web::block(move || dispatcher.try_run(&request)).await;

    match outcome {
        Ok(Ok(stdout)) => HttpResponse::Ok().json(ExecutionResult::success(stdout)),
        Ok(Err(failure)) => {
            let status = if failure.error.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            HttpResponse::build(status).json(failure.into_result())
        }
        Err(e) => {
            log::error!("Blocking run task failed: {e}");
            HttpResponse::InternalServerError().json(ExecutionResult {
                stdout: String::new(),
                error: "Internal server error".to_string(),
            })
        }
    }
}
