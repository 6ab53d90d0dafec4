use std::collections::HashMap;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, Responder, post, web};
use serde::Deserialize;

use crate::error::ExecError;
use crate::handoff::HandoffClient;

/// Judged submission; accepts the field spellings existing clients send
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SubmitRequest {
    #[serde(alias = "problemId", alias = "ProblemID")]
    pub problem_id: String,
    #[serde(alias = "Language")]
    pub language: String,
    #[serde(alias = "Files")]
    pub files: HashMap<String, String>,
}

#[post("/api/submit")]
pub async fn post_submit_handler(
    client: web::Data<HandoffClient>,
    body: web::Json<SubmitRequest>,
) -> impl Responder {
    let request = body.into_inner();
    log::info!(
        "Submit request: problem={}, language={}, files={}",
        request.problem_id,
        request.language,
        request.files.len()
    );

    let client = client.into_inner();
    let outcome = web::block(move || {
        client.submit(&request.problem_id, &request.language, &request.files)
    })
    .await;

    match outcome {
        Ok(Ok(verdict)) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(verdict),
        Ok(Err(ExecError::ProblemNotFound(id))) => {
            log::info!("Problem {id} not found");
            HttpResponse::NotFound().body("problem not found")
        }
        Ok(Err(e)) => {
            log::error!("Executor error: {e}");
            HttpResponse::InternalServerError().body("Execution failed")
        }
        Err(e) => {
            log::error!("Blocking submit task failed: {e}");
            HttpResponse::InternalServerError().body("Execution failed")
        }
    }
}
