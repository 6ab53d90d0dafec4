use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{App, test, web};
use assert_json_diff::assert_json_eq;
use serde_json::{Value, json};

use ceesar::dispatcher::Dispatcher;
use ceesar::handoff::HandoffClient;
use ceesar::routes;

mod common;
use common::{CANNED_VERDICT, PROBLEM_ID, TestRoots, system_binary, toolchain_available};

// Shared state for one test app, rooted in `roots`
fn app_state(roots: &TestRoots) -> (web::Data<Dispatcher>, web::Data<HandoffClient>) {
    let config = roots.config();
    (
        web::Data::new(Dispatcher::from_config(&config)),
        web::Data::new(HandoffClient::from_config(&config)),
    )
}

#[actix_web::test]
async fn test_run_success() {
    if !toolchain_available(&["bash"]) {
        return;
    }
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/run")
        .set_json(json!({
            "language": "bash",
            "files": { "main.sh": "read name\necho \"Hello, $name\"\n" },
            "input": "judge\n"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "result": "Hello, judge\n", "error": "" }));
}

#[actix_web::test]
async fn test_run_client_errors() {
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let cases = [
        (
            json!({ "language": "python", "files": {} }),
            "No files provided",
        ),
        (json!({ "language": "python" }), "No files provided"),
        (
            json!({ "language": "cobol", "files": { "main.cob": "" } }),
            "unsupported language: cobol",
        ),
    ];

    for (payload, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/run")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");

        let body: Value = test::read_body_json(resp).await;
        assert_json_eq!(body, json!({ "result": "", "error": expected }));
    }
}

#[actix_web::test]
async fn test_run_malformed_body() {
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/run")
        .insert_header(ContentType::json())
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"], "");
    assert!(
        body["error"].as_str().unwrap().starts_with("Bad request"),
        "{body}"
    );
}

#[actix_web::test]
async fn test_run_server_side_failure() {
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/run")
        .set_json(json!({
            "language": "python",
            "files": { "README.md": "print(1)" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "result": "", "error": "Python file not found" }));
}

#[actix_web::test]
async fn test_run_failure_with_output() {
    if !toolchain_available(&["bash"]) {
        return;
    }
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/run")
        .set_json(json!({
            "language": "sh",
            "files": { "script.sh": "echo oops >&2\nexit 2\n" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "result": "", "error": "oops\nexit status 2" }));
}

#[actix_web::test]
async fn test_submit_forwards_verdict() {
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/submit")
        .set_json(json!({
            "problem_id": PROBLEM_ID,
            "language": "python",
            "files": { "main.py": "print(input())" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );

    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), CANNED_VERDICT.as_bytes());
}

#[actix_web::test]
async fn test_submit_accepts_capitalized_fields() {
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/submit")
        .set_json(json!({
            "ProblemID": PROBLEM_ID,
            "Language": "go",
            "Files": { "main.go": "package main" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["verdict"], "Accepted");
}

#[actix_web::test]
async fn test_submit_unknown_problem() {
    let roots = TestRoots::new();
    let (dispatcher, handoff) = app_state(&roots);
    let app = test::init_service(
        App::new()
            .app_data(dispatcher)
            .app_data(handoff)
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/submit")
        .set_json(json!({
            "problemId": "no-such-problem",
            "language": "python",
            "files": { "main.py": "" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"problem not found");
}

#[actix_web::test]
async fn test_submit_backend_failure_is_opaque() {
    let Some(failing) = system_binary("false") else {
        eprintln!("Skipping: no false utility");
        return;
    };
    let roots = TestRoots::new();
    let mut config = roots.config();
    config.executor.candidates = vec![failing];
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(Dispatcher::from_config(&config)))
            .app_data(web::Data::new(HandoffClient::from_config(&config)))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/submit")
        .set_json(json!({
            "problem_id": PROBLEM_ID,
            "language": "python",
            "files": { "main.py": "" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"Execution failed");
}
