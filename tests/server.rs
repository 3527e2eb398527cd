use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use eqsolve::engine::{Binding, Domain, Equation, NativeEngine, SymbolicEngine};
use eqsolve::server::{AppState, router};
use eqsolve::{Expr, Result};
use num_complex::Complex64;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Parses normally, then panics as soon as it is asked to solve.
struct PanickingEngine;

impl SymbolicEngine for PanickingEngine {
    fn parse(&self, text: &str) -> Result<Expr> {
        NativeEngine::new().parse(text)
    }

    fn solve(&self, _: &Equation, _: &str, _: Domain) -> Result<Vec<Binding>> {
        panic!("solver blew up")
    }

    fn simplify(&self, expr: &Expr) -> Expr {
        expr.clone()
    }

    fn evalf(&self, _: &Expr) -> Option<Complex64> {
        None
    }
}

async fn send(state: AppState, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    router(state).oneshot(request).await.expect("infallible")
}

async fn get(uri: &str) -> Response {
    send(AppState::default(), Method::GET, uri).await
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn solves_equation_from_query() {
    let response = get("/solve?equation=2x%20%3D%208").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(json_body(response).await, json!({ "result": "x = \"4.0\"" }));
}

#[tokio::test]
async fn plus_in_query_decodes_as_space() {
    // An unescaped `+` in a query string decodes as a space.
    let response = get("/solve?equation=x%2B1%3D3").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "result": "x = \"2.0\"" }));
}

#[tokio::test]
async fn missing_or_blank_equation_is_a_bad_request() {
    for uri in ["/solve", "/solve?equation=", "/solve?equation=%20%20"] {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_cors(&response);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Missing 'equation' query parameter" })
        );
    }
}

#[tokio::test]
async fn input_errors_are_bad_requests() {
    let cases = [
        ("/solve?equation=%3D5", "Invalid equation format"),
        (
            "/solve?equation=2%20%3D%202",
            "No variable found in the equation. Please include a variable like 'x'.",
        ),
    ];
    for (uri, message) in cases {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json_body(response).await, json!({ "error": message }));
    }
}

#[tokio::test]
async fn unparsable_equation_names_the_context() {
    let response = get("/solve?equation=x%20*%3D%202").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let error = body["error"].as_str().expect("error string");
    assert!(error.starts_with("Could not parse equation: "), "{error}");
}

#[tokio::test]
async fn no_solution_is_still_a_success() {
    let response = get("/solve?equation=x%20%3D%20x%20%2B%201").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "result": "No solution found for x." })
    );
}

#[tokio::test]
async fn root_describes_the_api() {
    let response = get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Equation API. Try /solve?equation=1+1" })
    );
}

#[tokio::test]
async fn preflight_is_empty_with_cors_headers() {
    for uri in ["/", "/solve", "/anything/else"] {
        let response = send(AppState::default(), Method::OPTIONS, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_cors(&response);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let response = get("/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
    assert_eq!(json_body(response).await, json!({ "error": "Not Found" }));
}

#[tokio::test]
async fn solver_panic_is_an_internal_error() {
    let state = AppState::new(Arc::new(PanickingEngine));
    let response = send(state, Method::GET, "/solve?equation=x%20%3D%201").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    let body = json_body(response).await;
    let error = body["error"].as_str().expect("error string");
    assert!(error.starts_with("Error solving equation: "), "{error}");
}
