//! Client behaviour against a mock gridscale API: request headers, response
//! classification and the wait loops that follow asynchronous work.

#[path = "common/mock_api.rs"]
mod mock_api;

use std::net::TcpListener;
use std::time::{Duration, Instant};

use gridscale::client::{NO_ERROR_MESSAGE, PaasServiceUpdateRequest, TemplateCreateRequest};
use gridscale::{ApiError, ClientError, DecodePolicy, PollErrorPolicy, WaitSettings};
use mockito::{Matcher, Server};
use tokio_util::sync::CancellationToken;

use mock_api::{API_TOKEN, POWER_WAIT, USER_UUID, client_for, client_for_url};

const TEMPLATE_ID: &str = "4db64bfc-9fb2-4976-80b5-94ff43b1233a";
const REQUEST_ID: &str = "6c2b1b4e-5a3d-4f9e-8b36-3c0f2a61d7e5";
const SERVER_ID: &str = "9f7d3c1a-2b4e-4d6f-8a1c-5e7b9d0f2a34";
const SERVICE_ID: &str = "0c6f0d36-8f5c-4b5a-9a57-3f4b3a6f9e10";
const SERVICE_TEMPLATE_ID: &str = "e1f2a3b4-c5d6-4e7f-8a9b-0c1d2e3f4a5b";

fn template_body() -> String {
    format!(
        r#"{{"template": {{"object_uuid": "{TEMPLATE_ID}", "name": "ubuntu-base",
            "status": "active", "labels": ["base"]}}}}"#
    )
}

fn request_body(status: &str) -> String {
    format!(r#"{{"{REQUEST_ID}": {{"status": "{status}", "message": "", "create_time": ""}}}}"#)
}

fn server_body(power: bool) -> String {
    format!(r#"{{"server": {{"object_uuid": "{SERVER_ID}", "name": "web", "power": {power}}}}}"#)
}

/// Base URL of a local port that nothing listens on.
fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local address").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn requests_carry_credentials_and_json_content_type() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/objects/templates/{TEMPLATE_ID}").as_str())
        .match_header("X-Auth-UserId", USER_UUID)
        .match_header("X-Auth-Token", API_TOKEN)
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(template_body())
        .create_async()
        .await;

    let template = client_for(&server)
        .get_template(TEMPLATE_ID)
        .await
        .expect("template should decode");

    mock.assert_async().await;
    assert_eq!(template.properties.name, "ubuntu-base");
    assert_eq!(template.properties.labels, vec![String::from("base")]);
}

#[tokio::test]
async fn error_status_becomes_api_error_with_http_status_code() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/objects/templates")
        .with_status(409)
        .with_body(r#"{"status": 412, "message": "object is locked"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .get_template_list()
        .await
        .expect_err("409 should fail");

    let ClientError::Api(ref api) = err else {
        panic!("expected Api error, got {err:?}");
    };
    assert_eq!(api.status_code, 409);
    assert_eq!(api.status.as_deref(), Some("412"));
    assert_eq!(
        err.to_string(),
        "[Error] statuscode 409 returned: object is locked"
    );
}

#[tokio::test]
async fn error_without_message_uses_placeholder() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", format!("/objects/templates/{TEMPLATE_ID}").as_str())
        .with_status(500)
        .with_body("<html>gateway exploded</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .delete_template(TEMPLATE_ID)
        .await
        .expect_err("500 should fail");

    assert_eq!(
        err,
        ClientError::Api(ApiError {
            status_code: 500,
            status: None,
            message: None,
        })
    );
    assert!(err.to_string().ends_with(NO_ERROR_MESSAGE));
}

#[tokio::test]
async fn delete_of_missing_object_reports_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", format!("/objects/templates/{TEMPLATE_ID}").as_str())
        .with_status(404)
        .with_body(r#"{"status": "Not Found", "message": "no such template"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .delete_template(TEMPLATE_ID)
        .await
        .expect_err("404 should surface from the client");

    assert!(err.is_not_found());
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn undecodable_success_body_fails_under_strict_policy() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/objects/templates")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client_for(&server)
        .get_template_list()
        .await
        .expect_err("strict decode should fail");

    assert!(
        matches!(err, ClientError::Decode { ref path, .. } if path == "/objects/templates"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn undecodable_success_body_yields_default_under_lenient_policy() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/objects/templates")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let templates = client_for(&server)
        .with_decode_policy(DecodePolicy::Lenient)
        .get_template_list()
        .await
        .expect("lenient decode should succeed");

    assert!(templates.list.is_empty());
}

#[tokio::test]
async fn create_template_waits_for_request_completion() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/objects/templates")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "ubuntu-base",
            "snapshot_uuid": "snap-1",
        })))
        .with_status(202)
        .with_body(format!(
            r#"{{"object_uuid": "{TEMPLATE_ID}", "request_uuid": "{REQUEST_ID}"}}"#
        ))
        .create_async()
        .await;
    let pending = server
        .mock("GET", format!("/requests/{REQUEST_ID}").as_str())
        .with_status(200)
        .with_body(request_body("pending"))
        .expect(3)
        .create_async()
        .await;
    let done = server
        .mock("GET", format!("/requests/{REQUEST_ID}").as_str())
        .with_status(200)
        .with_body(request_body("done"))
        .create_async()
        .await;

    let response = client_for(&server)
        .create_template(&TemplateCreateRequest {
            name: String::from("ubuntu-base"),
            snapshot_uuid: String::from("snap-1"),
            labels: Vec::new(),
        })
        .await
        .expect("create should succeed");

    create.assert_async().await;
    pending.assert_async().await;
    done.assert_async().await;
    assert_eq!(response.object_uuid, TEMPLATE_ID);
}

#[tokio::test]
async fn request_completion_tolerates_failed_polls() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", format!("/requests/{REQUEST_ID}").as_str())
        .with_status(500)
        .with_body(r#"{"message": "try again"}"#)
        .expect(2)
        .create_async()
        .await;
    let done = server
        .mock("GET", format!("/requests/{REQUEST_ID}").as_str())
        .with_status(200)
        .with_body(request_body("done"))
        .create_async()
        .await;

    client_for(&server)
        .wait_for_request_completion(REQUEST_ID)
        .await
        .expect("tolerated failures should not end the wait");

    failing.assert_async().await;
    done.assert_async().await;
}

#[tokio::test]
async fn power_wait_returns_first_poll_error() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", format!("/objects/servers/{SERVER_ID}").as_str())
        .with_status(500)
        .with_body(r#"{"message": "backend down"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server)
        .wait_for_server_power_status(SERVER_ID, true)
        .await
        .expect_err("fatal policy should stop on the first failure");

    failing.assert_async().await;
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn power_wait_times_out_when_state_never_changes() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", format!("/objects/servers/{SERVER_ID}").as_str())
        .with_status(200)
        .with_body(server_body(false))
        .expect_at_least(1)
        .create_async()
        .await;

    let err = client_for(&server)
        .wait_for_server_power_status(SERVER_ID, true)
        .await
        .expect_err("power state never changes");

    assert_eq!(
        err,
        ClientError::Timeout {
            action: String::from("server power state"),
            id: String::from(SERVER_ID),
        }
    );
    assert_eq!(
        err.to_string(),
        format!("timeout reached waiting for server power state of {SERVER_ID}")
    );
}

#[tokio::test]
async fn set_server_power_is_a_no_op_when_already_in_state() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", format!("/objects/servers/{SERVER_ID}").as_str())
        .with_status(200)
        .with_body(server_body(true))
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", format!("/objects/servers/{SERVER_ID}/power").as_str())
        .expect(0)
        .create_async()
        .await;

    client_for(&server)
        .start_server(SERVER_ID)
        .await
        .expect("already running");

    patch.assert_async().await;
}

#[tokio::test]
async fn set_server_power_patches_and_waits_for_new_state() {
    let mut server = Server::new_async().await;
    let before = server
        .mock("GET", format!("/objects/servers/{SERVER_ID}").as_str())
        .with_status(200)
        .with_body(server_body(true))
        .expect(2)
        .create_async()
        .await;
    let after = server
        .mock("GET", format!("/objects/servers/{SERVER_ID}").as_str())
        .with_status(200)
        .with_body(server_body(false))
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", format!("/objects/servers/{SERVER_ID}/power").as_str())
        .match_body(Matcher::Json(serde_json::json!({"power": false})))
        .with_status(204)
        .create_async()
        .await;

    client_for(&server)
        .stop_server(SERVER_ID)
        .await
        .expect("server should stop");

    patch.assert_async().await;
    before.assert_async().await;
    after.assert_async().await;
}

#[tokio::test]
async fn cancelled_token_ends_wait_without_polling() {
    let mut server = Server::new_async().await;
    let status = server
        .mock("GET", format!("/requests/{REQUEST_ID}").as_str())
        .expect(0)
        .create_async()
        .await;
    let token = CancellationToken::new();
    token.cancel();

    let err = client_for(&server)
        .with_cancellation_token(token)
        .wait_for_request_completion(REQUEST_ID)
        .await
        .expect_err("cancelled wait should fail");

    status.assert_async().await;
    assert!(
        matches!(err, ClientError::Cancelled { ref id, .. } if id == REQUEST_ID),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn repeated_reads_return_identical_values() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/objects/templates/{TEMPLATE_ID}").as_str())
        .with_status(200)
        .with_body(template_body())
        .expect(2)
        .create_async()
        .await;
    let client = client_for(&server);

    let first = client.get_template(TEMPLATE_ID).await.expect("first read");
    let second = client.get_template(TEMPLATE_ID).await.expect("second read");

    mock.assert_async().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn connection_failure_surfaces_as_transport_error() {
    let err = client_for_url(unreachable_url())
        .get_template(TEMPLATE_ID)
        .await
        .expect_err("nothing listens on the port");

    assert!(
        matches!(err, ClientError::Transport { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn power_wait_stops_on_first_connection_failure() {
    let client = client_for_url(unreachable_url());
    let start = Instant::now();

    let err = client
        .wait_for_server_power_status(SERVER_ID, true)
        .await
        .expect_err("connection failure is fatal for power waits");
    let elapsed = start.elapsed();

    assert!(
        matches!(err, ClientError::Transport { .. }),
        "unexpected error: {err:?}"
    );
    assert!(elapsed >= POWER_WAIT.interval, "elapsed {elapsed:?}");
    assert!(elapsed < POWER_WAIT.timeout, "elapsed {elapsed:?}");
}

#[tokio::test]
async fn request_completion_polls_through_connection_failures_until_timeout() {
    let settings = WaitSettings {
        timeout: Duration::from_millis(200),
        interval: Duration::from_millis(10),
        on_error: PollErrorPolicy::Tolerate,
    };
    let client = client_for_url(unreachable_url()).with_request_wait(settings);
    let start = Instant::now();

    let err = client
        .wait_for_request_completion(REQUEST_ID)
        .await
        .expect_err("request never completes");
    let elapsed = start.elapsed();

    assert_eq!(
        err,
        ClientError::Timeout {
            action: String::from("request completion"),
            id: String::from(REQUEST_ID),
        }
    );
    assert!(elapsed >= settings.timeout, "elapsed {elapsed:?}");
}

#[tokio::test]
async fn template_switch_wait_tolerates_failed_polls() {
    let mut server = Server::new_async().await;
    let patch = server
        .mock("PATCH", format!("/objects/paas/services/{SERVICE_ID}").as_str())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "paas_service_template_uuid": SERVICE_TEMPLATE_ID,
        })))
        .with_status(204)
        .create_async()
        .await;
    let failing = server
        .mock("GET", format!("/objects/paas/services/{SERVICE_ID}").as_str())
        .with_status(502)
        .with_body(r#"{"message": "upgrade in progress"}"#)
        .expect(2)
        .create_async()
        .await;
    let switched = server
        .mock("GET", format!("/objects/paas/services/{SERVICE_ID}").as_str())
        .with_status(200)
        .with_body(
            serde_json::json!({"paas_service": {
                "object_uuid": SERVICE_ID,
                "service_template_uuid": SERVICE_TEMPLATE_ID,
            }})
            .to_string(),
        )
        .create_async()
        .await;

    client_for(&server)
        .update_paas_service(
            SERVICE_ID,
            &PaasServiceUpdateRequest {
                name: String::from("cluster"),
                paas_service_template_uuid: Some(String::from(SERVICE_TEMPLATE_ID)),
                ..PaasServiceUpdateRequest::default()
            },
        )
        .await
        .expect("transient failures during a release switch are tolerated");

    patch.assert_async().await;
    failing.assert_async().await;
    switched.assert_async().await;
}
