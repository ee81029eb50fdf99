//! End-to-end tests for the login handshake
//!
//! These tests run the real flow, reqwest transport and login approver
//! against a small local HTTP stub that plays the movie service.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use reelpass_application::{AuthenticationFlow, CancellationToken};
use reelpass_domain::{AuthError, AuthSettings, Credentials, FlowResult, FlowState, UserId};
use reelpass_infrastructure::{LoginApprover, ReqwestTransport};

/// Canned replies keyed by request path, plus a log of request targets.
#[derive(Clone, Default)]
struct Stub {
    routes: Arc<HashMap<&'static str, (u16, Value)>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    fn new(routes: &[(&'static str, u16, Value)]) -> Self {
        Self {
            routes: Arc::new(
                routes
                    .iter()
                    .map(|(path, status, body)| (*path, (*status, body.clone())))
                    .collect(),
            ),
            requests: Arc::default(),
        }
    }

    fn tmdb() -> Self {
        Self::new(&[
            (
                "/authentication/token/new",
                200,
                json!({"success": true, "expires_at": "2016-08-26 17:04:39 UTC", "request_token": "abc123"}),
            ),
            (
                "/authentication/token/validate_with_login",
                200,
                json!({"success": true, "request_token": "abc123"}),
            ),
            (
                "/authentication/session/new",
                200,
                json!({"success": true, "session_id": "sess456"}),
            ),
            ("/account", 200, json!({"id": 42, "username": "alice"})),
        ])
    }

    /// Serves requests until the test ends and returns the base URL.
    async fn start(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stub = self.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let stub = stub.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf[read..]).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => read += n,
                        }
                    }
                    let request = String::from_utf8_lossy(&buf[..read]).to_string();
                    let target = request
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or_default()
                        .to_string();
                    stub.requests.lock().unwrap().push(target.clone());

                    let path = target.split('?').next().unwrap_or_default();
                    let (status, body) = stub.routes.get(path).cloned().unwrap_or((
                        404,
                        json!({"status_code": 34, "status_message": "The resource you requested could not be found."}),
                    ));
                    let body = body.to_string();
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}")
    }

    fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|target| target.split('?').next().unwrap_or_default().to_string())
            .collect()
    }

    fn targets(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn settings(base: &str) -> AuthSettings {
    AuthSettings {
        api_base_url: base.to_string(),
        timeout_ms: 5_000,
        ..AuthSettings::with_api_key("k3y")
    }
}

fn login_flow(
    base: &str,
) -> AuthenticationFlow<ReqwestTransport, LoginApprover<ReqwestTransport>> {
    let settings = settings(base);
    let transport = Arc::new(ReqwestTransport::new(&settings).unwrap());
    let approver = Arc::new(LoginApprover::new(Arc::clone(&transport)));
    AuthenticationFlow::new(transport, approver, settings.authorization_page().unwrap())
}

fn credentials() -> Credentials {
    Credentials::new("alice", "hunter2").unwrap()
}

#[tokio::test]
async fn test_login_end_to_end() {
    let stub = Stub::tmdb();
    let base = stub.start().await;

    let result = login_flow(&base).run(&credentials()).await;

    assert_eq!(
        result,
        FlowResult::Success {
            session_id: reelpass_domain::SessionId::new("sess456"),
            user_id: Some(UserId(42)),
        }
    );
    assert_eq!(
        stub.targets(),
        vec![
            "/authentication/token/new?api_key=k3y".to_string(),
            "/authentication/token/validate_with_login?api_key=k3y&password=hunter2&request_token=abc123&username=alice".to_string(),
            "/authentication/session/new?api_key=k3y&request_token=abc123".to_string(),
            "/account?api_key=k3y&session_id=sess456".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_rejected_login_stops_before_session() {
    let stub = Stub::new(&[
        (
            "/authentication/token/new",
            200,
            json!({"success": true, "request_token": "abc123"}),
        ),
        (
            "/authentication/token/validate_with_login",
            401,
            json!({"status_code": 30, "status_message": "Invalid username and/or password: You did not provide a valid login."}),
        ),
    ]);
    let base = stub.start().await;

    let result = login_flow(&base).run(&credentials()).await;

    assert_eq!(result.reason(), Some(&AuthError::AuthorizationDeclined));
    assert_eq!(
        stub.paths(),
        vec![
            "/authentication/token/new".to_string(),
            "/authentication/token/validate_with_login".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_invalid_api_key_is_a_service_error() {
    let stub = Stub::new(&[(
        "/authentication/token/new",
        401,
        json!({"status_code": 7, "status_message": "Invalid API key: You must be granted a valid key."}),
    )]);
    let base = stub.start().await;

    let result = login_flow(&base).run(&credentials()).await;

    assert_eq!(
        result.reason(),
        Some(&AuthError::Remote {
            code: 7,
            message: "Invalid API key: You must be granted a valid key.".to_string(),
        })
    );
    assert_eq!(stub.paths().len(), 1);
}

#[tokio::test]
async fn test_account_without_id_still_logs_in() {
    let stub = Stub::new(&[
        (
            "/authentication/token/new",
            200,
            json!({"success": true, "request_token": "abc123"}),
        ),
        (
            "/authentication/token/validate_with_login",
            200,
            json!({"success": true}),
        ),
        (
            "/authentication/session/new",
            200,
            json!({"success": true, "session_id": "sess456"}),
        ),
        ("/account", 200, json!({"username": "alice"})),
    ]);
    let base = stub.start().await;

    let result = login_flow(&base).run(&credentials()).await;

    assert!(result.is_success());
    assert_eq!(result.user_id(), None);
}

#[tokio::test]
async fn test_account_server_error_fails_the_login() {
    let stub = Stub::new(&[
        (
            "/authentication/token/new",
            200,
            json!({"success": true, "request_token": "abc123"}),
        ),
        (
            "/authentication/token/validate_with_login",
            200,
            json!({"success": true}),
        ),
        (
            "/authentication/session/new",
            200,
            json!({"success": true, "session_id": "sess456"}),
        ),
        (
            "/account",
            500,
            json!({"success": false, "errors": ["Internal error"]}),
        ),
    ]);
    let base = stub.start().await;

    let result = login_flow(&base).run(&credentials()).await;

    assert!(!result.is_success());
    assert!(matches!(result.reason(), Some(AuthError::Transport { .. })));
    assert_eq!(stub.paths().last().map(String::as_str), Some("/account"));
}

#[tokio::test]
async fn test_session_server_error_is_a_transport_error() {
    let stub = Stub::new(&[
        (
            "/authentication/token/new",
            200,
            json!({"success": true, "request_token": "abc123"}),
        ),
        (
            "/authentication/token/validate_with_login",
            200,
            json!({"success": true}),
        ),
        (
            "/authentication/session/new",
            502,
            json!({"success": false}),
        ),
    ]);
    let base = stub.start().await;

    let result = login_flow(&base).run(&credentials()).await;

    assert!(matches!(result.reason(), Some(AuthError::Transport { .. })));
    assert!(!stub.paths().contains(&"/account".to_string()));
}

#[tokio::test]
async fn test_background_login_reports_progress_and_result() {
    let stub = Stub::tmdb();
    let base = stub.start().await;

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let flow = Arc::new(login_flow(&base).with_progress(progress_tx));
    let (_cancel, receiver) = CancellationToken::new();
    let (done_tx, done_rx) = oneshot::channel();

    flow.authenticate(credentials(), receiver, move |result| {
        done_tx.send(result).unwrap();
    })
    .await
    .unwrap();

    let result = done_rx.await.unwrap();
    assert_eq!(result.user_id(), Some(UserId(42)));

    let mut states = Vec::new();
    while let Some(state) = progress_rx.recv().await {
        states.push(state);
    }
    assert_eq!(states.len(), 5);
    assert_eq!(states[0], FlowState::TokenRequested);
    assert_eq!(
        states[1],
        FlowState::AwaitingApproval {
            authorization_url: "https://www.themoviedb.org/authenticate/abc123".to_string(),
        }
    );
    assert!(states[4].is_finished());
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = login_flow(&base).run(&credentials()).await;

    assert!(matches!(result.reason(), Some(AuthError::Transport { .. })));
}
