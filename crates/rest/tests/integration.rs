use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use protocol::{
    ApiCall, CallInvoker, ChangeCount, IdentityContext, Resource, ResourceList, TransportError,
    HEADER_TENANT, HEADER_TOKEN, HEADER_USER, TRANSPORT_ERROR_CODE,
};
use rest::{RestConfig, RestTransport};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
struct CapturedRequest {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().copied()
    }
}

#[derive(Clone)]
enum Reply {
    Respond {
        status: u16,
        content_type: &'static str,
        body: String,
    },
    /// Sends the status line and part of the declared body, then hangs up.
    CutShort {
        status: u16,
        partial: &'static str,
    },
    Stall,
}

fn json_reply(status: u16, body: Value) -> Reply {
    Reply::Respond {
        status,
        content_type: "application/json",
        body: body.to_string(),
    }
}

fn text_reply(status: u16, body: &str) -> Reply {
    Reply::Respond {
        status,
        content_type: "text/plain",
        body: body.to_owned(),
    }
}

fn envelope(result: Value) -> Value {
    json!({"status": "success", "message": "ok", "version": "1.6.3", "result": result})
}

type Handler = Arc<dyn Fn(&CapturedRequest) -> Reply + Send + Sync>;

struct ScriptedServer {
    base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn start<F>(handler: F) -> Self
    where
        F: Fn(&CapturedRequest) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");
        let handler: Handler = Arc::new(handler);
        let captured = Arc::new(Mutex::new(Vec::new()));

        let handle = tokio::spawn({
            let captured = Arc::clone(&captured);
            async move {
                loop {
                    let (socket, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    let handler = Arc::clone(&handler);
                    let captured = Arc::clone(&captured);
                    tokio::spawn(async move {
                        serve_one(socket, handler, captured).await;
                    });
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            captured,
            handle,
        }
    }

    fn captured(&self) -> Vec<CapturedRequest> {
        self.captured.lock().expect("captured lock").clone()
    }

    fn invoker(&self) -> CallInvoker {
        RestTransport::invoker(RestConfig::new(&self.base_url)).expect("transport")
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(mut socket: TcpStream, handler: Handler, captured: Arc<Mutex<Vec<CapturedRequest>>>) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    captured.lock().expect("captured lock").push(request.clone());

    match handler(&request) {
        Reply::Stall => tokio::time::sleep(Duration::from_secs(30)).await,
        Reply::Respond {
            status,
            content_type,
            body,
        } => {
            let head = format!(
                "HTTP/1.1 {status} Scripted\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Reply::CutShort { status, partial } => {
            let head = format!(
                "HTTP/1.1 {status} Scripted\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                partial.len() + 64
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(partial.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos;
        }
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_owned();
    let target = request_line.next()?.to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_owned()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    Some(CapturedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn user(token: &str) -> IdentityContext {
    IdentityContext::user(token).expect("identity")
}

#[derive(Debug, PartialEq, serde::Deserialize)]
struct SystemSummary {
    id: String,
    owner: String,
}

#[tokio::test]
async fn success_envelope_is_unwrapped_over_http() {
    init_tracing();
    let server = ScriptedServer::start(|_| {
        json_reply(200, envelope(json!([{"id": "sys1", "owner": "alice"}, {"id": "sys2", "owner": "bob"}])))
    })
    .await;

    let systems = server
        .invoker()
        .call::<ResourceList<SystemSummary>>(
            &ApiCall::get("getSystems", "/v3/systems").query("search", "(owner.eq.alice)"),
            &user("alice-jwt"),
        )
        .await
        .expect("call");

    assert_eq!(systems.len(), 2);
    assert_eq!(systems[0], SystemSummary { id: "sys1".to_owned(), owner: "alice".to_owned() });

    let captured = server.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].method, "GET");
    assert_eq!(captured[0].target, "/v3/systems?search=%28owner.eq.alice%29");
    assert_eq!(captured[0].header_values(HEADER_TOKEN), vec!["alice-jwt"]);
    assert_eq!(captured[0].header("accept"), Some("application/json"));
}

#[tokio::test]
async fn request_body_is_sent_as_json() {
    init_tracing();
    let server = ScriptedServer::start(|_| json_reply(200, envelope(json!({"changes": 1})))).await;

    let changes = server
        .invoker()
        .call::<ChangeCount>(
            &ApiCall::post("changeSystemOwner", "/v3/systems/sys1/changeOwner/carol")
                .json(&json!({"reason": "transfer"}))
                .expect("body"),
            &user("jwt"),
        )
        .await
        .expect("call");
    assert_eq!(changes, 1);

    let captured = server.captured();
    assert_eq!(captured[0].method, "POST");
    assert_eq!(captured[0].header("content-type"), Some("application/json"));
    let body: Value = serde_json::from_slice(&captured[0].body).expect("json body");
    assert_eq!(body, json!({"reason": "transfer"}));
}

#[tokio::test]
async fn caller_ids_are_encoded_on_the_wire() {
    init_tracing();
    let server = ScriptedServer::start(|_| json_reply(200, envelope(json!({"id": "x"})))).await;

    server
        .invoker()
        .call::<Resource<Value>>(
            &ApiCall::get("getSystem", "/v3/systems").segment("../../tokens?x=#frag"),
            &user("jwt"),
        )
        .await
        .expect("call");

    let refused = server
        .invoker()
        .call::<Resource<Value>>(&ApiCall::get("getSystem", "/v3/systems").segment(".."), &user("jwt"))
        .await
        .expect_err("dot segment must be refused");
    assert_eq!(refused.code(), TRANSPORT_ERROR_CODE);
    assert!(matches!(refused.cause(), TransportError::InvalidRequest(_)));

    let captured = server.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].target, "/v3/systems/..%2F..%2Ftokens%3Fx=%23frag");
}

#[tokio::test]
async fn not_found_envelope_is_client_error_404() {
    init_tracing();
    let server = ScriptedServer::start(|_| {
        json_reply(
            404,
            json!({
                "status": "error",
                "message": "SYSAPI_NOSYSTEM Not found. jwtTenant: dev jwtUser: alice System: nosuch",
                "version": "1.6.3",
                "result": null
            }),
        )
    })
    .await;

    let error = server
        .invoker()
        .call::<Resource<Value>>(&ApiCall::get("getSystem", "/v3/systems/nosuch"), &user("jwt"))
        .await
        .expect_err("404 must raise");

    assert_eq!(error.code(), 404);
    assert_eq!(error.status(), Some("error"));
    assert_eq!(error.version(), Some("1.6.3"));
    assert!(error.tapis_message().is_some_and(|m| m.contains("SYSAPI_NOSYSTEM")));
    assert!(error.to_string().contains("SYSAPI_NOSYSTEM"));
}

#[tokio::test]
async fn plain_text_500_from_proxy_is_message_verbatim() {
    init_tracing();
    let server = ScriptedServer::start(|_| text_reply(500, "upstream request timeout")).await;

    let error = server
        .invoker()
        .call::<Resource<Value>>(&ApiCall::get("getApp", "/v3/apps/app1/0.1"), &user("jwt"))
        .await
        .expect_err("500 must raise");

    assert_eq!(error.code(), 500);
    assert_eq!(error.message(), "upstream request timeout");
    assert_eq!(error.status(), None);
    assert_eq!(error.version(), None);
}

#[tokio::test]
async fn truncated_error_body_keeps_http_status() {
    init_tracing();
    let server = ScriptedServer::start(|_| Reply::CutShort {
        status: 502,
        partial: "Bad Gat",
    })
    .await;

    let error = server
        .invoker()
        .call::<Resource<Value>>(&ApiCall::get("getApp", "/v3/apps/app1/0.1"), &user("jwt"))
        .await
        .expect_err("502 must raise");

    assert_eq!(error.code(), 502);
    assert!(matches!(error.cause(), TransportError::Status { status: 502, .. }));
    assert!(!error.message().trim().is_empty());
}

#[tokio::test]
async fn truncated_success_body_is_transport_failure() {
    init_tracing();
    let server = ScriptedServer::start(|_| Reply::CutShort {
        status: 200,
        partial: r#"{"status":"succ"#,
    })
    .await;

    let error = server
        .invoker()
        .call::<Resource<Value>>(&ApiCall::get("getApp", "/v3/apps/app1/0.1"), &user("jwt"))
        .await
        .expect_err("incomplete success body must raise");

    assert_eq!(error.code(), TRANSPORT_ERROR_CODE);
}

#[tokio::test]
async fn concurrent_identities_do_not_bleed_on_the_wire() {
    init_tracing();
    let server = ScriptedServer::start(|request| {
        json_reply(
            200,
            envelope(json!({
                "token": request.header_values(HEADER_TOKEN),
                "user": request.header_values(HEADER_USER),
                "tenant": request.header_values(HEADER_TENANT),
            })),
        )
    })
    .await;
    let invoker = server.invoker();

    let end_user = user("end-user-jwt");
    let service = IdentityContext::service_on_behalf_of("service-jwt", "testuser2", "dev").expect("identity");

    let mut tasks = Vec::new();
    for i in 0..16 {
        let invoker = invoker.clone();
        let identity = if i % 2 == 0 { end_user.clone() } else { service.clone() };
        tasks.push(tokio::spawn(async move {
            let seen = invoker
                .call::<Resource<Value>>(&ApiCall::get("whoami", "/v3/systems/whoami"), &identity)
                .await
                .expect("call")
                .expect("echo result");
            (identity, seen)
        }));
    }

    for task in tasks {
        let (identity, seen) = task.await.expect("join");
        assert_eq!(seen["token"], json!([identity.token().expose()]));
        match identity.impersonation() {
            Some(obo) => {
                assert_eq!(seen["user"], json!([obo.user.as_str()]));
                assert_eq!(seen["tenant"], json!([obo.tenant.as_str()]));
            }
            None => {
                assert_eq!(seen["user"], json!([]));
                assert_eq!(seen["tenant"], json!([]));
            }
        }
    }
    assert_eq!(server.captured().len(), 16);
}

#[tokio::test]
async fn connection_refused_is_transport_failure() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let invoker = RestTransport::invoker(RestConfig::new(format!("http://{addr}"))).expect("transport");
    let error = invoker
        .call::<Resource<Value>>(&ApiCall::get("healthCheck", "/v3/systems/healthcheck"), &user("jwt"))
        .await
        .expect_err("must fail");

    assert_eq!(error.code(), TRANSPORT_ERROR_CODE);
    assert!(matches!(error.cause(), TransportError::Connect(_)));
    assert!(!error.message().trim().is_empty());
}

#[tokio::test]
async fn read_timeout_is_transport_failure() {
    init_tracing();
    let server = ScriptedServer::start(|_| Reply::Stall).await;
    let invoker = RestTransport::invoker(
        RestConfig::new(&server.base_url).with_timeout(Duration::from_millis(300)),
    )
    .expect("transport");

    let error = invoker
        .call::<Resource<Value>>(&ApiCall::get("readyCheck", "/v3/systems/readycheck"), &user("jwt"))
        .await
        .expect_err("must time out");

    assert_eq!(error.code(), TRANSPORT_ERROR_CODE);
    assert!(matches!(error.cause(), TransportError::Timeout(_)));
}
