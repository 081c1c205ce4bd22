// ABOUTME: Minimal partner hosting server over hyper for end-to-end CLI tests.
// ABOUTME: Accepts authenticated uploads and stage index writes, and serves the stage index back.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const API_KEY: &str = "secret-key";
pub const REPO_OWNER: &str = "acme";

#[derive(Default)]
pub struct PartnerState {
    pub uploaded_keys: Vec<String>,
    pub stage_index: Option<String>,
    pub publish_queries: Vec<Option<String>>,
    pub fail_uploads: bool,
    pub fail_publish: bool,
}

pub struct FakePartner {
    pub url: String,
    pub state: Arc<Mutex<PartnerState>>,
}

impl FakePartner {
    /// Start a server on an ephemeral port. It runs on its own thread until the
    /// test process exits.
    pub fn start() -> Self {
        Self::start_with(PartnerState::default())
    }

    pub fn start_with(initial: PartnerState) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(initial));

        let shared = Arc::clone(&state);
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(serve(listener, shared));
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// YAML config pointing both endpoints at this server.
    pub fn config_yaml(&self) -> String {
        format!("endpoints:\n  api: {url}\n  site: {url}\n", url = self.url)
    }
}

async fn serve(listener: std::net::TcpListener, state: Arc<Mutex<PartnerState>>) {
    let listener = TcpListener::from_std(listener).unwrap();
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            continue;
        };
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let service = service_fn(move |req| handle(req, Arc::clone(&state)));
            let _ = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await;
        });
    }
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<Mutex<PartnerState>>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let authorized = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {API_KEY}").as_str())
        && req
            .headers()
            .get("x-repo-owner")
            .and_then(|v| v.to_str().ok())
            == Some(REPO_OWNER);
    let body = req.into_body().collect().await?.to_bytes();

    let (status, text) = route(&method, &path, query, authorized, &body, &state);
    Ok(Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(text)))
        .unwrap())
}

fn route(
    method: &Method,
    path: &str,
    query: Option<String>,
    authorized: bool,
    body: &Bytes,
    state: &Mutex<PartnerState>,
) -> (StatusCode, String) {
    let mut state = state.lock();

    if *method == Method::GET {
        let is_index = path.starts_with("/_") && path.ends_with("/index.html");
        return match (is_index, &state.stage_index) {
            (true, Some(doc)) => (StatusCode::OK, doc.clone()),
            _ => (StatusCode::NOT_FOUND, "not found".to_string()),
        };
    }

    let Some(rest) = path.strip_prefix("/api/deployment/") else {
        return (StatusCode::NOT_FOUND, "not found".to_string());
    };
    if *method != Method::PUT {
        return (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string());
    }
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "bad credentials".to_string());
    }

    let segments: Vec<&str> = rest.splitn(3, '/').collect();
    match segments.as_slice() {
        [_app, "index.html"] => {
            if state.fail_publish {
                return (StatusCode::INTERNAL_SERVER_ERROR, "index store offline".to_string());
            }
            state.stage_index = Some(String::from_utf8_lossy(body).into_owned());
            state.publish_queries.push(query);
            (StatusCode::OK, "{}".to_string())
        }
        [_app, _version, key] => {
            if state.fail_uploads {
                return (StatusCode::INTERNAL_SERVER_ERROR, "storage offline".to_string());
            }
            state.uploaded_keys.push(key.to_string());
            (StatusCode::OK, "{}".to_string())
        }
        _ => (StatusCode::BAD_REQUEST, "bad path".to_string()),
    }
}
