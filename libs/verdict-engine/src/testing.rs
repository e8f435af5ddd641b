// Test doubles shared by unit tests: a scripted engine and a local stub HTTP server
use crate::backend::{ExecutionBackend, JobHandle, RawSubmission, Submission};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Plan = Box<dyn Fn(&Submission) -> Result<Vec<RawSubmission>> + Send + Sync>;

/// Each submitted job replays a script of status snapshots; the last
/// snapshot repeats forever once the script runs out.
pub struct ScriptedBackend {
    plan: Plan,
    jobs: Mutex<HashMap<String, VecDeque<RawSubmission>>>,
    submissions: Mutex<Vec<Submission>>,
    fetches: AtomicU32,
    fetch_error: Option<EngineError>,
}

impl ScriptedBackend {
    /// Every job (and every unknown token) replays the same script
    pub fn new(script: Vec<RawSubmission>) -> Self {
        Self::with_plan(move |_| Ok(script.clone()))
    }

    /// Script chosen per submission; an `Err` fails the submit call itself
    pub fn with_plan<F>(plan: F) -> Self
    where
        F: Fn(&Submission) -> Result<Vec<RawSubmission>> + Send + Sync + 'static,
    {
        Self {
            plan: Box::new(plan),
            jobs: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            fetches: AtomicU32::new(0),
            fetch_error: None,
        }
    }

    /// Every fetch fails with `error`
    pub fn failing(error: EngineError) -> Self {
        Self {
            fetch_error: Some(error),
            ..Self::new(Vec::new())
        }
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn submit(&self, submission: &Submission) -> Result<JobHandle> {
        let script = (self.plan)(submission)?;
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission.clone());
        let token = format!("job-{}", submissions.len());
        self.jobs
            .lock()
            .unwrap()
            .insert(token.clone(), script.into_iter().collect());
        Ok(JobHandle::new(token))
    }

    async fn fetch(&self, handle: &JobHandle) -> Result<RawSubmission> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }

        let mut jobs = self.jobs.lock().unwrap();
        if !jobs.contains_key(handle.as_str()) {
            let script = (self.plan)(&Submission {
                source_code: String::new(),
                language_id: 0,
                stdin: String::new(),
            })?;
            jobs.insert(handle.as_str().to_string(), script.into_iter().collect());
        }
        let queue = jobs.get_mut(handle.as_str()).unwrap();

        match queue.len() {
            0 => Err(EngineError::InvalidResponse("empty script".to_string())),
            1 => Ok(queue[0].clone()),
            _ => Ok(queue.pop_front().unwrap()),
        }
    }
}

pub fn encode(text: &str) -> String {
    general_purpose::STANDARD.encode(text)
}

/// Terminal snapshot with the given status and plain-text stdout (encoded on the way in)
pub fn finished(id: u32, description: &str, stdout: &str) -> RawSubmission {
    RawSubmission {
        stdout: Some(encode(stdout)),
        time: Some(0.02),
        memory: Some(3300),
        ..RawSubmission::with_status(id, description)
    }
}

/// One request as seen by `StubServer`
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

type Responder = Box<dyn Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync>;

struct StubState {
    responder: Responder,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local HTTP server on 127.0.0.1 that records every request and answers
/// through `responder`
pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let state = Arc::new(StubState {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Answer every request with the same status and body
    pub async fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_string();
        let status = StatusCode::from_u16(status).unwrap();
        Self::start(move |_| (status, body.clone())).await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let request = RecordedRequest {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    };
    let response = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);
    response
}
