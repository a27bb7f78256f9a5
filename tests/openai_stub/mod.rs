use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// How the stub answers `POST /v1/chat/completions`.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum CompletionBehavior {
    /// 200 with `text` as the assistant message content.
    Reply(String),
    /// Non-2xx with an OpenAI-style error body.
    Fail { status: u16, message: String },
}

pub struct OpenAiStub {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<Value>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl OpenAiStub {
    pub fn spawn(behavior: CompletionBehavior) -> Self {
        Self::spawn_with_delay(behavior, Duration::ZERO)
    }

    /// Sleeps before answering so concurrent callers overlap.
    pub fn spawn_with_delay(behavior: CompletionBehavior, delay: Duration) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start openai stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/v1");
        let hits = Arc::new(AtomicUsize::new(0));

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let last_request = Arc::new(Mutex::new(None));

        let counter = Arc::clone(&hits);
        let recorded = Arc::clone(&last_request);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                if request.method() != &tiny_http::Method::Post || path != "/v1/chat/completions"
                {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let mut body = String::new();
                let parsed: Option<Value> = request
                    .as_reader()
                    .read_to_string(&mut body)
                    .ok()
                    .and_then(|_| serde_json::from_str(&body).ok());
                let has_prompt = parsed
                    .as_ref()
                    .and_then(|v| v.pointer("/messages/0/content"))
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| s.contains("Content:\n"));
                if !has_prompt {
                    let _ = request.respond(
                        tiny_http::Response::from_string("missing quiz prompt")
                            .with_status_code(400),
                    );
                    continue;
                }

                counter.fetch_add(1, Ordering::SeqCst);
                *recorded.lock().expect("request mutex") = parsed.clone();
                if !delay.is_zero() {
                    thread::sleep(delay);
                }

                let (status, response_body) = match &behavior {
                    CompletionBehavior::Reply(text) => (
                        200,
                        serde_json::json!({
                            "id": "chatcmpl_stub",
                            "object": "chat.completion",
                            "model": parsed
                                .as_ref()
                                .and_then(|v| v.get("model").cloned())
                                .unwrap_or(Value::String("stub-model".to_owned())),
                            "choices": [
                                {
                                    "index": 0,
                                    "message": { "role": "assistant", "content": text },
                                    "finish_reason": "stop"
                                }
                            ]
                        }),
                    ),
                    CompletionBehavior::Fail { status, message } => (
                        *status,
                        serde_json::json!({ "error": { "message": message, "type": "stub_error" } }),
                    ),
                };

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(response_body.to_string())
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            hits,
            last_request,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Completion requests that carried a quiz prompt.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// JSON body of the last completion request that carried a quiz prompt.
    #[allow(dead_code)]
    pub fn last_request(&self) -> Option<Value> {
        self.last_request.lock().expect("request mutex").clone()
    }
}

impl Drop for OpenAiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A well-formed quiz whose answers are always listed first.
#[allow(dead_code)]
pub fn sample_quiz_json() -> String {
    serde_json::json!({
        "quiz": [
            {
                "question": "Who created Python?",
                "options": ["Guido van Rossum", "Dennis Ritchie", "Larry Wall", "Yukihiro Matsumoto"],
                "answer": "Guido van Rossum",
                "difficulty": "easy",
                "explanation": "Python was conceived by Guido van Rossum."
            },
            {
                "question": "Which release line ended support in 2020?",
                "options": ["Python 2", "Python 3", "Python 1", "Python 4"],
                "answer": "Python 2",
                "difficulty": "medium",
                "explanation": "Python 2 reached end of life in 2020."
            }
        ],
        "related_topics": ["CPython", "PyPI"],
        "key_entities": {
            "people": ["Guido van Rossum"],
            "organizations": ["Python Software Foundation"],
            "locations": ["Netherlands"]
        }
    })
    .to_string()
}
