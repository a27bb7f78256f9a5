use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const ARTICLE_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Python (programming language) - Wikipedia</title></head>
  <body>
    <h1 id="firstHeading">Python (programming language)</h1>
    <div id="mw-content-text">
      <p>Short.</p>
      <p>Python is a high-level, general-purpose programming language. Its design philosophy emphasizes code readability.</p>
      <p>Guido van Rossum began working on Python in the late 1980s as a successor to the ABC programming language.</p>
      <h2><span class="mw-headline">History</span></h2>
      <h2><span class="mw-headline">Design philosophy and features</span></h2>
      <h2><span class="mw-headline">See also</span></h2>
      <h2><span class="mw-headline">References</span></h2>
    </div>
  </body>
</html>
"#;

/// Serves a fake wiki and counts requests that reached it.
pub struct WikiStub {
    base_url: String,
    hits: Arc<AtomicUsize>,
    last_user_agent: Arc<Mutex<Option<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl WikiStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start wiki stub server");
        let base_url = format!("http://{}", server.server_addr());
        let hits = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let last_user_agent = Arc::new(Mutex::new(None));

        let counter = Arc::clone(&hits);
        let user_agent = Arc::clone(&last_user_agent);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }
                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let ua = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("User-Agent"))
                    .map(|h| h.value.as_str().to_owned());
                *user_agent.lock().expect("user agent mutex") = ua;

                let path = request.url().to_string();
                let response = if path.starts_with("/wiki/Python_") {
                    tiny_http::Response::from_data(ARTICLE_HTML.as_bytes().to_vec())
                } else if path == "/wiki/Latin1" {
                    tiny_http::Response::from_data(b"<h1>Caf\xe9</h1>".to_vec())
                } else {
                    tiny_http::Response::from_data(b"no such article".to_vec())
                        .with_status_code(404)
                };
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            hits,
            last_user_agent,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[allow(dead_code)]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn last_user_agent(&self) -> Option<String> {
        self.last_user_agent.lock().expect("user agent mutex").clone()
    }
}

impl Drop for WikiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
