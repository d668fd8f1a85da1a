//! Mock ESO portal for tests, served with warp on an ephemeral port.
//!
//! The client under test is blocking, so the server runs on its own thread
//! with a dedicated tokio runtime.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use warp::http::{Method, StatusCode};
use warp::path::FullPath;
use warp::Filter;

/// A canned response.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Reply {
    pub(crate) fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub(crate) fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/csv",
            body: body.to_string(),
        }
    }
}

/// A request as received by the mock.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub(crate) method: String,
    /// Path plus raw query string
    pub(crate) path: String,
}

impl Recorded {
    /// Decoded value of a query string parameter.
    pub(crate) fn query_param(&self, name: &str) -> Option<String> {
        let url = url::Url::parse(&format!("http://mock{}", self.path)).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

#[derive(Default)]
struct State {
    replies: Vec<Reply>,
    requests: Vec<Recorded>,
}

impl State {
    /// Record a request and pick the reply for it.
    fn answer(&mut self, method: String, path: String) -> Reply {
        let index = self.requests.len();
        self.requests.push(Recorded { method, path });
        self.replies
            .get(index)
            .cloned()
            .unwrap_or_else(|| Reply::text(500, "no mock reply left"))
    }
}

/// Serves `replies` in order, one per request, on any path.
pub(crate) struct StubServer {
    port: u16,
    state: Arc<Mutex<State>>,
}

impl StubServer {
    pub(crate) fn start(replies: Vec<Reply>) -> Self {
        let state = Arc::new(Mutex::new(State {
            replies,
            requests: Vec::new(),
        }));

        let shared = Arc::clone(&state);
        let routes = warp::any()
            .and(warp::method())
            .and(warp::path::full())
            .and(
                warp::query::raw()
                    .or(warp::any().map(String::new))
                    .unify(),
            )
            .map(move |method: Method, path: FullPath, query: String| {
                let target = if query.is_empty() {
                    path.as_str().to_string()
                } else {
                    format!("{}?{}", path.as_str(), query)
                };
                let reply = shared
                    .lock()
                    .unwrap()
                    .answer(method.as_str().to_string(), target);
                let status =
                    StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                warp::reply::with_status(
                    warp::reply::with_header(reply.body, "content-type", reply.content_type),
                    status,
                )
            });

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
                tx.send(addr.port()).unwrap();
                server.await;
            });
        });

        let port = rx.recv().unwrap();
        Self { port, state }
    }

    /// Replace the reply for the `index`-th request.
    pub(crate) fn set_reply(&self, index: usize, reply: Reply) {
        self.state.lock().unwrap().replies[index] = reply;
    }

    /// `http://127.0.0.1:<port>`
    pub(crate) fn root_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Action API base under the mock.
    pub(crate) fn base_url(&self) -> String {
        format!("{}/api/3/action", self.root_url())
    }

    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_decoding() {
        let recorded = Recorded {
            method: "GET".to_string(),
            path: "/api/3/action/datastore_search_sql?sql=SELECT+*+FROM+%22abc%22".to_string(),
        };
        assert_eq!(recorded.method, "GET");
        assert_eq!(
            recorded.query_param("sql").as_deref(),
            Some("SELECT * FROM \"abc\"")
        );
        assert_eq!(recorded.query_param("missing"), None);
    }

    #[test]
    fn test_mock_serves_replies_in_order() {
        let server = StubServer::start(vec![
            Reply::json(200, r#"{"success": true}"#),
            Reply::text(404, "Not Found"),
        ]);
        let http = reqwest::blocking::Client::new();

        let first = http
            .get(format!("{}/resource_show?id=abc", server.base_url()))
            .send()
            .unwrap();
        assert_eq!(first.status().as_u16(), 200);
        assert_eq!(first.text().unwrap(), r#"{"success": true}"#);

        let second = http.get(format!("{}/gone.csv", server.root_url())).send().unwrap();
        assert_eq!(second.status().as_u16(), 404);

        let third = http.get(server.root_url()).send().unwrap();
        assert_eq!(third.status().as_u16(), 500);

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].path, "/api/3/action/resource_show?id=abc");
        assert_eq!(requests[1].path, "/gone.csv");
        assert_eq!(requests[1].method, "GET");
    }
}
