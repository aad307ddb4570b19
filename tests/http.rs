use axum::{Json, Router, extract::State, routing::get};
use chrono::{Local, TimeZone};
use once_cell::sync::Lazy;
use reqwest::Client;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.post(format!("{base_url}/api/cache/clear")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_memo_heatmap"))
        .env("PORT", port.to_string())
        // Unroutable default so no test ever reaches a real memos instance.
        .env("HEATMAP_DEFAULT_DOMAIN", "http://127.0.0.1:9")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Stand-in for the remote memos API: serves a fixed record list and counts
/// how many times `/api/v1/memo` was hit.
struct StubApi {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

async fn memo_endpoint(
    State((hits, records)): State<(Arc<AtomicUsize>, Arc<Vec<serde_json::Value>>)>,
) -> Json<Vec<serde_json::Value>> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(records.as_ref().clone())
}

async fn spawn_stub_api(timestamps: Vec<i64>) -> StubApi {
    let records: Vec<serde_json::Value> = timestamps
        .into_iter()
        .map(|ts| serde_json::json!({ "createdTs": ts, "content": "memo" }))
        .collect();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/v1/memo", get(memo_endpoint))
        .with_state((Arc::clone(&hits), Arc::new(records)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub api");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubApi {
        base_url: format!("http://{addr}"),
        hits,
    }
}

fn ts(year: i32, month: u32, day: u32) -> i64 {
    Local
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid local datetime")
        .timestamp()
}

#[tokio::test]
async fn http_index_renders_year_blocks() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let stub = spawn_stub_api(vec![ts(2023, 3, 1), ts(2023, 3, 1), ts(2023, 3, 2)]).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/", server.base_url))
        .query(&[
            ("start_year", "2022"),
            ("end_year", "2023"),
            ("theme", "github"),
            ("domain", stub.base_url.as_str()),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body = response.text().await.unwrap();
    assert!(body.contains("2023: 3 条发布"));
    assert!(body.contains("2022: 0 条发布"));
    assert!(body.contains("日期: 2023-03-01"));
    assert!(body.contains("发布数: 2"));
    // Newest year renders first.
    let pos_2023 = body.find("2023: 3 条发布").unwrap();
    let pos_2022 = body.find("2022: 0 条发布").unwrap();
    assert!(pos_2023 < pos_2022);
}

#[tokio::test]
async fn http_repeat_fetch_hits_upstream_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let stub = spawn_stub_api(vec![ts(2023, 6, 15)]).await;
    let client = Client::new();

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let response = client
            .get(format!("{}/api/heatmap", server.base_url))
            .query(&[("year", "2023"), ("domain", stub.base_url.as_str())])
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        bodies.push(response.text().await.unwrap());
    }

    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
    assert_eq!(bodies[0], bodies[1]);
    assert!(bodies[0].contains("\"total_posts\":1"));
}

#[tokio::test]
async fn http_cache_clear_forces_a_refetch() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let stub = spawn_stub_api(vec![ts(2024, 1, 2)]).await;
    let client = Client::new();

    for _ in 0..2 {
        client
            .get(format!("{}/api/heatmap", server.base_url))
            .query(&[("year", "2024"), ("domain", stub.base_url.as_str())])
            .send()
            .await
            .unwrap();
    }
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);

    let cleared = client
        .post(format!("{}/api/cache/clear", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(cleared.status().is_success());

    client
        .get(format!("{}/api/heatmap", server.base_url))
        .query(&[("year", "2024"), ("domain", stub.base_url.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(stub.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn http_invalid_domain_is_rejected_before_any_fetch() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/", server.base_url))
        .query(&[("domain", "not-a-url")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body = response.text().await.unwrap();
    assert!(body.contains("有效的域名地址"));
}

#[tokio::test]
async fn http_unreachable_upstream_renders_an_empty_year() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    // Nothing listens on the default domain: the fetch fails, is swallowed,
    // and the year renders with zero posts instead of an error.
    let response = client
        .get(format!("{}/", server.base_url))
        .query(&[("start_year", "2021"), ("end_year", "2021")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body = response.text().await.unwrap();
    assert!(body.contains("2021: 0 条发布"));
}
