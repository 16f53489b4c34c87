//! Spawns the real router on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use polarity::analyzer::{AnalyzerConfig, SentimentAnalyzer};
use polarity::constants::DEFAULT_MAX_UPLOAD_BYTES;
use polarity::gateway::{HandlerState, create_router_with_state};
use polarity::model::{LexiconModel, SentimentModel};
use polarity::session::SessionStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestServerConfig {
    pub model: Arc<dyn SentimentModel>,
    pub analyzer: AnalyzerConfig,
    pub session_capacity: u64,
    pub session_ttl: Duration,
    pub max_upload_bytes: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            model: Arc::new(LexiconModel::new()),
            analyzer: AnalyzerConfig::default(),
            session_capacity: 100,
            session_ttl: Duration::from_secs(60),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    sessions: SessionStore,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
    let analyzer = Arc::new(SentimentAnalyzer::new(config.model, config.analyzer)?);
    let sessions = SessionStore::new(config.session_capacity, config.session_ttl);
    let state = HandlerState::new(analyzer, sessions.clone())
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        addr,
        sessions,
        handle,
    })
}
