//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gobl_html::config::ServiceConfig;
use gobl_html::lifecycle::{ServeError, Service};
use gobl_html::pdf::Convertor;
use gobl_html::pipeline::testing::{CountingRenderer, RecordingConvertor};
use gobl_html::pipeline::Pipeline;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const INVOICE: &str = include_str!("../fixtures/invoice.json");

/// A service running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestService {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub handle: JoinHandle<Result<(), ServeError>>,
    pub renderer: Arc<CountingRenderer>,
    pub convertor: Option<Arc<RecordingConvertor>>,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait until the fake convertor has picked up a request.
    #[allow(dead_code)]
    pub async fn conversion_started(&self) {
        let convertor = self.convertor.as_ref().expect("service has no convertor");
        tokio::time::timeout(Duration::from_secs(5), convertor.started())
            .await
            .expect("no conversion started within 5s");
    }
}

/// Default configuration bound to an ephemeral loopback port.
pub fn local_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config
}

/// Start the service with fake collaborators.
pub async fn start_service(
    convertor: Option<RecordingConvertor>,
    grace: Duration,
) -> TestService {
    start_service_with(local_config(), convertor, grace).await
}

/// Start the service with fake collaborators and a custom configuration.
pub async fn start_service_with(
    config: ServiceConfig,
    convertor: Option<RecordingConvertor>,
    grace: Duration,
) -> TestService {
    let renderer = Arc::new(CountingRenderer::default());
    let convertor = convertor.map(Arc::new);
    let pipeline = Pipeline::new(
        renderer.clone(),
        convertor.clone().map(|c| c as Arc<dyn Convertor>),
    );

    let service = Service::bind(config, Arc::new(pipeline))
        .await
        .unwrap()
        .with_shutdown_grace(grace);
    let addr = service.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(service.run(shutdown.clone()));

    TestService {
        addr,
        shutdown,
        handle,
        renderer,
        convertor,
    }
}

/// Client that never routes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
