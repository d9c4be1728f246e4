use std::net::SocketAddr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use experiments::config::Config;
use experiments::server::serve;

pub static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(Config::default_test_config);

pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl ServerHandle {
    pub async fn for_config(config: Config) -> ServerHandle {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let notify = Arc::new(Notify::new());
        let shutdown = notify.clone();

        tokio::spawn(async move {
            serve(config, listener, async move { notify.notified().await }).await
        });
        ServerHandle { addr, shutdown }
    }

    pub async fn post_json<T: Into<reqwest::Body>>(
        &self,
        path: &str,
        body: T,
    ) -> reqwest::Response {
        self.post(path, body, "application/json").await
    }

    pub async fn post<T: Into<reqwest::Body>>(
        &self,
        path: &str,
        body: T,
        content_type: &str,
    ) -> reqwest::Response {
        let client = reqwest::Client::new();
        client
            .post(format!("http://{:?}{}", self.addr, path))
            .body(body)
            .header(CONTENT_TYPE, content_type)
            .send()
            .await
            .expect("failed to send request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(format!("http://{:?}{}", self.addr, path))
            .await
            .expect("failed to send request")
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.notify_one()
    }
}
