//! Binds a [`Router`] to the HTTP transport.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use micro_router_http::codec::DEFAULT_MAX_BODY_SIZE;
use micro_router_http::connection::HttpConnection;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::router::Router;

pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    max_body_size: u64,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: None, max_body_size: DEFAULT_MAX_BODY_SIZE }
    }

    #[must_use]
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Request bodies above this size are answered with `413 Payload Too Large`
    #[must_use]
    pub fn max_body_size(mut self, max_body_size: u64) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(ServerBuildError::InvalidAddress)?;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }

        Ok(Server { router: Arc::new(router), address, max_body_size: self.max_body_size })
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("router", &self.router)
            .field("address", &self.address)
            .field("max_body_size", &self.max_body_size)
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("address can't be resolved: {0}")]
    InvalidAddress(#[source] io::Error),
}

#[derive(Debug)]
pub struct Server {
    router: Arc<Router>,
    address: Vec<SocketAddr>,
    max_body_size: u64,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Installs a `tracing` subscriber, binds the address and serves until the process ends.
    ///
    /// A subscriber installed earlier is kept.
    pub async fn start(self) -> io::Result<()> {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            warn!("global tracing subscriber already set, keep it");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        self.serve(tcp_listener).await
    }

    /// Accepts connections from `tcp_listener` and serves each on its own task
    pub async fn serve(self, tcp_listener: TcpListener) -> io::Result<()> {
        loop {
            let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let router = Arc::clone(&self.router);
            let max_body_size = self.max_body_size;

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_max_body_size(reader, writer, max_body_size);
                match connection.process(router).await {
                    Ok(()) => {
                        info!("finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!("service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[test]
    fn build_requires_router_and_address() {
        let result = Server::builder().address("127.0.0.1:0").build();
        assert!(matches!(result, Err(ServerBuildError::MissingRouter)));

        let router = Router::builder().build().unwrap();
        let result = Server::builder().router(router).build();
        assert!(matches!(result, Err(ServerBuildError::MissingAddress)));
    }

    #[test]
    fn build_rejects_unresolvable_address() {
        let router = Router::builder().build().unwrap();
        let result = Server::builder().router(router).address("not an address").build();

        assert!(matches!(result, Err(ServerBuildError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn serve_over_tcp() {
        let router = Router::builder()
            .get("/hello/{name}", handlers![|ctx| {
                let greeting = format!("hello {}", ctx.param("name").unwrap_or("nobody"));
                ctx.send(greeting);
            }])
            .build()
            .unwrap();
        let server = Server::builder().router(router).address("127.0.0.1:0").build().unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(server.serve(listener));

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(b"GET /hello/alice HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").await.unwrap();

        let mut received = String::new();
        stream.read_to_string(&mut received).await.unwrap();

        assert!(received.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(received.contains("content-type: text/plain\r\n"));
        assert!(received.ends_with("\r\n\r\nhello alice"));
    }
}
