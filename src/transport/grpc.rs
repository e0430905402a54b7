use std::convert::Infallible;
use std::future::Future;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::body::BoxBody;
use tonic::codegen::http::{Request, Response};
use tonic::server::NamedService;
use tonic::transport::server::Router;
use tonic::transport::Server;
use tower::Service;

use super::{TlsMaterial, TlsPaths, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    Insecure,
    MutualTls,
}

/// A gRPC server with its service registered, ready to serve.
pub struct GrpcServer {
    router: Router,
    security: Security,
    service_name: &'static str,
}

impl GrpcServer {
    /// Build a server for `service`.
    ///
    /// No paths gives a plaintext server. All three paths give a server that
    /// requires client certificates signed by the CA bundle.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if any supplied file cannot be read, does not
    /// parse, or is rejected when building the TLS acceptor.
    pub fn new<S>(tls: &TlsPaths, service: S) -> Result<Self, TransportError>
    where
        S: Service<Request<BoxBody>, Response = Response<BoxBody>, Error = Infallible>
            + NamedService
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        let mut builder = Server::builder();

        let security = match TlsMaterial::load(tls)? {
            Some(material) => {
                builder = builder
                    .tls_config(material.server_config())
                    .map_err(TransportError::Tls)?;
                Security::MutualTls
            }
            None => Security::Insecure,
        };

        let router = builder.add_service(service);
        tracing::info!(service = S::NAME, security = ?security, "gRPC server configured");

        Ok(Self {
            router,
            security,
            service_name: S::NAME,
        })
    }

    #[must_use]
    pub fn security(&self) -> Security {
        self.security
    }

    #[must_use]
    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    /// Serve connections accepted on `listener` until `signal` resolves.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Serve` if the server fails while running.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), TransportError>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, service = self.service_name, "Starting gRPC server");
        }

        self.router
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
            .await
            .map_err(TransportError::Serve)
    }
}
