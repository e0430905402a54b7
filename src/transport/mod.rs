//! gRPC server bootstrap with optional mutual TLS.

mod grpc;
mod tls;

use std::path::PathBuf;

pub use grpc::{GrpcServer, Security};
pub use tls::{TlsMaterial, TlsPaths};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid PEM in {}: {reason}", .path.display())]
    InvalidPem { path: PathBuf, reason: String },

    #[error("No certificates found in {}", .path.display())]
    NoCertificates { path: PathBuf },

    #[error("TLS configuration rejected: {0}")]
    Tls(#[source] tonic::transport::Error),

    #[error("gRPC server error: {0}")]
    Serve(#[source] tonic::transport::Error),
}
