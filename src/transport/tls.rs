use std::fs;
use std::path::{Path, PathBuf};

use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use tonic::transport::{Certificate, Identity, ServerTlsConfig};

use super::TransportError;

/// Optional locations of the CA bundle, server certificate and server key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsPaths {
    pub ca_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

impl TlsPaths {
    #[must_use]
    pub fn insecure() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mutual(
        ca_file: impl Into<PathBuf>,
        cert_file: impl Into<PathBuf>,
        key_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ca_file: Some(ca_file.into()),
            cert_file: Some(cert_file.into()),
            key_file: Some(key_file.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ca_file.is_none() && self.cert_file.is_none() && self.key_file.is_none()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ca_file.is_some() && self.cert_file.is_some() && self.key_file.is_some()
    }
}

/// PEM material that has been read from disk and parsed at least once.
pub struct TlsMaterial {
    ca_pem: Vec<u8>,
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
}

impl TlsMaterial {
    /// Read and validate every supplied path.
    ///
    /// Returns `Ok(None)` unless all three paths are supplied. Paths of a
    /// partial set are still validated.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` naming the first path that cannot be read or
    /// does not hold the expected PEM items.
    pub fn load(paths: &TlsPaths) -> Result<Option<Self>, TransportError> {
        let ca_pem = paths.ca_file.as_deref().map(load_certificates).transpose()?;
        let cert_pem = paths.cert_file.as_deref().map(load_certificates).transpose()?;
        let key_pem = paths.key_file.as_deref().map(load_private_key).transpose()?;

        match (ca_pem, cert_pem, key_pem) {
            (Some(ca_pem), Some(cert_pem), Some(key_pem)) => Ok(Some(Self {
                ca_pem,
                cert_pem,
                key_pem,
            })),
            (None, None, None) => Ok(None),
            (ca, cert, key) => {
                tracing::warn!(
                    ca_file = ca.is_some(),
                    cert_file = cert.is_some(),
                    key_file = key.is_some(),
                    "Incomplete TLS configuration; serving without TLS"
                );
                Ok(None)
            }
        }
    }

    /// Server identity plus a trust pool that client certificates must chain to.
    #[must_use]
    pub fn server_config(&self) -> ServerTlsConfig {
        ServerTlsConfig::new()
            .identity(Identity::from_pem(&self.cert_pem, &self.key_pem))
            .client_ca_root(Certificate::from_pem(&self.ca_pem))
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, TransportError> {
    fs::read(path).map_err(|source| TransportError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_certificates(path: &Path) -> Result<Vec<u8>, TransportError> {
    let pem = read_pem(path)?;
    let certs = CertificateDer::pem_slice_iter(&pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TransportError::InvalidPem {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if certs.is_empty() {
        return Err(TransportError::NoCertificates {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(path = %path.display(), count = certs.len(), "Loaded certificates");
    Ok(pem)
}

fn load_private_key(path: &Path) -> Result<Vec<u8>, TransportError> {
    let pem = read_pem(path)?;
    PrivateKeyDer::from_pem_slice(&pem).map_err(|e| TransportError::InvalidPem {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(pem)
}
