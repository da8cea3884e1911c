use std::fs::File;
use std::io::{BufReader, Error as IoError};
use std::sync::Arc;

use cerc::HttpsOptions;
use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: IoError,
    },
    #[error("no certificate found in {0}")]
    NoCertificate(String),
    #[error("no private key found in {0}")]
    NoPrivateKey(String),
    #[error("TLS configuration error: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Build a rustls server configuration from the PEM files in `https`
pub fn server_config(https: &HttpsOptions) -> Result<ServerConfig, TlsError> {
    let certs = load_certs(&https.crt)?;
    let key = load_key(&https.key)?;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;

    Ok(config)
}

fn open(path: &str) -> Result<BufReader<File>, TlsError> {
    let file = File::open(path).map_err(|source| TlsError::Read { path: path.to_string(), source })?;
    Ok(BufReader::new(file))
}

fn load_certs(path: &str) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read { path: path.to_string(), source })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificate(path.to_string()));
    }
    Ok(certs)
}

fn load_key(path: &str) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|source| TlsError::Read { path: path.to_string(), source })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_string()))
}
