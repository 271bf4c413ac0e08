use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while loading a certificate and key pair. Every
/// variant names the file it came from when the input was read from
/// disk.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid X.509 certificate{}: {source}", origin(.path))]
    CertificateParse {
        path: Option<PathBuf>,
        #[source]
        source: CertificateError,
    },
    #[error("unsupported private key format{}: received {label}", origin(.path))]
    UnsupportedKeyFormat { path: Option<PathBuf>, label: String },
    #[error("invalid RSA private key{}: {source}", origin(.path))]
    KeyParse {
        path: Option<PathBuf>,
        #[source]
        source: KeyError,
    },
    #[error("failed to encode private key: {0}")]
    Encode(#[from] rsa::pkcs8::Error),
    #[error("failed to encode certificate: {0}")]
    CertificateEncode(#[source] der::Error),
}

/// Fieldless view of [`Error`] for callers that only need to branch
/// on the failing stage.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Io,
    CertificateParse,
    UnsupportedKeyFormat,
    KeyParse,
    Encode,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::CertificateParse { .. } => ErrorKind::CertificateParse,
            Self::UnsupportedKeyFormat { .. } => ErrorKind::UnsupportedKeyFormat,
            Self::KeyParse { .. } => ErrorKind::KeyParse,
            Self::Encode(_) | Self::CertificateEncode(_) => ErrorKind::Encode,
        }
    }

    /// The file the failing input was read from, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } => Some(path.as_path()),
            Self::CertificateParse { path, .. }
            | Self::UnsupportedKeyFormat { path, .. }
            | Self::KeyParse { path, .. } => path.as_deref(),
            Self::Encode(_) | Self::CertificateEncode(_) => None,
        }
    }
}

/// Reasons the certificate input could not be decoded
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error(transparent)]
    Pem(#[from] pem::PemError),
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error("expected a CERTIFICATE block, received {0}")]
    UnexpectedLabel(String),
}

/// Reasons the private key input could not be decoded
#[derive(Debug, Error)]
pub enum KeyError {
    #[error(transparent)]
    Pem(#[from] pem::PemError),
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error(transparent)]
    Pkcs8(#[from] rsa::pkcs8::Error),
    #[error("key algorithm {0} is not RSA")]
    NotRsa(String),
}

fn origin(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let err = Error::UnsupportedKeyFormat {
            path: Some(PathBuf::from("keys/agent.pem")),
            label: "CERTIFICATE REQUEST".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported private key format in keys/agent.pem: received CERTIFICATE REQUEST"
        );
        assert_eq!(err.kind(), ErrorKind::UnsupportedKeyFormat);
        assert_eq!(err.path(), Some(Path::new("keys/agent.pem")));
    }

    #[test]
    fn messages_without_path() {
        let err = Error::KeyParse {
            path: None,
            source: KeyError::NotRsa("EC".to_string()),
        };
        assert_eq!(err.to_string(), "invalid RSA private key: key algorithm EC is not RSA");
        assert_eq!(err.path(), None);
    }

    #[test]
    fn certificate_encode_is_not_pkcs8() {
        let err = Error::CertificateEncode(der::Error::from(der::ErrorKind::Overflow));
        assert!(err.to_string().starts_with("failed to encode certificate: "));
        assert!(!err.to_string().contains("PKCS#8"));
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_error_keeps_source() {
        let err = Error::Io {
            path: PathBuf::from("missing.pem"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("failed to read missing.pem"));
        let source = std::error::Error::source(&err).expect("io source");
        assert_eq!(source.to_string(), "not found");
    }
}
