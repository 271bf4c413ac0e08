//! Loads an X.509 certificate together with its RSA private key from
//! PEM files and binds the two into a single immutable [`CertKeyPair`].

pub mod cert_key;
pub mod error;
pub mod object;

pub use cert_key::CertKeyPair;
pub use error::{CertificateError, Error, ErrorKind, KeyError, Result};

pub use rsa;
pub use x509_cert;
