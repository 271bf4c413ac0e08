//! Classification of the PEM block found in a private key file

use pem::Pem;

/// RFC 1421 header marking a traditional key pair block as encrypted
const PROC_TYPE: &str = "Proc-Type";

/// The algorithm of a traditional (pre PKCS#8) key pair block
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KeyPairKind {
    Rsa,
    Ec,
    Dsa,
}

impl KeyPairKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Dsa => "DSA",
        }
    }
}

/// A decoded PEM block from a key file. Only the first two shapes
/// carry private key material that can be loaded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PemObject {
    /// Combined public/private key pair in its algorithm specific
    /// encoding (PKCS#1 for RSA)
    KeyPair(KeyPairKind, Vec<u8>),
    /// Bare PKCS#8 PrivateKeyInfo
    PrivateKeyInfo(Vec<u8>),
    /// Any other block, holding its label
    Unrecognized(String),
}

impl From<Pem> for PemObject {
    fn from(pem: Pem) -> Self {
        let kind = match pem.tag() {
            "PRIVATE KEY" => None,
            "RSA PRIVATE KEY" => Some(KeyPairKind::Rsa),
            "EC PRIVATE KEY" => Some(KeyPairKind::Ec),
            "DSA PRIVATE KEY" => Some(KeyPairKind::Dsa),
            other => return Self::Unrecognized(other.to_string()),
        };
        let encrypted = pem
            .headers()
            .get(PROC_TYPE)
            .map_or(false, |value| value.contains("ENCRYPTED"));
        if encrypted {
            return Self::Unrecognized(format!("ENCRYPTED {}", pem.tag()));
        }
        let contents = pem.into_contents();
        match kind {
            Some(kind) => Self::KeyPair(kind, contents),
            None => Self::PrivateKeyInfo(contents),
        }
    }
}
