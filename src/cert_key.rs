use crate::error::{CertificateError, Error, KeyError, Result};
use crate::object::{KeyPairKind, PemObject};
use der::{Decode, Encode};
use rsa::pkcs8::{DecodePublicKey, EncodePrivateKey, PrivateKeyInfo, SecretDocument};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;
use x509_cert::Certificate;

/// PEM label of an X.509 certificate block
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// First byte of a DER encoded certificate (constructed SEQUENCE).
/// Anything else is treated as PEM text.
const DER_SEQUENCE: u8 = 0x30;

/// An X.509 certificate bound to its RSA private key. Only created by
/// successfully loading both halves, never modified afterwards.
///
/// The key material is zeroized when the pair is dropped. Loading does
/// not check that the key belongs to the certificate, use
/// [`CertKeyPair::key_matches_certificate`] for that.
#[derive(Clone, Eq, PartialEq)]
pub struct CertKeyPair {
    certificate: Certificate,
    private_key: RsaPrivateKey,
}

impl CertKeyPair {
    /// Reads the certificate at `cert_path` and the private key at
    /// `key_path`. The certificate may be PEM or raw DER, the key must
    /// be a PEM `PRIVATE KEY` (PKCS#8) or `RSA PRIVATE KEY` (PKCS#1)
    /// block.
    pub fn from_paths<C, K>(cert_path: C, key_path: K) -> Result<Self>
    where
        C: AsRef<Path>,
        K: AsRef<Path>,
    {
        let cert_path = cert_path.as_ref();
        let key_path = key_path.as_ref();

        let certificate = parse_certificate(&read(cert_path)?, Some(cert_path))?;
        let private_key = parse_private_key(&read(key_path)?, Some(key_path))?;

        let pair = Self {
            certificate,
            private_key,
        };
        debug!(
            cert = %cert_path.display(),
            key = %key_path.display(),
            subject = %pair.subject(),
            "Loaded certificate and private key"
        );
        Ok(pair)
    }

    /// Same as [`CertKeyPair::from_paths`] for contents that are
    /// already in memory
    pub fn from_pem(cert: &[u8], key: &[u8]) -> Result<Self> {
        Ok(Self {
            certificate: parse_certificate(cert, None)?,
            private_key: parse_private_key(key, None)?,
        })
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Keys are always RSA
    pub fn key_algorithm(&self) -> &'static str {
        "RSA"
    }

    /// The certificate subject as an RFC 4514 string
    pub fn subject(&self) -> String {
        self.certificate.tbs_certificate.subject.to_string()
    }

    /// DER encoding of the certificate. This is byte for byte the
    /// certificate that was loaded.
    pub fn certificate_der(&self) -> Result<Vec<u8>> {
        self.certificate
            .to_der()
            .map_err(Error::CertificateEncode)
    }

    pub fn private_key_pkcs8_der(&self) -> Result<SecretDocument> {
        Ok(self.private_key.to_pkcs8_der()?)
    }

    /// Checks whether the public half of the private key is the public
    /// key of the certificate. Certificates carrying a non RSA key never
    /// match.
    pub fn key_matches_certificate(&self) -> Result<bool> {
        let spki = self
            .certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(Error::CertificateEncode)?;

        Ok(match RsaPublicKey::from_public_key_der(&spki) {
            Ok(public_key) => public_key == self.private_key.to_public_key(),
            Err(_) => false,
        })
    }

    pub fn into_parts(self) -> (Certificate, RsaPrivateKey) {
        (self.certificate, self.private_key)
    }
}

impl fmt::Debug for CertKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertKeyPair")
            .field("subject", &self.subject())
            .field("key_bits", &(self.private_key.size() * 8))
            .finish_non_exhaustive()
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_certificate(data: &[u8], path: Option<&Path>) -> Result<Certificate> {
    decode_certificate(data).map_err(|source| Error::CertificateParse {
        path: path.map(Path::to_path_buf),
        source,
    })
}

fn decode_certificate(data: &[u8]) -> Result<Certificate, CertificateError> {
    if data.first() == Some(&DER_SEQUENCE) {
        return Ok(Certificate::from_der(data)?);
    }

    let pem = pem::parse(data)?;
    if pem.tag() != CERTIFICATE_LABEL {
        return Err(CertificateError::UnexpectedLabel(pem.tag().to_string()));
    }
    Ok(Certificate::from_der(pem.contents())?)
}

fn parse_private_key(data: &[u8], path: Option<&Path>) -> Result<RsaPrivateKey> {
    let key_parse = move |source: KeyError| Error::KeyParse {
        path: path.map(Path::to_path_buf),
        source,
    };

    let pem = pem::parse(data).map_err(|err| key_parse(err.into()))?;
    let pkcs8_der = match PemObject::from(pem) {
        PemObject::PrivateKeyInfo(der) => der,
        PemObject::KeyPair(KeyPairKind::Rsa, pkcs1_der) => {
            wrap_pkcs1(&pkcs1_der).map_err(|err| key_parse(err.into()))?
        }
        PemObject::KeyPair(kind, _) => {
            return Err(key_parse(KeyError::NotRsa(kind.name().to_string())));
        }
        PemObject::Unrecognized(label) => {
            return Err(Error::UnsupportedKeyFormat {
                path: path.map(Path::to_path_buf),
                label,
            });
        }
    };

    decode_rsa_key(&pkcs8_der).map_err(key_parse)
}

/// Wraps a PKCS#1 RSAPrivateKey in a PKCS#8 PrivateKeyInfo with the
/// rsaEncryption algorithm identifier
fn wrap_pkcs1(pkcs1_der: &[u8]) -> der::Result<Vec<u8>> {
    PrivateKeyInfo::new(pkcs1::ALGORITHM_ID, pkcs1_der).to_der()
}

fn decode_rsa_key(pkcs8_der: &[u8]) -> Result<RsaPrivateKey, KeyError> {
    let info = PrivateKeyInfo::try_from(pkcs8_der)?;
    if info.algorithm.oid != pkcs1::ALGORITHM_OID {
        return Err(KeyError::NotRsa(info.algorithm.oid.to_string()));
    }
    Ok(RsaPrivateKey::try_from(info)?)
}
