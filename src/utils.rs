use hudsucker::{
    certificate_authority::RcgenAuthority,
    rustls,
    self
};
use rcgen::{
    BasicConstraints,
    Certificate,
    CertificateParams,
    DistinguishedName,
    DnType,
    IsCa,
    KeyUsagePurpose
};
use std::{
    fmt,
    io,
    net::AddrParseError,
    num::ParseIntError
};

use crate::intercept::ResourceId;

#[derive(Debug)]
pub(crate) enum HoldupError {
    IOError(String),
    ConfigError(String),
    ScopeError(String),
    CertificateError(String),
    HudSuckerError(String),
    LoggerError(String),
    ExchangeGone(ResourceId),
    EditsDiscarded(ResourceId),
}

impl From<io::Error> for HoldupError {
    fn from(e: io::Error) -> Self { Self::IOError(e.to_string()) }
}

impl From<serde_yaml::Error> for HoldupError {
    fn from(e: serde_yaml::Error) -> Self { Self::ConfigError(e.to_string()) }
}

impl From<AddrParseError> for HoldupError {
    fn from(e: AddrParseError) -> Self { Self::ConfigError(e.to_string()) }
}

impl From<ParseIntError> for HoldupError {
    fn from(e: ParseIntError) -> Self { Self::ConfigError(e.to_string()) }
}

impl From<regex::Error> for HoldupError {
    fn from(e: regex::Error) -> Self { Self::ScopeError(e.to_string()) }
}

impl From<rcgen::RcgenError> for HoldupError {
    fn from(e: rcgen::RcgenError) -> Self { Self::CertificateError(e.to_string()) }
}

impl From<hudsucker::Error> for HoldupError {
    fn from(e: hudsucker::Error) -> Self { Self::HudSuckerError(e.to_string()) }
}

impl From<log::SetLoggerError> for HoldupError {
    fn from(e: log::SetLoggerError) -> Self { Self::LoggerError(e.to_string()) }
}

impl From<log4rs::config::runtime::ConfigErrors> for HoldupError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { Self::LoggerError(e.to_string()) }
}

impl fmt::Display for HoldupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HoldupError::IOError(s) => write!(f, "I/O error: {}", s),
            HoldupError::ConfigError(s) => write!(f, "Configuration error: {}", s),
            HoldupError::ScopeError(s) => write!(f, "Scope error: {}", s),
            HoldupError::CertificateError(s) => write!(f, "Certificate error: {}", s),
            HoldupError::HudSuckerError(s) => write!(f, "Proxy error: {}", s),
            HoldupError::LoggerError(s) => write!(f, "Logger error: {}", s),
            HoldupError::ExchangeGone(id) => write!(f, "Exchange {} is no longer held by the proxy", id),
            HoldupError::EditsDiscarded(id) => write!(f, "Forwarded {} unchanged: edits cannot be applied to an in-flight request", id),
        }
    }
}

impl std::error::Error for HoldupError {}

// ---------------------------------------------------------------------------------------------- //

/// hudsucker will not build a proxy without an authority, even though every CONNECT
/// tunnel is relayed as-is. The authority lives in memory for the process lifetime only.
pub(crate) fn make_ephemeral_authority() -> Result<RcgenAuthority, HoldupError> {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, "holdup ephemeral CA");
    dn.push(DnType::OrganizationName, "holdup");
    params.distinguished_name = dn;
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign
    ];

    let cert = Certificate::from_params(params)?;
    let private_key = rustls::PrivateKey(cert.serialize_private_key_der());
    let ca_cert = rustls::Certificate(cert.serialize_der()?);

    let authority = RcgenAuthority::new(private_key, ca_cert, 1_000)?;
    Ok(authority)
}
