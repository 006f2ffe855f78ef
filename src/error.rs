use crate::api::responses::RecordRequest;
use reqwest::StatusCode;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
    string::FromUtf8Error,
};

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// The per-challenge solver configuration could not be decoded
    Decode(serde_json::Error),
    /// The credential secret could not be fetched from the cluster
    SecretLookup {
        name: String,
        namespace: String,
        source: kube::Error,
    },
    /// The credential secret fetch exceeded its deadline
    SecretLookupTimeout { name: String, namespace: String },
    /// The secret exists but does not contain the configured field
    SecretKeyMissing { secret: String, key: String },
    /// The secret field exists but is not valid UTF-8
    SecretNotUtf8 {
        secret: String,
        key: String,
        source: FromUtf8Error,
    },
    /// Failed constructing the HTTP client for the CloudDNS API
    ClientSetup(reqwest::Error),
    /// A network-level failure occurred while talking to the CloudDNS API
    Transport(reqwest::Error),
    /// The CloudDNS API rejected a request
    Api { status: StatusCode, message: String },
    /// Failed to create a record, carrying the attempted record for diagnostics
    RecordCreate {
        record: RecordRequest,
        source: Box<Error>,
    },
    /// Failed to delete a record by its provider identifier
    RecordDelete {
        identifier: String,
        source: Box<Error>,
    },
    /// CleanUp scanned the whole zone without finding a matching record
    RecordNotFound { fqdn: String },
    /// The secret store client could not be constructed during initialization
    Initialize(kube::Error),
    /// Present or CleanUp was called before Initialize
    NotInitialized,
    /// The `GROUP_NAME` environment variable is missing or empty
    MissingGroupName,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(_) => write!(f, "error decoding solver config"),
            Self::SecretLookup {
                name, namespace, ..
            } => write!(f, "unable to get secret {name} in namespace {namespace}"),
            Self::SecretLookupTimeout { name, namespace } => {
                write!(f, "timed out getting secret {name} in namespace {namespace}")
            }
            Self::SecretKeyMissing { secret, key } => {
                write!(f, "key {key} not found in data of secret {secret}")
            }
            Self::SecretNotUtf8 { secret, key, .. } => {
                write!(f, "key {key} in secret {secret} is not valid utf-8")
            }
            Self::ClientSetup(_) => write!(f, "unable to set up clouddns client"),
            Self::Transport(_) => {
                write!(f, "an error occurred while communicating with the clouddns api")
            }
            Self::Api { status, message } => {
                write!(f, "clouddns api returned {status}: {message}")
            }
            Self::RecordCreate { record, .. } => {
                write!(f, "unable to create record, request was {record:?}")
            }
            Self::RecordDelete { identifier, .. } => {
                write!(f, "unable to delete record {identifier}")
            }
            Self::RecordNotFound { fqdn } => {
                write!(f, "could not find and delete record for {fqdn}")
            }
            Self::Initialize(_) => write!(f, "unable to construct secret store client"),
            Self::NotInitialized => write!(f, "solver has not been initialized"),
            Self::MissingGroupName => write!(f, "GROUP_NAME must be specified"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::SecretLookup { source, .. } => Some(source),
            Self::SecretLookupTimeout { .. } => None,
            Self::SecretKeyMissing { .. } => None,
            Self::SecretNotUtf8 { source, .. } => Some(source),
            Self::ClientSetup(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Api { .. } => None,
            Self::RecordCreate { source, .. } => Some(source.as_ref()),
            Self::RecordDelete { source, .. } => Some(source.as_ref()),
            Self::RecordNotFound { .. } => None,
            Self::Initialize(e) => Some(e),
            Self::NotInitialized => None,
            Self::MissingGroupName => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}
