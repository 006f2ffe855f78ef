use crate::error::{Error, Result};
use serde::Deserialize;
use std::{
    env,
    fmt::{Display, Formatter},
};

/// Per-issuer configuration for the solver, decoded from the opaque JSON
/// blob the host attaches to each challenge.
///
/// All fields are optional: a challenge without configuration decodes to the
/// all-empty default. Credentials never appear here directly, only a
/// reference to a secret holding them.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverConfig {
    /// Base URL of the CloudDNS API, overriding the production default
    pub api_url: String,
    /// Name of the secret holding the API token
    pub secret_ref: String,
    /// Namespace the secret lives in
    pub secret_ref_namespace: String,
    /// Key within the secret's data holding the token
    pub secret_key: String,
}

impl SolverConfig {
    /// Decode the configuration from a challenge's raw `config` payload.
    ///
    /// A missing payload is a valid, common case and yields the default
    /// configuration without error. Unknown fields are ignored; malformed
    /// JSON or mismatched field types fail with [`Error::Decode`].
    pub fn decode(raw: Option<&serde_json::Value>) -> Result<SolverConfig> {
        match raw {
            None => Ok(SolverConfig::default()),
            Some(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }
}

/// The API group this solver is registered under with the host webhook
/// framework.
///
/// Read once at startup; the hosting binary is expected to abort when the
/// variable is absent. Passed explicitly into bootstrap rather than kept as
/// a process-wide global.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupName(String);

impl GroupName {
    /// Read the group name from the `GROUP_NAME` environment variable
    pub fn from_env() -> Result<GroupName> {
        match env::var("GROUP_NAME") {
            Ok(name) if !name.trim().is_empty() => Ok(GroupName(name.trim().to_owned())),
            _ => Err(Error::MissingGroupName),
        }
    }

    /// The group name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GroupName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
