use crate::{
    api::{responses::RecordRequest, CloudDnsClient},
    config::SolverConfig,
    error::{Error, Result},
    secrets::SecretStore,
};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{info, warn};

/// TTL in seconds for challenge TXT records
const RECORD_TTL: u32 = 120;

/// A single DNS-01 challenge as delivered by the host framework.
///
/// Owned by the host and read-only here. `resolved_fqdn` and
/// `resolved_zone` follow the FQDN convention with a trailing dot.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Fully-qualified domain name the TXT record must exist at
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    /// DNS zone the record is managed under
    pub resolved_zone: String,
    /// Exact TXT value expected by the validation
    pub key: String,
    /// Opaque per-issuer configuration, decoded lazily
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// The provider-specific operations required from a DNS-01 webhook solver.
///
/// The host framework dispatches challenges to the solver whose [`name`]
/// matches the issuer's configuration. Challenges for different domains may
/// arrive concurrently, so implementations must be safe to call from
/// multiple tasks at once.
///
/// [`name`]: Solver::name
#[async_trait]
pub trait Solver: Send + Sync {
    /// The identifier used to select this solver among those registered
    /// under the same API group.
    fn name(&self) -> &'static str;

    /// Prepare the solver before any challenges are dispatched.
    ///
    /// Called exactly once when the webhook starts, with the cluster access
    /// configuration and a signal fired on process shutdown.
    async fn initialize(
        &self,
        client_config: kube::Config,
        stop: oneshot::Receiver<()>,
    ) -> Result<()>;

    /// Ensure the TXT record answering the challenge exists.
    ///
    /// Must tolerate being called multiple times with the same value; the
    /// host performs its own self-check before validation proceeds.
    async fn present(&self, challenge: &ChallengeRequest) -> Result<()>;

    /// Remove the TXT record created for the challenge.
    ///
    /// Only a record matching both the challenge name and its key value may
    /// be removed, so concurrent validations for the same domain are not
    /// disturbed.
    async fn cleanup(&self, challenge: &ChallengeRequest) -> Result<()>;
}

/// DNS-01 solver backed by Anexia CloudDNS.
#[derive(Debug, Default)]
pub struct AnexiaDns01Solver {
    store: OnceCell<SecretStore>,
    allow_anonymous: bool,
}

impl AnexiaDns01Solver {
    /// Create a new solver
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue with an empty bearer token when credential resolution fails.
    ///
    /// Off by default, so a failed lookup aborts the call with the lookup
    /// error. Enable only for deployments relying on anonymous API access;
    /// with the flag set the failure is logged and the provider will report
    /// the authentication error instead.
    pub fn allow_anonymous(mut self, allow: bool) -> Self {
        self.allow_anonymous = allow;
        self
    }

    fn store(&self) -> Result<&SecretStore> {
        self.store.get().ok_or(Error::NotInitialized)
    }

    async fn resolve_token(&self, config: &SolverConfig) -> Result<String> {
        match self.store()?.bearer_token(config).await {
            Ok(token) => Ok(token),
            Err(error) if self.allow_anonymous => {
                warn!(%error, "credential resolution failed, continuing without a token");
                Ok(String::new())
            }
            Err(error) => Err(error),
        }
    }

    /// Decode the challenge configuration and build an authenticated client
    async fn client_for(&self, challenge: &ChallengeRequest) -> Result<CloudDnsClient> {
        let config = SolverConfig::decode(challenge.config.as_ref())?;
        let token = self.resolve_token(&config).await?;

        CloudDnsClient::new(&config.api_url, token)
    }
}

#[async_trait]
impl Solver for AnexiaDns01Solver {
    fn name(&self) -> &'static str {
        "anexia"
    }

    async fn initialize(
        &self,
        client_config: kube::Config,
        _stop: oneshot::Receiver<()>,
    ) -> Result<()> {
        // The stop signal marks process shutdown only; in-flight calls are
        // not individually cancellable and nothing here outlives them.
        self.store
            .get_or_try_init(|| SecretStore::new(client_config))?;

        Ok(())
    }

    async fn present(&self, challenge: &ChallengeRequest) -> Result<()> {
        let client = self.client_for(challenge).await?;

        let record = RecordRequest {
            name: challenge_host(&challenge.resolved_fqdn, &challenge.resolved_zone).to_owned(),
            type_: "TXT".to_owned(),
            rdata: challenge.key.clone(),
            ttl: RECORD_TTL,
        };

        let zone = un_fqdn(&challenge.resolved_zone);
        if let Err(source) = client.create_record(zone, &record).await {
            return Err(Error::RecordCreate {
                record,
                source: Box::new(source),
            });
        }

        info!(fqdn = %challenge.resolved_fqdn, "created challenge record");

        Ok(())
    }

    async fn cleanup(&self, challenge: &ChallengeRequest) -> Result<()> {
        let client = self.client_for(challenge).await?;

        let zone = un_fqdn(&challenge.resolved_zone);
        let host = challenge_host(&challenge.resolved_fqdn, &challenge.resolved_zone);

        for record in client.list_records(zone).await? {
            if record.name == host && record.rdata_unquoted() == challenge.key {
                client
                    .delete_record(zone, &record.identifier)
                    .await
                    .map_err(|source| Error::RecordDelete {
                        identifier: record.identifier.clone(),
                        source: Box::new(source),
                    })?;

                info!(fqdn = %challenge.resolved_fqdn, "deleted challenge record");
                return Ok(());
            }
        }

        Err(Error::RecordNotFound {
            fqdn: challenge.resolved_fqdn.clone(),
        })
    }
}

/// Strip the trailing-dot zone terminator from a fully-qualified name
fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Host part of the challenge FQDN relative to its zone
fn challenge_host<'a>(fqdn: &'a str, zone: &str) -> &'a str {
    un_fqdn(fqdn.strip_suffix(zone).unwrap_or(fqdn))
}
