use crate::{
    config::SolverConfig,
    error::{Error, Result},
};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};
use tokio::time::timeout;
use tracing::debug;

/// Timeout applied to every secret lookup
const TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only access to the cluster secrets holding provider credentials.
///
/// Constructed once during solver initialization and shared across
/// concurrent challenge invocations; never mutated afterwards.
#[derive(Clone)]
pub struct SecretStore {
    client: Client,
}

impl SecretStore {
    /// Build the store from the access configuration supplied by the host
    pub fn new(config: kube::Config) -> Result<SecretStore> {
        let client = Client::try_from(config).map_err(Error::Initialize)?;

        Ok(SecretStore { client })
    }

    /// Resolve the bearer token referenced by a challenge's configuration.
    ///
    /// Issues a single bounded lookup for the named secret and extracts the
    /// configured key as a UTF-8 string. There is no retry: a failed lookup
    /// fails the surrounding operation. The token value is never logged.
    pub async fn bearer_token(&self, config: &SolverConfig) -> Result<String> {
        let name = &config.secret_ref;
        let namespace = &config.secret_ref_namespace;

        debug!(secret = %name, %namespace, "fetching credential secret");

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = timeout(TIMEOUT, secrets.get(name))
            .await
            .map_err(|_| Error::SecretLookupTimeout {
                name: name.clone(),
                namespace: namespace.clone(),
            })?
            .map_err(|source| Error::SecretLookup {
                name: name.clone(),
                namespace: namespace.clone(),
                source,
            })?;

        let data = secret.data.unwrap_or_default();
        let value = data
            .get(&config.secret_key)
            .ok_or_else(|| Error::SecretKeyMissing {
                secret: name.clone(),
                key: config.secret_key.clone(),
            })?;

        let token = String::from_utf8(value.0.clone()).map_err(|source| Error::SecretNotUtf8 {
            secret: name.clone(),
            key: config.secret_key.clone(),
            source,
        })?;

        debug!(length = token.len(), "credential resolved");

        Ok(token)
    }
}

impl Debug for SecretStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // `kube::Client` has no Debug representation worth showing
        f.debug_struct("SecretStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::SecretStore;
    use crate::{config::SolverConfig, error::Error};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const SECRET_PATH: &str = "/api/v1/namespaces/cert-manager/secrets/clouddns-token";

    fn store(server: &MockServer) -> SecretStore {
        let config = kube::Config::new(server.uri().parse().unwrap());
        SecretStore::new(config).unwrap()
    }

    fn config() -> SolverConfig {
        SolverConfig {
            api_url: String::new(),
            secret_ref: "clouddns-token".into(),
            secret_ref_namespace: "cert-manager".into(),
            secret_key: "token".into(),
        }
    }

    fn secret_body(data: serde_json::Value) -> serde_json::Value {
        json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": { "name": "clouddns-token", "namespace": "cert-manager" },
            "data": data,
        })
    }

    #[tokio::test]
    async fn resolves_token_from_secret() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SECRET_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(secret_body(json!({
                "token": STANDARD.encode("super-secret"),
            }))))
            .mount(&server)
            .await;

        let token = store(&server).bearer_token(&config()).await.unwrap();
        assert_eq!(token, "super-secret");
    }

    #[tokio::test]
    async fn missing_secret_fails_naming_the_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SECRET_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "message": "secrets \"clouddns-token\" not found",
                "reason": "NotFound",
                "code": 404,
            })))
            .mount(&server)
            .await;

        let error = store(&server).bearer_token(&config()).await.unwrap_err();
        match error {
            Error::SecretLookup {
                name, namespace, ..
            } => {
                assert_eq!(name, "clouddns-token");
                assert_eq!(namespace, "cert-manager");
            }
            other => panic!("expected SecretLookup error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_naming_the_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SECRET_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(secret_body(json!({
                "unrelated": STANDARD.encode("nope"),
            }))))
            .mount(&server)
            .await;

        let error = store(&server).bearer_token(&config()).await.unwrap_err();
        match error {
            Error::SecretKeyMissing { secret, key } => {
                assert_eq!(secret, "clouddns-token");
                assert_eq!(key, "token");
            }
            other => panic!("expected SecretKeyMissing error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_utf8_value_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SECRET_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(secret_body(json!({
                "token": STANDARD.encode([0xff, 0xfe, 0xfd]),
            }))))
            .mount(&server)
            .await;

        let error = store(&server).bearer_token(&config()).await.unwrap_err();
        assert!(matches!(error, Error::SecretNotUtf8 { .. }));
    }
}
