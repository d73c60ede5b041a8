// Copyright Materialize, Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository, or online at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

/// The error type a [`CredentialStore`] may fail with.
///
/// Store failures never abort credential resolution; the resolver logs them
/// and falls through to the shared fallback key.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A third-party integration whose credential can be stored per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationProvider {
    /// The Asaas billing platform.
    Asaas,
    /// The Klaviyo email marketing platform.
    Klaviyo,
}

impl IntegrationProvider {
    /// The provider's key under the `integrations` map of a user profile
    /// document.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationProvider::Asaas => "asaas",
            IntegrationProvider::Klaviyo => "klaviyo",
        }
    }
}

impl fmt::Display for IntegrationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's stored credential for one integration provider.
///
/// This mirrors the document shape written by the settings UI at
/// `integrations.<provider>` in the user profile store. Writing that document
/// is the settings UI's concern; this crate only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationCredential {
    /// The opaque bearer token for the provider's API.
    pub api_key: String,
    /// Whether the stored credential is active.
    pub enabled: bool,
}

/// Read access to per-user integration credentials.
///
/// Implementations wrap whatever user profile store the deployment uses. The
/// resolver treats a read error the same as an absent credential, so
/// implementations should not retry internally.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads one user's stored credential for `provider`, if any.
    async fn integration_credential(
        &self,
        user_id: &str,
        provider: IntegrationProvider,
    ) -> Result<Option<IntegrationCredential>, StoreError>;
}

/// An in-memory [`CredentialStore`].
///
/// Useful as a test double and for embedders whose credentials are fixed at
/// startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    credentials: HashMap<(String, IntegrationProvider), IntegrationCredential>,
}

impl StaticCredentialStore {
    /// Creates an empty store.
    pub fn new() -> StaticCredentialStore {
        StaticCredentialStore::default()
    }

    /// Stores `credential` for the given user and provider, replacing any
    /// previous entry.
    pub fn insert(
        &mut self,
        user_id: impl Into<String>,
        provider: IntegrationProvider,
        credential: IntegrationCredential,
    ) {
        self.credentials.insert((user_id.into(), provider), credential);
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn integration_credential(
        &self,
        user_id: &str,
        provider: IntegrationProvider,
    ) -> Result<Option<IntegrationCredential>, StoreError> {
        Ok(self
            .credentials
            .get(&(user_id.to_owned(), provider))
            .cloned())
    }
}

/// Which link of the resolution chain produced a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The caller supplied the key directly.
    Explicit,
    /// The key came from the user's stored integration credential.
    UserProfile,
    /// The key came from the injected shared fallback.
    SharedFallback,
}

/// A credential ready to authenticate an API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    /// The API key to attach to requests.
    pub api_key: String,
    /// Which link of the chain matched.
    pub source: CredentialSource,
}

/// Resolves which API key a metrics request should authenticate with.
///
/// Precedence is fixed: a non-empty explicit key wins outright; otherwise an
/// enabled, non-empty stored credential for the requesting user; otherwise
/// the shared fallback key injected for the provider, if any. When every link
/// misses, resolution fails with [`Error::NotConfigured`].
///
/// The shared fallback key is deliberately not compiled in anywhere: embedders
/// inject it at process start, typically from the environment or a secrets
/// store.
#[derive(Debug)]
pub struct CredentialResolver<S> {
    store: S,
    fallback_keys: HashMap<IntegrationProvider, String>,
}

impl<S: CredentialStore> CredentialResolver<S> {
    /// Creates a resolver backed by `store`, with no fallback keys.
    pub fn new(store: S) -> CredentialResolver<S> {
        CredentialResolver {
            store,
            fallback_keys: HashMap::new(),
        }
    }

    /// Injects the shared fallback key for `provider`.
    pub fn with_fallback_key(
        mut self,
        provider: IntegrationProvider,
        api_key: impl Into<String>,
    ) -> Self {
        self.fallback_keys.insert(provider, api_key.into());
        self
    }

    /// Resolves the credential for one request.
    ///
    /// Profile store read failures are logged and treated as "no per-user
    /// credential available": metrics are advisory, so a flaky store should
    /// downgrade a request to the shared key rather than fail it.
    pub async fn resolve(
        &self,
        provider: IntegrationProvider,
        explicit_key: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<ResolvedCredential, Error> {
        if let Some(key) = explicit_key.filter(|key| !key.is_empty()) {
            return Ok(ResolvedCredential {
                api_key: key.to_owned(),
                source: CredentialSource::Explicit,
            });
        }

        if let Some(user_id) = user_id {
            match self.store.integration_credential(user_id, provider).await {
                Ok(Some(credential)) if credential.enabled && !credential.api_key.is_empty() => {
                    return Ok(ResolvedCredential {
                        api_key: credential.api_key,
                        source: CredentialSource::UserProfile,
                    });
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(
                        user_id,
                        %provider,
                        %error,
                        "profile store read failed; falling through to shared credential",
                    );
                }
            }
        }

        match self.fallback_keys.get(&provider) {
            Some(key) => Ok(ResolvedCredential {
                api_key: key.clone(),
                source: CredentialSource::SharedFallback,
            }),
            None => Err(Error::NotConfigured { provider }),
        }
    }
}
