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

use std::time::Duration;

use reqwest::Url;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::client::Client;
use crate::config::{ClientConfig, DateWindow, DEFAULT_ENDPOINT};
use crate::credentials::{CredentialResolver, CredentialStore, IntegrationProvider};
use crate::error::Error;

// Placeholder values served while the billing API is unreachable. Chosen so
// the three buckets sum exactly to the monthly total.
const PLACEHOLDER_MONTHLY_REVENUE: Decimal = dec!(45200.00);
const PLACEHOLDER_RECEIVED_AMOUNT: Decimal = dec!(28450.00);
const PLACEHOLDER_PENDING_AMOUNT: Decimal = dec!(12300.00);
const PLACEHOLDER_OVERDUE_AMOUNT: Decimal = dec!(4450.00);
const PLACEHOLDER_TOTAL_CUSTOMERS: u64 = 128;

/// The financial metrics backing the admin dashboard, assembled fresh on
/// every [`MetricsService::financial_metrics`] invocation.
///
/// Serializes to the camelCase JSON shape the dashboard consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    /// The sum of all payment values due within the current calendar month,
    /// regardless of status.
    pub monthly_revenue: Decimal,
    /// The subset of `monthly_revenue` already received or confirmed.
    pub received_amount: Decimal,
    /// The subset of `monthly_revenue` still pending or under risk analysis.
    pub pending_amount: Decimal,
    /// The subset of `monthly_revenue` past due without payment.
    pub overdue_amount: Decimal,
    /// The number of customers registered with the billing provider, not
    /// scoped to the month.
    pub total_customers: u64,
    /// When the aggregation completed.
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
    /// Whether these are placeholder values served because the upstream API
    /// could not be reached. Presentation layers should surface this rather
    /// than render placeholder numbers as live ones.
    pub degraded: bool,
}

impl FinancialMetrics {
    /// The fixed placeholder record served when fetching fails.
    pub fn placeholder(last_update: OffsetDateTime) -> FinancialMetrics {
        FinancialMetrics {
            monthly_revenue: PLACEHOLDER_MONTHLY_REVENUE,
            received_amount: PLACEHOLDER_RECEIVED_AMOUNT,
            pending_amount: PLACEHOLDER_PENDING_AMOUNT,
            overdue_amount: PLACEHOLDER_OVERDUE_AMOUNT,
            total_customers: PLACEHOLDER_TOTAL_CUSTOMERS,
            last_update,
            degraded: true,
        }
    }
}

/// The facade the dashboard requests metrics through.
///
/// One invocation resolves a credential, issues the independent upstream
/// fetches concurrently, and assembles their results. The service is
/// stateless between invocations; a short-lived [`Client`] is built per
/// request around whichever credential resolved.
///
/// # Failure policy
///
/// [`Error::NotConfigured`] propagates so the dashboard can prompt for
/// integration settings. Every fetch-stage failure instead degrades to
/// [`FinancialMetrics::placeholder`], keeping the dashboard rendering at the
/// cost of showing synthetic numbers; the record's `degraded` flag tells the
/// two cases apart.
#[derive(Debug)]
pub struct MetricsService<S> {
    resolver: CredentialResolver<S>,
    endpoint: Url,
    timeout: Duration,
}

impl<S: CredentialStore> MetricsService<S> {
    /// Creates a service reading per-user credentials from `store`.
    pub fn new(store: S) -> MetricsService<S> {
        MetricsService {
            resolver: CredentialResolver::new(store),
            endpoint: DEFAULT_ENDPOINT.clone(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the proxy endpoint. See [`ClientBuilder::with_endpoint`].
    ///
    /// [`ClientBuilder::with_endpoint`]: crate::ClientBuilder::with_endpoint
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the per-call deadline. See [`ClientBuilder::with_timeout`].
    ///
    /// [`ClientBuilder::with_timeout`]: crate::ClientBuilder::with_timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Injects the shared fallback API key for `provider`.
    ///
    /// The value should come from the environment or a secrets store at
    /// process start; it is the last link of the resolution chain, behind
    /// explicit and per-user keys.
    pub fn with_fallback_api_key(
        mut self,
        provider: IntegrationProvider,
        api_key: impl Into<String>,
    ) -> Self {
        self.resolver = self.resolver.with_fallback_key(provider, api_key);
        self
    }

    fn client(&self, api_key: String) -> Client {
        Client::builder()
            .with_endpoint(self.endpoint.clone())
            .with_timeout(self.timeout)
            .build(ClientConfig { api_key })
    }

    /// Computes the financial metrics for the current calendar month.
    ///
    /// `explicit_key` short-circuits credential resolution; otherwise the
    /// authenticated user's stored billing credential is consulted, then the
    /// shared fallback key. Payment aggregation and customer counting run
    /// concurrently against the resolved credential.
    pub async fn financial_metrics(
        &self,
        explicit_key: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<FinancialMetrics, Error> {
        let credential = self
            .resolver
            .resolve(IntegrationProvider::Asaas, explicit_key, user_id)
            .await?;
        debug!(source = ?credential.source, "resolved billing credential");

        let client = self.client(credential.api_key);
        let window = DateWindow::current_month();
        match tokio::try_join!(
            client.aggregate_payments(&window),
            client.count_customers(),
        ) {
            Ok((totals, total_customers)) => Ok(FinancialMetrics {
                monthly_revenue: totals.monthly_revenue,
                received_amount: totals.received_amount,
                pending_amount: totals.pending_amount,
                overdue_amount: totals.overdue_amount,
                total_customers,
                last_update: OffsetDateTime::now_utc(),
                degraded: false,
            }),
            Err(error) => {
                warn!(%error, "metrics fetch failed; serving placeholder metrics");
                Ok(FinancialMetrics::placeholder(OffsetDateTime::now_utc()))
            }
        }
    }

    /// Sums the authenticated user's email marketing revenue over the
    /// trailing 30 days.
    ///
    /// The marketing provider has no shared fallback key and no placeholder
    /// fallback: an unconfigured integration is [`Error::NotConfigured`] and
    /// fetch failures propagate.
    pub async fn marketing_revenue(&self, user_id: &str) -> Result<Decimal, Error> {
        let credential = self
            .resolver
            .resolve(IntegrationProvider::Klaviyo, None, Some(user_id))
            .await?;
        let client = self.client(credential.api_key);
        client
            .marketing_revenue(&DateWindow::trailing_days(30))
            .await
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::FinancialMetrics;

    #[test]
    fn placeholder_buckets_sum_to_monthly_revenue() {
        let metrics = FinancialMetrics::placeholder(datetime!(2025-06-01 12:00 UTC));
        assert!(metrics.degraded);
        assert_eq!(
            metrics.received_amount + metrics.pending_amount + metrics.overdue_amount,
            metrics.monthly_revenue,
        );
    }

    #[test]
    fn serializes_to_dashboard_shape() {
        let metrics = FinancialMetrics::placeholder(datetime!(2025-06-01 12:00 UTC));
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["monthlyRevenue"], "45200.00");
        assert_eq!(json["totalCustomers"], 128);
        assert_eq!(json["lastUpdate"], "2025-06-01T12:00:00Z");
        assert_eq!(json["degraded"], true);
    }
}
