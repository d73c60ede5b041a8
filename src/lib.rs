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

//! An async financial metrics client for the Convertfy admin dashboard.
//!
//! The dashboard displays revenue, customer, and campaign metrics sourced
//! from two third-party providers: [Asaas] for billing and [Klaviyo] for
//! email marketing. Both are reached through the Convertfy backend proxy so
//! that API keys never travel to the browser.
//!
//! The crate has two layers:
//!
//! * [`Client`] — a thin resource-oriented client for the proxy's endpoints:
//!   windowed payment listings, customer counts, marketing revenue timelines,
//!   and the proxy health check.
//! * [`MetricsService`] — the facade the dashboard calls. It resolves which
//!   API key to use (explicit key, then the user's stored integration
//!   credential, then an injected shared fallback), fetches payments and
//!   customer counts concurrently, and reduces them into one
//!   [`FinancialMetrics`] record. Fetch failures degrade to a fixed
//!   placeholder record flagged with [`FinancialMetrics::degraded`] rather
//!   than an error, so the dashboard always has something to render.
//!
//! Monetary amounts are [`rust_decimal::Decimal`] throughout; sums do not
//! accumulate binary floating point drift.
//!
//! [Asaas]: https://docs.asaas.com
//! [Klaviyo]: https://developers.klaviyo.com

#[warn(missing_debug_implementations, missing_docs)]
mod client;
mod config;
mod credentials;
mod error;
mod metrics;
mod serde;

pub use client::payments::{Payment, PaymentStatus, PaymentTotals};
pub use client::Client;
pub use config::{ClientBuilder, ClientConfig, DateWindow};
pub use credentials::{
    CredentialResolver, CredentialSource, CredentialStore, IntegrationCredential,
    IntegrationProvider, ResolvedCredential, StaticCredentialStore, StoreError,
};
pub use error::{ApiError, ApiErrorDetail, Error};
pub use metrics::{FinancialMetrics, MetricsService};
