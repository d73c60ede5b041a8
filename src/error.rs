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

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::credentials::IntegrationProvider;

/// An error returned by a [`Client`] or [`MetricsService`].
///
/// Per-record decoding problems in upstream responses are not errors: they
/// degrade to zero contributions during aggregation instead (see
/// [`PaymentTotals`]).
///
/// [`Client`]: crate::Client
/// [`MetricsService`]: crate::MetricsService
/// [`PaymentTotals`]: crate::PaymentTotals
#[derive(Debug, Error)]
pub enum Error {
    /// An error in the underlying transport.
    #[error("error in the underlying transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// An error returned by the API.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// No usable credential exists for the provider: no explicit key was
    /// supplied, no enabled per-user credential is stored, and no shared
    /// fallback key is configured.
    ///
    /// Unlike fetch failures, this is surfaced to the caller so that the
    /// presentation layer can prompt the user to configure the integration.
    #[error("the {provider} integration is not configured")]
    NotConfigured {
        /// The provider whose credential could not be resolved.
        provider: IntegrationProvider,
    },
}

/// An error returned by the billing API.
///
/// For details, see: <https://docs.asaas.com/docs/error-responses>
#[derive(Debug, Clone, Error)]
#[error("API error {status_code}: {}", summarize(.errors))]
pub struct ApiError {
    /// The HTTP status code.
    pub status_code: StatusCode,
    /// The error details reported in the response body, if it could be
    /// decoded.
    pub errors: Vec<ApiErrorDetail>,
}

/// One entry of an API error response's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    /// A machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
    /// A human-readable description of the error.
    #[serde(default)]
    pub description: String,
}

fn summarize(errors: &[ApiErrorDetail]) -> String {
    if errors.is_empty() {
        "no detail provided".into()
    } else {
        errors
            .iter()
            .map(|e| e.description.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
