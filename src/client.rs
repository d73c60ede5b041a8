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

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::error::{ApiError, ApiErrorDetail};
use crate::{ClientBuilder, ClientConfig, Error};

pub mod customers;
pub mod health;
pub mod marketing;
pub mod payments;

/// An API client for the Convertfy metrics proxy.
///
/// The API client is designed to be wrapped in an [`Arc`] and used from
/// multiple threads simultaneously.
///
/// [`Arc`]: std::sync::Arc
#[derive(Debug)]
pub struct Client {
    pub(crate) inner: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) endpoint: Url,
}

impl Client {
    /// Creates a new `Client` from its required configuration parameters.
    pub fn new(config: ClientConfig) -> Client {
        ClientBuilder::default().build(config)
    }

    /// Creates a builder for a `Client` that allows for customization of
    /// optional parameters.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn build_request<P>(&self, method: Method, path: P) -> RequestBuilder
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .expect("builder validated URL can be a base")
            .extend(path);
        // The billing API authenticates via an `access_token` header rather
        // than a bearer token. The proxy forwards the header upstream.
        self.inner
            .request(method, url)
            .header("access_token", &self.api_key)
    }

    async fn send_request<T>(&self, req: RequestBuilder) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        #[derive(Deserialize)]
        struct ErrorResponse {
            #[serde(default)]
            errors: Vec<ApiErrorDetail>,
        }

        let res = req.send().await?;
        let status_code = res.status();
        if status_code.is_success() {
            Ok(res.json().await?)
        } else {
            let res_body = res.text().await?;
            let errors = match serde_json::from_str::<ErrorResponse>(&res_body) {
                Ok(e) => e.errors,
                Err(e) => {
                    warn!(error = %e, body = %res_body, "undecodable API error response");
                    vec![]
                }
            };
            Err(Error::Api(ApiError {
                status_code,
                errors,
            }))
        }
    }
}
