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

use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::client::Client;
use crate::error::Error;

const HEALTH_PATH: [&str; 1] = ["health"];

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: String,
}

impl Client {
    /// Reports whether the backend proxy is reachable and healthy.
    ///
    /// Best-effort: any transport or decoding failure reads as unhealthy
    /// rather than an error, so collaborators can gate on this before
    /// relying on the proxy.
    pub async fn check_proxy_health(&self) -> bool {
        let req = self.build_request(Method::GET, HEALTH_PATH);
        match self.send_request::<HealthResponse>(req).await {
            Ok(res) => res.status == "ok",
            Err(error) => {
                debug!(%error, "proxy health check failed");
                false
            }
        }
    }
}
