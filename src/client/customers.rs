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

use crate::client::Client;
use crate::error::Error;

const CUSTOMERS_PATH: [&str; 1] = ["customers"];

#[derive(Debug, Deserialize)]
struct CustomerPage {
    #[serde(default, rename = "totalCount")]
    total_count: Option<u64>,
}

impl Client {
    /// Counts the customers registered with the billing provider.
    ///
    /// Requests a single-element page purely to read the total count from the
    /// response envelope; the customer list itself is never materialized. An
    /// envelope without a `totalCount` field counts as zero.
    pub async fn count_customers(&self) -> Result<u64, Error> {
        let req = self.build_request(Method::GET, CUSTOMERS_PATH);
        let req = req.query(&[("limit", 1u32)]);
        let res: CustomerPage = self.send_request(req).await?;
        Ok(res.total_count.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::CustomerPage;

    #[test]
    fn missing_total_count_is_zero() {
        let page: CustomerPage = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(page.total_count.unwrap_or(0), 0);

        let page: CustomerPage = serde_json::from_str(r#"{"totalCount": 42}"#).unwrap();
        assert_eq!(page.total_count.unwrap_or(0), 42);
    }
}
