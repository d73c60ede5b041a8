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
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::client::Client;
use crate::config::DateWindow;
use crate::error::Error;
use crate::serde::{lenient_decimal, lenient_records};

const MARKETING_REVENUE_PATH: [&str; 1] = ["klaviyo-revenue"];

#[derive(Debug, Deserialize)]
struct RevenueTimeline {
    #[serde(default, deserialize_with = "lenient_records")]
    data: Vec<RevenueSample>,
}

#[derive(Debug, Deserialize)]
struct RevenueSample {
    #[serde(default, deserialize_with = "lenient_decimal")]
    value: Decimal,
}

impl Client {
    /// Sums the email marketing revenue attributed within `window`.
    ///
    /// The proxy's marketing route reads the credential from the query string
    /// rather than a header, so the key is attached both ways. A response
    /// without the expected timeline shape sums to zero.
    pub async fn marketing_revenue(&self, window: &DateWindow) -> Result<Decimal, Error> {
        let (start, end) = (window.start_iso(), window.end_iso());
        let req = self.build_request(Method::GET, MARKETING_REVENUE_PATH);
        let req = req.query(&[
            ("api_key", self.api_key.as_str()),
            ("start_date", start.as_str()),
            ("end_date", end.as_str()),
        ]);
        let res: RevenueTimeline = self.send_request(req).await?;
        Ok(res.data.into_iter().map(|sample| sample.value).sum())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::RevenueTimeline;

    fn total(json: &str) -> Decimal {
        let timeline: RevenueTimeline = serde_json::from_str(json).unwrap();
        timeline.data.into_iter().map(|s| s.value).sum()
    }

    #[test]
    fn timeline_values_sum() {
        assert_eq!(
            total(r#"{"data": [{"value": "10.50"}, {"value": 2.5}, {"value": "bad"}]}"#),
            dec!(13.00),
        );
    }

    #[test]
    fn unexpected_timeline_shape_sums_to_zero() {
        assert_eq!(total(r#"{}"#), Decimal::ZERO);
        assert_eq!(total(r#"{"data": {"unexpected": true}}"#), Decimal::ZERO);
    }
}
