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
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

use crate::client::Client;
use crate::config::DateWindow;
use crate::error::Error;
use crate::serde::{lenient_decimal, lenient_records};

const PAYMENTS_PATH: [&str; 1] = ["payments"];

/// A payment record as returned by the billing API.
///
/// Records are ephemeral: they exist for the duration of one aggregation pass
/// and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Payment {
    /// The monetary amount. The API sends a decimal-as-string; an
    /// unparseable amount decodes as zero so that one bad record cannot
    /// abort a batch.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub value: Decimal,
    /// The payment's lifecycle state at fetch time.
    #[serde(default)]
    pub status: PaymentStatus,
}

/// A payment lifecycle state.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize_enum_str, Serialize_enum_str)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment received.
    Received,
    /// Payment confirmed but not yet settled.
    Confirmed,
    /// Awaiting payment.
    Pending,
    /// Held for risk analysis.
    AwaitingRiskAnalysis,
    /// Past its due date without payment.
    Overdue,
    /// Any other status.
    #[serde(other)]
    Other(String),
}

impl Default for PaymentStatus {
    fn default() -> PaymentStatus {
        PaymentStatus::Other(String::new())
    }
}

#[derive(Debug, Deserialize)]
struct PaymentPage {
    #[serde(default, deserialize_with = "lenient_records")]
    data: Vec<Payment>,
}

/// Categorized payment sums over one aggregation window.
///
/// Every payment contributes its value to `monthly_revenue`; payments with a
/// recognized status additionally contribute to exactly one of the three
/// settlement buckets. Unrecognized statuses stay out of every bucket, since
/// they cannot be presumed settled, so
/// `received_amount + pending_amount + overdue_amount <= monthly_revenue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentTotals {
    /// The sum of all payment values in the window, regardless of status.
    pub monthly_revenue: Decimal,
    /// The subset with status `RECEIVED` or `CONFIRMED`.
    pub received_amount: Decimal,
    /// The subset with status `PENDING` or `AWAITING_RISK_ANALYSIS`.
    pub pending_amount: Decimal,
    /// The subset with status `OVERDUE`.
    pub overdue_amount: Decimal,
}

impl PaymentTotals {
    /// Reduces a batch of payments into categorized sums in a single pass.
    pub fn from_payments<I>(payments: I) -> PaymentTotals
    where
        I: IntoIterator<Item = Payment>,
    {
        let mut totals = PaymentTotals::default();
        for payment in payments {
            totals.monthly_revenue += payment.value;
            match payment.status {
                PaymentStatus::Received | PaymentStatus::Confirmed => {
                    totals.received_amount += payment.value;
                }
                PaymentStatus::Pending | PaymentStatus::AwaitingRiskAnalysis => {
                    totals.pending_amount += payment.value;
                }
                PaymentStatus::Overdue => {
                    totals.overdue_amount += payment.value;
                }
                PaymentStatus::Other(_) => {}
            }
        }
        totals
    }
}

impl Client {
    /// Lists the payments due within `window`.
    ///
    /// This is a single best-effort fetch: the listing is not paginated, and
    /// a response whose `data` field is missing or not a list yields an empty
    /// listing rather than an error.
    pub async fn list_payments(&self, window: &DateWindow) -> Result<Vec<Payment>, Error> {
        let req = self.build_request(Method::GET, PAYMENTS_PATH);
        let req = req.query(&[
            ("startDueDate", window.start_iso()),
            ("endDueDate", window.end_iso()),
        ]);
        let res: PaymentPage = self.send_request(req).await?;
        Ok(res.data)
    }

    /// Fetches the payments due within `window` and reduces them into
    /// categorized sums.
    pub async fn aggregate_payments(&self, window: &DateWindow) -> Result<PaymentTotals, Error> {
        let payments = self.list_payments(window).await?;
        Ok(PaymentTotals::from_payments(payments))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{Payment, PaymentPage, PaymentStatus, PaymentTotals};

    fn payment(value: Decimal, status: PaymentStatus) -> Payment {
        Payment { value, status }
    }

    #[test]
    fn statuses_map_to_buckets() {
        let totals = PaymentTotals::from_payments([
            payment(dec!(100.00), PaymentStatus::Received),
            payment(dec!(50.00), PaymentStatus::Pending),
            payment(dec!(25.00), PaymentStatus::Overdue),
            payment(dec!(10.00), PaymentStatus::Other("CANCELLED".into())),
        ]);
        assert_eq!(totals.monthly_revenue, dec!(185.00));
        assert_eq!(totals.received_amount, dec!(100.00));
        assert_eq!(totals.pending_amount, dec!(50.00));
        assert_eq!(totals.overdue_amount, dec!(25.00));
    }

    #[test]
    fn confirmed_and_risk_analysis_share_buckets() {
        let totals = PaymentTotals::from_payments([
            payment(dec!(10.00), PaymentStatus::Received),
            payment(dec!(20.00), PaymentStatus::Confirmed),
            payment(dec!(30.00), PaymentStatus::Pending),
            payment(dec!(40.00), PaymentStatus::AwaitingRiskAnalysis),
        ]);
        assert_eq!(totals.received_amount, dec!(30.00));
        assert_eq!(totals.pending_amount, dec!(70.00));
        assert_eq!(totals.overdue_amount, Decimal::ZERO);
    }

    #[test]
    fn empty_batch_sums_to_zero() {
        let totals = PaymentTotals::from_payments(Vec::new());
        assert_eq!(totals, PaymentTotals::default());
    }

    #[test]
    fn buckets_never_exceed_monthly_revenue() {
        let totals = PaymentTotals::from_payments([
            payment(dec!(1.10), PaymentStatus::Received),
            payment(dec!(2.20), PaymentStatus::Other("REFUND_REQUESTED".into())),
            payment(dec!(3.30), PaymentStatus::Overdue),
            payment(dec!(4.40), PaymentStatus::Other(String::new())),
        ]);
        let bucketed = totals.received_amount + totals.pending_amount + totals.overdue_amount;
        assert!(bucketed <= totals.monthly_revenue);
        assert_eq!(totals.monthly_revenue - bucketed, dec!(6.60));
    }

    #[test]
    fn bucket_sums_equal_revenue_when_all_statuses_are_recognized() {
        let totals = PaymentTotals::from_payments([
            payment(dec!(1.00), PaymentStatus::Received),
            payment(dec!(2.00), PaymentStatus::Confirmed),
            payment(dec!(3.00), PaymentStatus::Pending),
            payment(dec!(4.00), PaymentStatus::AwaitingRiskAnalysis),
            payment(dec!(5.00), PaymentStatus::Overdue),
        ]);
        assert_eq!(
            totals.received_amount + totals.pending_amount + totals.overdue_amount,
            totals.monthly_revenue,
        );
    }

    #[test]
    fn unparseable_value_contributes_zero_without_aborting_the_batch() {
        let page: PaymentPage = serde_json::from_str(
            r#"{"data": [
                {"value": "100.00", "status": "RECEIVED"},
                {"value": "not-a-number", "status": "RECEIVED"},
                {"value": "50.00", "status": "PENDING"}
            ]}"#,
        )
        .unwrap();
        let totals = PaymentTotals::from_payments(page.data);
        assert_eq!(totals.monthly_revenue, dec!(150.00));
        assert_eq!(totals.received_amount, dec!(100.00));
        assert_eq!(totals.pending_amount, dec!(50.00));
    }

    #[test]
    fn wire_statuses_decode_into_buckets() {
        let page: PaymentPage = serde_json::from_str(
            r#"{"data": [
                {"value": "100.00", "status": "RECEIVED"},
                {"value": "50.00", "status": "PENDING"},
                {"value": "25.00", "status": "OVERDUE"},
                {"value": "10.00", "status": "CANCELLED"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            page.data[3].status,
            PaymentStatus::Other("CANCELLED".into())
        );
        let totals = PaymentTotals::from_payments(page.data);
        assert_eq!(totals.monthly_revenue, dec!(185.00));
        assert_eq!(totals.received_amount, dec!(100.00));
        assert_eq!(totals.pending_amount, dec!(50.00));
        assert_eq!(totals.overdue_amount, dec!(25.00));
    }

    #[test]
    fn missing_data_field_sums_to_zero() {
        let page: PaymentPage = serde_json::from_str(r#"{"totalCount": 3}"#).unwrap();
        let totals = PaymentTotals::from_payments(page.data);
        assert_eq!(totals, PaymentTotals::default());
    }

    #[test]
    fn missing_status_stays_out_of_every_bucket() {
        let page: PaymentPage =
            serde_json::from_str(r#"{"data": [{"value": "5.00"}]}"#).unwrap();
        let totals = PaymentTotals::from_payments(page.data);
        assert_eq!(totals.monthly_revenue, dec!(5.00));
        assert_eq!(totals.received_amount, Decimal::ZERO);
    }
}
