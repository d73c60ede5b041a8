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

use once_cell::sync::Lazy;
use reqwest::Url;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::util::days_in_year_month;
use time::{Date, OffsetDateTime};

use crate::client::Client;

pub static DEFAULT_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    "https://maio-convertfy-production.up.railway.app"
        .parse()
        .expect("url known to be valid")
});

/// The date encoding used in query parameters, e.g. `2025-03-01`.
const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Configures the required parameters of a [`Client`].
pub struct ClientConfig {
    /// The API key to authenticate with.
    pub api_key: String,
}

/// A builder for a [`Client`].
pub struct ClientBuilder {
    endpoint: Url,
    timeout: Duration,
}

impl Default for ClientBuilder {
    fn default() -> ClientBuilder {
        ClientBuilder {
            endpoint: DEFAULT_ENDPOINT.clone(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClientBuilder {
    /// Sets the endpoint.
    ///
    /// The default endpoint is the hosted backend proxy, which keeps API keys
    /// out of browser contexts. Server-side embedders that hold their own key
    /// may point this directly at the upstream API.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the deadline applied to each API call.
    ///
    /// Every call is attempted exactly once; the timeout bounds how long that
    /// one attempt may take. The default is 60 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates a [`Client`] that incorporates the optional parameters
    /// configured on the builder and the specified required parameters.
    pub fn build(self, config: ClientConfig) -> Client {
        let client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(self.timeout)
            .build()
            .unwrap();
        Client {
            inner: client,
            api_key: config.api_key,
            endpoint: self.endpoint,
        }
    }
}

/// An inclusive range of due dates for a list or aggregation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub(crate) start: Date,
    pub(crate) end: Date,
}

impl DateWindow {
    /// Creates a window spanning `start` through `end`, inclusive.
    pub fn new(start: Date, end: Date) -> DateWindow {
        DateWindow { start, end }
    }

    /// The window spanning the calendar month containing `date`, from its
    /// first day through its last.
    pub fn calendar_month_of(date: Date) -> DateWindow {
        let start = date.replace_day(1).expect("every month has a first day");
        let end = date
            .replace_day(days_in_year_month(date.year(), date.month()))
            .expect("last day is valid for its month");
        DateWindow { start, end }
    }

    /// The window spanning the current calendar month, in UTC.
    pub fn current_month() -> DateWindow {
        DateWindow::calendar_month_of(OffsetDateTime::now_utc().date())
    }

    /// The window spanning the trailing `days` days through today, in UTC.
    pub fn trailing_days(days: u16) -> DateWindow {
        let end = OffsetDateTime::now_utc().date();
        DateWindow {
            start: end - time::Duration::days(i64::from(days)),
            end,
        }
    }

    /// The first day of the window.
    pub fn start(&self) -> Date {
        self.start
    }

    /// The last day of the window.
    pub fn end(&self) -> Date {
        self.end
    }

    /// The first day of the window in query-parameter encoding.
    pub fn start_iso(&self) -> String {
        self.start
            .format(ISO_DATE)
            .expect("literal format description cannot fail")
    }

    /// The last day of the window in query-parameter encoding.
    pub fn end_iso(&self) -> String {
        self.end
            .format(ISO_DATE)
            .expect("literal format description cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::DateWindow;

    #[test]
    fn calendar_month_spans_first_through_last_day() {
        let window = DateWindow::calendar_month_of(date!(2025 - 03 - 17));
        assert_eq!(window.start(), date!(2025 - 03 - 01));
        assert_eq!(window.end(), date!(2025 - 03 - 31));
    }

    #[test]
    fn calendar_month_handles_leap_february() {
        let window = DateWindow::calendar_month_of(date!(2024 - 02 - 15));
        assert_eq!(window.end(), date!(2024 - 02 - 29));

        let window = DateWindow::calendar_month_of(date!(2025 - 02 - 15));
        assert_eq!(window.end(), date!(2025 - 02 - 28));
    }

    #[test]
    fn iso_encoding_zero_pads() {
        let window = DateWindow::calendar_month_of(date!(2025 - 04 - 02));
        assert_eq!(window.start_iso(), "2025-04-01");
        assert_eq!(window.end_iso(), "2025-04-30");
    }

    #[test]
    fn trailing_days_spans_requested_length() {
        let window = DateWindow::trailing_days(30);
        assert_eq!(window.end() - window.start(), time::Duration::days(30));
    }
}
