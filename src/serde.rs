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

//! Lenient deserialization helpers.
//!
//! The upstream APIs drift. A metrics dashboard should render zeros rather
//! than crash when they do, so the record-list and monetary-value decoders
//! here degrade instead of erroring: an unexpected list shape becomes an
//! empty list and an unparseable amount becomes zero.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes a list field, tolerating upstream shape drift.
///
/// A missing field is handled by `#[serde(default)]` at the call site; a
/// non-list value decodes as an empty list, and list elements that fail to
/// decode are dropped rather than failing the batch.
pub(crate) fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Deserializes a monetary amount that may arrive as a decimal-as-string or
/// as a bare JSON number. Anything unparseable decodes as zero, so a single
/// bad record contributes nothing instead of aborting its batch.
pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    })
}
