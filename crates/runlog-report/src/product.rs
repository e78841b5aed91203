// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Product selections and groups

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ProductInfo;

/// Name of the group that collects test cases matching no selected product
pub const FALLBACK_GROUP_NAME: &str = "所选产品";

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Parse a test case's raw product identifier field
///
/// The field is normally a JSON array such as `["70050","70051"]`. When it is
/// not, every run of digits in the text is taken as an identifier.
#[must_use]
pub fn parse_product_ids(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
        return items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
    }
    DIGITS_RE
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A requested product selector and what is known about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSelection {
    /// Selector as requested
    pub selector: String,
    /// Product details, when known
    pub info: Option<ProductInfo>,
}

impl ProductSelection {
    /// Resolve a selector against the provided product details
    ///
    /// Falls back to splitting a `<package_name>|<product_id>` selector.
    #[must_use]
    pub fn resolve(selector: &str, infos: &BTreeMap<String, ProductInfo>) -> Self {
        let info = infos.get(selector).cloned().or_else(|| {
            selector
                .split_once('|')
                .map(|(package_name, product_id)| ProductInfo {
                    package_name: package_name.to_string(),
                    product_id: product_id.to_string(),
                })
        });
        Self {
            selector: selector.to_string(),
            info,
        }
    }

    /// Group name shown for this selection
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.info {
            Some(info) => format!("{}（ID: {}）", info.package_name, info.product_id),
            None => self.selector.clone(),
        }
    }

    /// Product identifier, if known and non-empty
    #[must_use]
    pub fn product_id(&self) -> Option<&str> {
        self.info
            .as_ref()
            .map(|info| info.product_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// A bucket of the report hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGroup {
    /// Group name
    pub display_name: String,
    /// Product identifier test cases are matched against
    pub product_id: Option<String>,
}

impl ProductGroup {
    /// The group used when no product was selected
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            display_name: FALLBACK_GROUP_NAME.to_string(),
            product_id: None,
        }
    }

    /// Whether this is the fallback group
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.display_name == FALLBACK_GROUP_NAME
    }

    /// Whether a test case with these identifiers belongs here
    #[must_use]
    pub fn matches(&self, product_ids: &[String]) -> bool {
        self.product_id
            .as_deref()
            .is_some_and(|id| product_ids.iter().any(|p| p == id))
    }
}

impl From<&ProductSelection> for ProductGroup {
    fn from(selection: &ProductSelection) -> Self {
        Self {
            display_name: selection.display_name(),
            product_id: selection.product_id().map(str::to_string),
        }
    }
}
