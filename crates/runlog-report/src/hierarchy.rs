// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report hierarchy: product groups → test cases → executions
//!
//! The hierarchy is rebuilt for every report request. A test case lands in
//! every group whose product id it lists; test cases matching no group go to
//! the fallback group, or the first group when there is none, so nothing is
//! dropped.
//!
//! # Example
//!
//! ```
//! use runlog_report::hierarchy::ReportHierarchy;
//! use runlog_report::model::ReportPayload;
//!
//! let payload = ReportPayload::from_json(r#"{
//!     "report_data": {"1_login": {"process_name": "login", "product_ids": "[\"7\"]"}},
//!     "selected_packages": ["core|7"]
//! }"#).unwrap();
//!
//! let hierarchy = ReportHierarchy::from_payload(payload);
//! assert_eq!(hierarchy.groups()[0].group.display_name, "core（ID: 7）");
//! assert_eq!(hierarchy.test_case_count(), 1);
//! ```

use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::model::{ExecutionRecord, ReportPayload, TestCaseRecord};
use crate::product::{ProductGroup, ProductSelection, parse_product_ids};
use crate::status::StatusTally;

/// A test case as placed in the report
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseReport {
    /// `<project_id>_<process_name>` key
    pub key: String,
    /// Project identifier
    pub project_id: String,
    /// Process (test case) name
    pub process_name: String,
    /// Product type tag
    pub product_type: String,
    /// System under test
    pub system: String,
    /// Environment name
    pub environment: String,
    /// Product address
    pub product_address: String,
    /// Raw product package names
    pub product_package_names: String,
    /// Parsed product identifiers
    pub product_ids: Vec<String>,
    /// Executions
    pub executions: Vec<ExecutionRecord>,
}

impl TestCaseReport {
    /// Build from a payload record
    #[must_use]
    pub fn from_record(key: String, record: TestCaseRecord) -> Self {
        Self {
            key,
            product_ids: parse_product_ids(&record.product_ids),
            project_id: record.project_id,
            process_name: record.process_name,
            product_type: record.product_type,
            system: record.system,
            environment: record.environment,
            product_address: record.product_address,
            product_package_names: record.product_package_names,
            executions: record.executions,
        }
    }

    /// Number of executions
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.executions.len()
    }

    /// Executions counted by status class
    #[must_use]
    pub fn status_tally(&self) -> StatusTally {
        self.executions.iter().map(ExecutionRecord::status).collect()
    }
}

/// One product group and its test cases
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    /// The group
    pub group: ProductGroup,
    /// Test cases in payload order, serialized keyed by test case key;
    /// shared with other groups on fan-out
    #[serde(serialize_with = "serialize_keyed")]
    pub test_cases: Vec<Arc<TestCaseReport>>,
}

fn serialize_keyed<S: Serializer>(
    test_cases: &[Arc<TestCaseReport>],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(test_cases.iter().map(|tc| (&tc.key, tc)))
}

impl GroupReport {
    fn new(group: ProductGroup) -> Self {
        Self {
            group,
            test_cases: Vec::new(),
        }
    }

    /// Add a test case, replacing one with the same key in place
    fn insert(&mut self, test_case: Arc<TestCaseReport>) {
        match self.test_cases.iter_mut().find(|tc| tc.key == test_case.key) {
            Some(existing) => *existing = test_case,
            None => self.test_cases.push(test_case),
        }
    }

    /// Find a test case by key
    #[must_use]
    pub fn test_case(&self, key: &str) -> Option<&Arc<TestCaseReport>> {
        self.test_cases.iter().find(|tc| tc.key == key)
    }

    /// Number of test cases in the group
    #[must_use]
    pub fn test_case_count(&self) -> usize {
        self.test_cases.len()
    }

    /// Number of executions across the group's test cases
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.test_cases
            .iter()
            .map(|tc| tc.execution_count())
            .sum()
    }

    /// Executions across the group counted by status class
    #[must_use]
    pub fn status_tally(&self) -> StatusTally {
        let mut tally = StatusTally::default();
        for test_case in &self.test_cases {
            tally.merge(test_case.status_tally());
        }
        tally
    }

    /// Aggregates for this group
    #[must_use]
    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            display_name: self.group.display_name.clone(),
            product_id: self.group.product_id.clone(),
            test_case_count: self.test_case_count(),
            execution_count: self.execution_count(),
            status: self.status_tally(),
        }
    }
}

/// Aggregate counts for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    /// Group name
    pub display_name: String,
    /// Group product id
    pub product_id: Option<String>,
    /// Test cases in the group
    pub test_case_count: usize,
    /// Executions in the group
    pub execution_count: usize,
    /// Executions by status class
    pub status: StatusTally,
}

/// Product groups in selection order
#[derive(Debug, Clone, Serialize)]
pub struct ReportHierarchy {
    groups: Vec<GroupReport>,
}

impl ReportHierarchy {
    /// Place test cases into one group per selection
    ///
    /// With no selections a single fallback group is created.
    pub fn build<I>(catalog: I, selections: &[ProductSelection]) -> Self
    where
        I: IntoIterator<Item = (String, TestCaseRecord)>,
    {
        let mut groups: Vec<GroupReport> = Vec::new();
        for selection in selections {
            let group = ProductGroup::from(selection);
            if !groups
                .iter()
                .any(|g| g.group.display_name == group.display_name)
            {
                groups.push(GroupReport::new(group));
            }
        }
        if groups.is_empty() {
            groups.push(GroupReport::new(ProductGroup::fallback()));
        }

        let fallback = groups
            .iter()
            .position(|g| g.group.is_fallback())
            .unwrap_or(0);

        for (key, record) in catalog {
            let test_case = Arc::new(TestCaseReport::from_record(key, record));

            let mut placed = false;
            for group in &mut groups {
                if group.group.matches(&test_case.product_ids) {
                    group.insert(Arc::clone(&test_case));
                    placed = true;
                }
            }

            if !placed {
                debug!(
                    key = %test_case.key,
                    product_ids = ?test_case.product_ids,
                    group = %groups[fallback].group.display_name,
                    "No selected product matched, using fallback group"
                );
                groups[fallback].insert(test_case);
            }
        }

        debug!(groups = groups.len(), "Built report hierarchy");
        Self { groups }
    }

    /// Build from a full report payload
    #[must_use]
    pub fn from_payload(payload: ReportPayload) -> Self {
        let selections: Vec<ProductSelection> = payload
            .selected_packages
            .iter()
            .map(|selector| ProductSelection::resolve(selector, &payload.selected_products_info))
            .collect();
        Self::build(payload.report_data, &selections)
    }

    /// Groups in selection order
    #[must_use]
    pub fn groups(&self) -> &[GroupReport] {
        &self.groups
    }

    /// Find a group by display name
    #[must_use]
    pub fn group(&self, display_name: &str) -> Option<&GroupReport> {
        self.groups
            .iter()
            .find(|g| g.group.display_name == display_name)
    }

    /// Test cases summed over groups; a fanned-out test case counts once per group
    #[must_use]
    pub fn test_case_count(&self) -> usize {
        self.groups.iter().map(GroupReport::test_case_count).sum()
    }

    /// Executions summed over groups
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.groups.iter().map(GroupReport::execution_count).sum()
    }

    /// Executions by status class, summed over groups
    #[must_use]
    pub fn status_tally(&self) -> StatusTally {
        let mut tally = StatusTally::default();
        for group in &self.groups {
            tally.merge(group.status_tally());
        }
        tally
    }

    /// Per-group aggregates
    #[must_use]
    pub fn summaries(&self) -> Vec<GroupSummary> {
        self.groups.iter().map(GroupReport::summary).collect()
    }
}
