//! Accessibility report and response envelope types
//!
//! The report is produced by the external rule engine and relayed to clients
//! without transformation, so fields the engine adds beyond the ones modelled
//! here are carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{A11yError, Result};

/// Outcome of a single accessibility rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for StatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatStatus::Pass => write!(f, "pass"),
            StatStatus::Fail => write!(f, "fail"),
        }
    }
}

/// A transit route implicated by a failing rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_short_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_long_name: Option<String>,

    /// Any other `routes.txt` columns the engine reports
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteRef {
    /// Label shown to riders: the short name, else the long name
    pub fn label(&self) -> Option<&str> {
        self.route_short_name
            .as_deref()
            .or(self.route_long_name.as_deref())
    }
}

/// Result of one accessibility rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStat {
    pub name: String,
    pub status: StatStatus,
    pub value: String,

    /// Routes implicated by a failure; never empty when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteRef>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ValidationStat {
    pub fn passed(&self) -> bool {
        self.status == StatStatus::Pass
    }
}

/// Full accessibility report for one feed.
///
/// `stats` order is significant: clients deep-link to a rule by its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub agency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_start_date: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_end_date: Option<u64>,

    pub stats: Vec<ValidationStat>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ValidationReport {
    /// Parse a report emitted by the rule engine.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let report: ValidationReport = serde_json::from_slice(bytes)?;
        Ok(report.normalized())
    }

    /// Drop empty `routes` lists so that a present list is always non-empty.
    pub fn normalized(mut self) -> Self {
        for stat in &mut self.stats {
            if stat.routes.as_ref().is_some_and(Vec::is_empty) {
                stat.routes = None;
            }
        }
        self
    }

    /// Stats whose rule failed, with their position in the report
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ValidationStat)> {
        self.stats
            .iter()
            .enumerate()
            .filter(|(_, stat)| !stat.passed())
    }
}

/// Uniform wrapper returned by every validation endpoint.
///
/// Exactly one of `results` (on success) or `error` (on failure) is set. Use
/// [`ResponseEnvelope::success`] and [`ResponseEnvelope::failure`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ValidationReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Machine-readable failure class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(results: ValidationReport) -> Self {
        Self {
            success: true,
            results: Some(results),
            error: None,
            code: None,
        }
    }

    pub fn failure(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: None,
            error: Some(error.into()),
            code: Some(code.into()),
        }
    }

    /// Unwrap the report, turning a failure envelope into an error.
    pub fn into_result(self) -> Result<ValidationReport> {
        match (self.success, self.results) {
            (true, Some(report)) => Ok(report),
            (true, None) => Err(A11yError::InvalidReport(
                "success envelope carries no results".to_string(),
            )),
            (false, _) => Err(A11yError::Rejected {
                message: self
                    .error
                    .unwrap_or_else(|| "Unknown validation error".to_string()),
                code: self.code,
            }),
        }
    }
}
