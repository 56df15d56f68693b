use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::export::HeaderStyle;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Parsed `*.movement.toml`. Resolved once at startup and passed by reference.
#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub policy: MatchPolicy,
    #[serde(default)]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Which equality decides MATCH.
///
/// `closing_stock` compares actual closing stock to the benchmark closing
/// stock; `consumption` compares consumed quantity to expected usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    #[default]
    ClosingStock,
    Consumption,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClosingStock => "closing_stock",
            Self::Consumption => "consumption",
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "closing_stock" => Ok(Self::ClosingStock),
            "consumption" => Ok(Self::Consumption),
            _ => Err(ReconError::PolicyError(s.to_string())),
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Source + Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// CSV export of the movement view, relative to the config file.
    pub file: String,
}

/// Header names of the movement view export. Defaults match the view.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    pub outlet: String,
    pub supervisor: String,
    pub city: String,
    pub item: String,
    pub opening_stock: String,
    pub inbound_qty: String,
    pub consumed_qty: String,
    pub closing_stock: String,
    pub expected_usage_qty: String,
    pub returned_qty: String,
    pub expected_closing_stock: String,
    pub upstream_status: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "tanggal".into(),
            outlet: "outlet".into(),
            supervisor: "spv".into(),
            city: "kota".into(),
            item: "item".into(),
            opening_stock: "stock_awal".into(),
            inbound_qty: "stock_masuk".into(),
            consumed_qty: "qty_terpakai".into(),
            closing_stock: "qty_sisa".into(),
            expected_usage_qty: "ideal_usage_qty".into(),
            returned_qty: "retur_qty".into(),
            expected_closing_stock: "qty_sisa_seharusnya".into(),
            upstream_status: "so_flag".into(),
        }
    }
}

impl ColumnMapping {
    fn entries(&self) -> [(&'static str, &str); 13] {
        [
            ("date", &self.date),
            ("outlet", &self.outlet),
            ("supervisor", &self.supervisor),
            ("city", &self.city),
            ("item", &self.item),
            ("opening_stock", &self.opening_stock),
            ("inbound_qty", &self.inbound_qty),
            ("consumed_qty", &self.consumed_qty),
            ("closing_stock", &self.closing_stock),
            ("expected_usage_qty", &self.expected_usage_qty),
            ("returned_qty", &self.returned_qty),
            ("expected_closing_stock", &self.expected_closing_stock),
            ("upstream_status", &self.upstream_status),
        ]
    }
}

// ---------------------------------------------------------------------------
// Filter defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Default reporting day is `today - lookback_days`. At most
    /// [`MAX_LOOKBACK_DAYS`].
    pub lookback_days: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub outlets: Vec<String>,
    pub items: Vec<String>,
}

/// Ten years back is the furthest a default reporting day may reach.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            lookback_days: 3,
            start: None,
            end: None,
            outlets: Vec::new(),
            items: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Reporting period: the explicit range if set, else a single day.
    pub fn period(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                let day = today
                    .checked_sub_days(Days::new(u64::from(self.lookback_days)))
                    .unwrap_or(NaiveDate::MIN);
                (day, day)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Connection settings handed to the external query layer.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            name: String::new(),
            user: String::new(),
            password: None,
        }
    }
}

impl DatabaseConfig {
    /// Display form of the connection URL. The password is always masked.
    pub fn connection_url(&self) -> String {
        let secret = if self.password.is_some() { ":***" } else { "" };
        format!(
            "postgresql://{}{secret}@{}:{}/{}",
            self.user, self.host, self.port, self.name
        )
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub headers: HeaderStyle,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if self.filter.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ReconError::ConfigValidation(format!(
                "filter.lookback_days {} exceeds {MAX_LOOKBACK_DAYS}",
                self.filter.lookback_days
            )));
        }

        match (self.filter.start, self.filter.end) {
            (Some(start), Some(end)) if start > end => {
                return Err(ReconError::ConfigValidation(format!(
                    "filter.start {start} is after filter.end {end}"
                )));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ReconError::ConfigValidation(
                    "filter.start and filter.end must be set together".into(),
                ));
            }
            _ => {}
        }

        for (field, column) in self.columns.entries() {
            if column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
        }

        if let Some(ref source) = self.source {
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation("source.file must not be empty".into()));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
