//! Filter criteria for the movement view.
//!
//! The same criteria drive two things: the in-memory filter applied to a
//! loaded export, and the parametrized query text handed to the external
//! query layer. Optional outlet/item lists only add a clause when non-empty.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::FilterConfig;
use crate::model::RawMovement;

pub const MOVEMENT_VIEW: &str = "public.mv_movement_daily";

/// View columns in select order.
pub const VIEW_COLUMNS: [&str; 14] = [
    "tanggal",
    "outlet",
    "spv",
    "kota",
    "item",
    "stock_awal",
    "stock_masuk",
    "qty_terpakai",
    "qty_sisa",
    "ideal_usage_qty",
    "retur_qty",
    "qty_sisa_seharusnya",
    "gap_qty_sisa",
    "so_flag",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub outlets: Vec<String>,
    pub items: Vec<String>,
}

impl MovementFilter {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            outlets: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Build from config defaults for the given `today`.
    pub fn from_config(config: &FilterConfig, today: NaiveDate) -> Self {
        let (start, end) = config.period(today);
        Self::new(start, end)
            .outlets(config.outlets.iter().cloned())
            .items(config.items.iter().cloned())
    }

    pub fn outlets<I, S>(mut self, outlets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outlets = outlets.into_iter().map(Into::into).collect();
        self
    }

    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Rows without a date or identity pass, so the engine can report them.
    pub fn matches(&self, row: &RawMovement) -> bool {
        if let Some(date) = row.date {
            if date < self.start || date > self.end {
                return false;
            }
        }
        if !self.outlets.is_empty() {
            if let Some(outlet) = row.outlet.as_deref() {
                if !self.outlets.iter().any(|o| o == outlet.trim()) {
                    return false;
                }
            }
        }
        if !self.items.is_empty() {
            if let Some(item) = row.item.as_deref() {
                if !self.items.iter().any(|i| i == item.trim()) {
                    return false;
                }
            }
        }
        true
    }

    pub fn to_query(&self) -> MovementQuery {
        let mut sql = format!(
            "SELECT {} FROM {MOVEMENT_VIEW} WHERE tanggal BETWEEN :start_date AND :end_date",
            VIEW_COLUMNS.join(", ")
        );
        let mut params = BTreeMap::new();
        params.insert("start_date".to_string(), QueryParam::Date(self.start));
        params.insert("end_date".to_string(), QueryParam::Date(self.end));

        if !self.outlets.is_empty() {
            sql.push_str(" AND outlet = ANY(:outlet)");
            params.insert("outlet".to_string(), QueryParam::List(self.outlets.clone()));
        }
        if !self.items.is_empty() {
            sql.push_str(" AND item = ANY(:item)");
            params.insert("item".to_string(), QueryParam::List(self.items.clone()));
        }

        sql.push_str(" ORDER BY tanggal, outlet, item");
        MovementQuery { sql, params }
    }
}

/// Lookup query for the outlet/item pickers.
pub fn options_query() -> MovementQuery {
    MovementQuery {
        sql: format!("SELECT DISTINCT outlet, item FROM {MOVEMENT_VIEW} ORDER BY outlet, item"),
        params: BTreeMap::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryParam {
    Date(NaiveDate),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementQuery {
    pub sql: String,
    pub params: BTreeMap<String, QueryParam>,
}
