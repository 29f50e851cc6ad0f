use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

pub const REQUIRED_COLUMNS: [&str; 4] = ["order_id", "order_date", "product", "sales"];

/// Tokens read as a missing value, in addition to the empty field.
const MISSING_TOKENS: [&str; 10] = ["NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Years an order date may fall in; the span of nanosecond timestamps.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1678..=2261;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv data: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// A row as it appears in the source, before any typing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOrder {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub sales: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOrderTable {
    pub rows: Vec<RawOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub product: Option<String>,
    pub sales: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTable {
    pub orders: Vec<Order>,
}

impl OrderTable {
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingOrderId,
    MissingOrderDate,
    MissingSales,
    SalesOutOfRange,
    NegativeSales,
}

/// Counts of what the cleaner kept and threw away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub missing_order_id: usize,
    pub missing_order_date: usize,
    pub missing_sales: usize,
    pub sales_out_of_range: usize,
    pub negative_sales: usize,
}

impl CleaningReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_kept
    }

    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingOrderId => self.missing_order_id += 1,
            DropReason::MissingOrderDate => self.missing_order_date += 1,
            DropReason::MissingSales => self.missing_sales += 1,
            DropReason::SalesOutOfRange => self.sales_out_of_range += 1,
            DropReason::NegativeSales => self.negative_sales += 1,
        }
    }
}

impl TryFrom<RawOrder> for Order {
    type Error = DropReason;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        let order_id = present(raw.order_id).ok_or(DropReason::MissingOrderId)?;
        let order_date = present(raw.order_date)
            .and_then(|value| parse_date(&value))
            .ok_or(DropReason::MissingOrderDate)?;
        let sales = present(raw.sales).ok_or(DropReason::MissingSales)?;
        let sales = match parse_sales(&sales) {
            Some(sales) => sales,
            None if is_unrepresentable_number(&sales) => return Err(DropReason::SalesOutOfRange),
            None => return Err(DropReason::MissingSales),
        };

        if sales.is_sign_negative() && !sales.is_zero() {
            return Err(DropReason::NegativeSales);
        }

        Ok(Order {
            order_id,
            order_date,
            product: present(raw.product),
            sales,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !MISSING_TOKENS.contains(&v.as_str()))
}

/// Parses an order date. Dates outside the supported years count as unparseable.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))?;

    is_supported_date(date).then_some(date)
}

pub fn is_supported_date(date: NaiveDate) -> bool {
    SUPPORTED_YEARS.contains(&date.year())
}

pub fn parse_sales(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// A finite number too large or too precise for `Decimal`, such as `1e30`.
fn is_unrepresentable_number(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

pub fn load_csv(file_path: &Path) -> Result<RawOrderTable, DataSourceError> {
    let file = File::open(file_path).map_err(|source| DataSourceError::Io {
        path: file_path.to_path_buf(),
        source,
    })?;

    let table = read_orders(file)?;
    info!("loaded {} rows from {}", table.rows.len(), file_path.display());

    Ok(table)
}

pub fn read_orders<R: Read>(reader: R) -> Result<RawOrderTable, DataSourceError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataSourceError::MissingColumn(column));
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawOrder>() {
        rows.push(record?);
    }

    Ok(RawOrderTable { rows })
}

/// Types every row and drops the ones missing an id, a date or a sales amount.
pub fn clean(raw: RawOrderTable) -> (OrderTable, CleaningReport) {
    let mut report = CleaningReport {
        rows_read: raw.rows.len(),
        ..Default::default()
    };
    let mut orders = Vec::with_capacity(raw.rows.len());

    for (index, row) in raw.rows.into_iter().enumerate() {
        match Order::try_from(row) {
            Ok(order) => orders.push(order),
            Err(reason) => {
                debug!("dropping row, index={}, reason={:?}", index, reason);
                report.record_drop(reason);
            },
        }
    }

    report.rows_kept = orders.len();
    if report.rows_dropped() > 0 {
        warn!(
            "dropped {} of {} rows (missing id={}, bad date={}, bad sales={}, sales out of range={}, negative sales={})",
            report.rows_dropped(),
            report.rows_read,
            report.missing_order_id,
            report.missing_order_date,
            report.missing_sales,
            report.sales_out_of_range,
            report.negative_sales,
        );
    }

    (OrderTable { orders }, report)
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod data_tests;
