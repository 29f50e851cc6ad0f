use std::fmt;

use chrono::NaiveDate;
use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;
use thiserror::Error;

pub mod kpi;
pub mod series;

pub use kpi::{calculate_kpis, sales_by_product};
pub use series::{top_products, weekly_sales, week_ending, WEEK_ENDS_ON};

pub const UNSPECIFIED_PRODUCT: &str = "(unspecified)";

#[derive(Debug, PartialEq, Error)]
pub enum AggregateError {
    #[error("sales total overflowed")]
    SalesOverflow,
}

fn checked_sum(total: Decimal, amount: Decimal) -> Result<Decimal, AggregateError> {
    total.checked_add(amount).ok_or(AggregateError::SalesOverflow)
}

/// Revenue of one product group. Orders without a product form their own group.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product: Option<String>,
    pub sales: Decimal,
}

impl ProductSales {
    pub fn label(&self) -> &str {
        self.product.as_deref().unwrap_or(UNSPECIFIED_PRODUCT)
    }
}

impl fmt::Display for ProductSales {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.sales)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyTotal {
    pub week_ending: NaiveDate,
    pub sales: Decimal,
}

/// Headline figures of a cleaned order table.
///
/// An empty table yields zero for every figure, the average included.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct KpiSummary {
    #[getset(get_copy = "pub")]
    total_sales: Decimal,
    #[getset(get_copy = "pub")]
    avg_order_value: Decimal,
    #[getset(get_copy = "pub")]
    num_orders: usize,
    /// Sorted by revenue, highest first; ties keep first-seen order.
    #[getset(get = "pub")]
    sales_by_product: Vec<ProductSales>,
}

impl KpiSummary {
    pub fn is_empty(&self) -> bool {
        self.num_orders == 0
    }
}
