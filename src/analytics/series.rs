use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use log::debug;
use rust_decimal::Decimal;

use super::{checked_sum, sales_by_product, AggregateError, ProductSales, WeeklyTotal};
use crate::data::{is_supported_date, OrderTable};

pub const WEEK_ENDS_ON: Weekday = Weekday::Sun;

/// The last day of the week `date` falls in, or `None` past the end of the calendar.
pub fn week_ending(date: NaiveDate, ends_on: Weekday) -> Option<NaiveDate> {
    let offset = (7 + ends_on.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(offset)))
}

/// Sales summed per week, oldest first. Weeks between the first and last
/// order with no sales are present with a zero total. Orders dated outside
/// the supported years are left out.
pub fn weekly_sales(table: &OrderTable) -> Result<Vec<WeeklyTotal>, AggregateError> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for order in table.iter() {
        let week = Some(order.order_date)
            .filter(|date| is_supported_date(*date))
            .and_then(|date| week_ending(date, WEEK_ENDS_ON));
        let Some(week) = week else {
            debug!("order outside the weekly series, order_id={}", order.order_id);
            continue;
        };

        let bucket = buckets.entry(week).or_default();
        *bucket = checked_sum(*bucket, order.sales)?;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Ok(Vec::new());
    };

    let mut series = Vec::new();
    let mut week = Some(first);
    while let Some(current) = week.filter(|current| *current <= last) {
        series.push(WeeklyTotal {
            week_ending: current,
            sales: buckets.get(&current).copied().unwrap_or_default(),
        });
        week = current.checked_add_days(Days::new(7));
    }

    Ok(series)
}

/// The `limit` best selling products, ties in first-seen order.
pub fn top_products(table: &OrderTable, limit: usize) -> Result<Vec<ProductSales>, AggregateError> {
    let mut ranking = sales_by_product(table)?;
    ranking.truncate(limit);
    Ok(ranking)
}
