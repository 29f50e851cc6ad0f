use std::collections::{HashMap, HashSet};

use log::info;
use rust_decimal::Decimal;

use super::{checked_sum, AggregateError, KpiSummary, ProductSales};
use crate::data::OrderTable;

pub fn calculate_kpis(table: &OrderTable) -> Result<KpiSummary, AggregateError> {
    let total_sales = table
        .iter()
        .try_fold(Decimal::ZERO, |total, order| checked_sum(total, order.sales))?;

    let avg_order_value = if table.is_empty() {
        Decimal::ZERO
    } else {
        total_sales / Decimal::from(table.len())
    };

    let num_orders = table
        .iter()
        .map(|order| order.order_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let summary = KpiSummary {
        total_sales,
        avg_order_value,
        num_orders,
        sales_by_product: sales_by_product(table)?,
    };

    info!(
        "kpis: total_sales={}, avg_order_value={}, num_orders={}, products={}",
        summary.total_sales,
        summary.avg_order_value.round_dp(2),
        summary.num_orders,
        summary.sales_by_product.len()
    );

    Ok(summary)
}

/// Sums sales per product, highest revenue first.
pub fn sales_by_product(table: &OrderTable) -> Result<Vec<ProductSales>, AggregateError> {
    let mut index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<ProductSales> = Vec::new();

    for order in table.iter() {
        let key = order.product.as_deref();
        match index.get(&key) {
            Some(&position) => {
                let group = &mut groups[position];
                group.sales = checked_sum(group.sales, order.sales)?;
            },
            None => {
                index.insert(key, groups.len());
                groups.push(ProductSales {
                    product: order.product.clone(),
                    sales: order.sales,
                });
            },
        }
    }

    // Stable, so equal totals stay in first-seen order.
    groups.sort_by(|a, b| b.sales.cmp(&a.sales));

    Ok(groups)
}
