//! Financial metrics over WooCommerce orders

use serde::{Deserialize, Serialize};

use crate::constants::TOP_PRODUCTS_LIMIT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: u64,
    pub name: String,
    pub quantity: u64,
    /// WooCommerce sends money as strings
    #[serde(default)]
    pub total: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
}

/// Report filter. `status` may hold several comma-separated statuses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReportInput {
    pub start_date: String,
    pub end_date: String,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: u64,
    pub name: String,
    pub quantity: u64,
    pub total_revenue: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub gross_revenue: f64,
    pub total_orders: usize,
    pub average_ticket: f64,
    pub top_selling_products: Vec<ProductSales>,
}

fn money(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

pub fn calculate_financial_metrics(orders: &[Order]) -> FinancialReport {
    if orders.is_empty() {
        return FinancialReport::default();
    }

    let gross_revenue: f64 = orders.iter().map(|o| money(&o.total)).sum();
    let total_orders = orders.len();

    let mut products: Vec<ProductSales> = Vec::new();
    for item in orders.iter().flat_map(|o| &o.line_items) {
        let index = match products.iter().position(|p| p.product_id == item.product_id) {
            Some(i) => i,
            None => {
                products.push(ProductSales {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    quantity: 0,
                    total_revenue: 0.0,
                });
                products.len() - 1
            }
        };
        let entry = &mut products[index];
        entry.quantity += item.quantity;
        entry.total_revenue += money(&item.total);
    }

    products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    products.truncate(TOP_PRODUCTS_LIMIT);

    FinancialReport {
        gross_revenue,
        total_orders,
        average_ticket: gross_revenue / total_orders as f64,
        top_selling_products: products,
    }
}
