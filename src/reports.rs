//! Read-side aggregates over the sales ledger and the catalog.
//!
//! Everything here is a pure function of the snapshots passed in and is
//! recomputed on every call.

use std::collections::HashMap;
use chrono::{Days, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use crate::domain::{Money, Product, Quantity, Sale};

pub const DEFAULT_TOP_PRODUCTS: usize = 5;
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub name: String,
    pub quantity: u64,
}

pub fn total_revenue(sales: &[Sale]) -> Money {
    sales.iter().map(|sale| sale.total).sum()
}

/// Revenue per sale; zero when there are no sales.
pub fn average_order_value(sales: &[Sale]) -> Money {
    total_revenue(sales).split(sales.len())
}

/// Sums sale totals per calendar day in `tz`. Days appear in the order
/// they are first seen in `sales`.
pub fn sales_by_date<Tz: TimeZone>(sales: &[Sale], tz: &Tz) -> Vec<DailySales> {
    let mut days: Vec<DailySales> = Vec::new();
    for sale in sales {
        let date = sale.date.with_timezone(tz).date_naive();
        match days.iter_mut().find(|day| day.date == date) {
            Some(day) => day.total += sale.total,
            None => days.push(DailySales { date, total: sale.total }),
        }
    }
    days
}

/// Units sold per product name, highest first, at most `n` entries.
/// Equal quantities keep the order in which the names were first sold.
pub fn top_selling_products(sales: &[Sale], n: usize) -> Vec<ProductSales> {
    let mut totals: Vec<ProductSales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for item in sales.iter().flat_map(|sale| &sale.items) {
        match index.get(item.name.as_str()) {
            Some(&i) => totals[i].quantity += u64::from(item.quantity),
            None => {
                index.insert(item.name.as_str(), totals.len());
                totals.push(ProductSales { name: item.name.clone(), quantity: u64::from(item.quantity) });
            }
        }
    }
    // sort_by is stable
    totals.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    totals.truncate(n);
    totals
}

pub fn low_stock(products: &[Product], threshold: u32) -> Vec<Product> {
    products
        .iter()
        .filter(|product| product.stock < Quantity::new(threshold))
        .cloned()
        .collect()
}

/// Sales totals for each of the `days` UTC days ending `today`, oldest first.
/// Days without sales are present with a zero total.
pub fn recent_daily_sales(sales: &[Sale], today: NaiveDate, days: u64) -> Vec<DailySales> {
    let by_day = sales_by_date(sales, &Utc);
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DailySales {
            date,
            total: by_day.iter().find(|d| d.date == date).map(|d| d.total).unwrap_or(Money::ZERO),
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub top_products: usize,
    pub low_stock_threshold: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_products: DEFAULT_TOP_PRODUCTS,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// Everything shown on the reports screen.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total_revenue: Money,
    pub average_order_value: Money,
    pub sale_count: usize,
    pub sales_by_date: Vec<DailySales>,
    pub top_selling_products: Vec<ProductSales>,
    pub low_stock: Vec<Product>,
}

impl Report {
    /// Builds the report with days grouped in the local time zone.
    pub fn build(sales: &[Sale], products: &[Product], options: &ReportOptions) -> Self {
        Self::build_in(sales, products, options, &Local)
    }

    pub fn build_in<Tz: TimeZone>(sales: &[Sale], products: &[Product], options: &ReportOptions, tz: &Tz) -> Self {
        Self {
            total_revenue: total_revenue(sales),
            average_order_value: average_order_value(sales),
            sale_count: sales.len(),
            sales_by_date: sales_by_date(sales, tz),
            top_selling_products: top_selling_products(sales, options.top_products),
            low_stock: low_stock(products, options.low_stock_threshold),
        }
    }
}

/// Summary cards and the seven-day chart from the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_sales: Money,
    pub product_count: usize,
    pub low_stock_count: usize,
    pub last_seven_days: Vec<DailySales>,
}

impl Dashboard {
    pub fn build(sales: &[Sale], products: &[Product], low_stock_threshold: u32, today: NaiveDate) -> Self {
        Self {
            total_sales: total_revenue(sales),
            product_count: products.len(),
            low_stock_count: low_stock(products, low_stock_threshold).len(),
            last_seven_days: recent_daily_sales(sales, today, 7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use uuid::Uuid;
    use crate::domain::SaleItem;

    fn item(name: &str, cents: u64, quantity: u32) -> SaleItem {
        SaleItem { id: format!("id-{name}"), name: name.to_string(), price: Money::from_cents(cents), quantity }
    }

    fn sale(at: &str, items: Vec<SaleItem>) -> Sale {
        let total = items.iter().map(SaleItem::subtotal).sum();
        Sale {
            id: at.to_string(),
            checkout_id: Uuid::nil(),
            date: at.parse().unwrap(),
            items,
            total,
        }
    }

    #[test]
    fn test_average_order_value_with_no_sales_is_zero() {
        assert_eq!(total_revenue(&[]), Money::ZERO);
        assert_eq!(average_order_value(&[]), Money::ZERO);
    }

    #[test]
    fn test_revenue_and_average() {
        let sales = vec![
            sale("2024-01-01T10:00:00Z", vec![item("A", 1000, 1)]),
            sale("2024-01-01T11:00:00Z", vec![item("B", 250, 2)]),
        ];
        assert_eq!(total_revenue(&sales), Money::from_cents(1500));
        assert_eq!(average_order_value(&sales), Money::from_cents(750));
    }

    #[test]
    fn test_top_selling_ties_keep_first_seen_order() {
        let sales = vec![
            sale("2024-01-01T10:00:00Z", vec![item("C", 100, 5), item("A", 100, 4)]),
            sale("2024-01-02T10:00:00Z", vec![item("B", 100, 10), item("A", 100, 6)]),
        ];
        let top = top_selling_products(&sales, 5);
        let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(top[0].quantity, 10);

        assert_eq!(top_selling_products(&sales, 1).len(), 1);
    }

    #[test]
    fn test_top_selling_groups_by_name() {
        let mut renamed = item("A", 100, 2);
        renamed.id = "other-id".to_string();
        let sales = vec![sale("2024-01-01T10:00:00Z", vec![item("A", 100, 1), renamed])];
        assert_eq!(top_selling_products(&sales, 5), vec![ProductSales { name: "A".into(), quantity: 3 }]);
    }

    #[test]
    fn test_sales_by_date_uses_given_time_zone() {
        let sales = vec![
            sale("2024-01-01T23:30:00Z", vec![item("A", 100, 1)]),
            sale("2024-01-02T00:30:00Z", vec![item("A", 200, 1)]),
            sale("2024-01-01T12:00:00Z", vec![item("A", 400, 1)]),
        ];

        let utc = sales_by_date(&sales, &Utc);
        assert_eq!(utc, vec![
            DailySales { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), total: Money::from_cents(500) },
            DailySales { date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), total: Money::from_cents(200) },
        ]);

        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let shifted = sales_by_date(&sales, &east);
        assert_eq!(shifted, vec![
            DailySales { date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), total: Money::from_cents(300) },
            DailySales { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), total: Money::from_cents(400) },
        ]);
    }

    #[test]
    fn test_low_stock_is_strictly_below_threshold() {
        let products = vec![
            Product::new("1", "Rice", Money::from_cents(100), Quantity::new(9)),
            Product::new("2", "Beans", Money::from_cents(100), Quantity::new(10)),
            Product::new("3", "Salt", Money::from_cents(100), Quantity::new(0)),
        ];
        let low: Vec<String> = low_stock(&products, 10).into_iter().map(|p| p.name).collect();
        assert_eq!(low, vec!["Rice", "Salt"]);
    }

    #[test]
    fn test_dashboard_seven_day_series_is_zero_filled() {
        let sales = vec![
            sale("2024-01-07T09:00:00Z", vec![item("A", 300, 1)]),
            sale("2024-01-05T09:00:00Z", vec![item("A", 100, 1)]),
            sale("2023-12-01T09:00:00Z", vec![item("A", 999, 1)]),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let dashboard = Dashboard::build(&sales, &[], 10, today);

        assert_eq!(dashboard.total_sales, Money::from_cents(1399));
        assert_eq!(dashboard.last_seven_days.len(), 7);
        assert_eq!(dashboard.last_seven_days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let totals: Vec<u64> = dashboard.last_seven_days.iter().map(|d| d.total.cents()).collect();
        assert_eq!(totals, vec![0, 0, 0, 0, 100, 0, 300]);
    }
}
