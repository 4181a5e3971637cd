// Aggregations over the canonical order table
//
// Every function here is pure. Floating-point sums are accumulated in
// ascending value order so results do not depend on row order. Quantity
// sums are widened to i128, which no i64 input can overflow.

use crate::error::{Error, Result};
use crate::table::OrderTable;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Dense two-dimensional aggregate with explicit zero fill
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot<T> {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    cells: Vec<Vec<T>>,
}

impl<T: Copy + Default> Pivot<T> {
    fn zeroed(row_labels: Vec<String>, column_labels: Vec<String>) -> Self {
        let cells = vec![vec![T::default(); column_labels.len()]; row_labels.len()];
        Self {
            row_labels,
            column_labels,
            cells,
        }
    }

    pub fn get(&self, row: &str, column: &str) -> Option<T> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        Some(self.cells[r][c])
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.cells
    }

    /// Values of one column, top to bottom
    pub fn column(&self, index: usize) -> Vec<T> {
        self.cells.iter().map(|row| row[index]).collect()
    }
}

fn ordered_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}

/// Total amount summed per product category
pub fn revenue_by_category(table: &OrderTable) -> BTreeMap<String, f64> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        groups
            .entry(row.order().category.clone())
            .or_default()
            .push(row.total_amount());
    }
    groups
        .into_iter()
        .map(|(category, totals)| (category, ordered_sum(totals)))
        .collect()
}

/// Mean quantity per user
pub fn average_basket_size_by_user(table: &OrderTable) -> BTreeMap<String, f64> {
    let mut groups: BTreeMap<String, (i128, usize)> = BTreeMap::new();
    for order in table.orders() {
        let entry = groups.entry(order.user_id.clone()).or_insert((0, 0));
        entry.0 += i128::from(order.quantity);
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(user, (sum, n))| (user, sum as f64 / n as f64))
        .collect()
}

/// Mean quantity for one user; `None` if the user placed no orders
pub fn average_basket_size_for(table: &OrderTable, user_id: &str) -> Option<f64> {
    let (sum, n) = table
        .orders()
        .filter(|o| o.user_id == user_id)
        .fold((0i128, 0usize), |(s, n), o| (s + i128::from(o.quantity), n + 1));
    if n == 0 {
        None
    } else {
        Some(sum as f64 / n as f64)
    }
}

/// Total amount summed per order date. Dates without orders are absent.
pub fn daily_revenue(table: &OrderTable) -> BTreeMap<NaiveDate, f64> {
    let mut groups: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        groups
            .entry(row.order().order_date)
            .or_default()
            .push(row.total_amount());
    }
    groups
        .into_iter()
        .map(|(date, totals)| (date, ordered_sum(totals)))
        .collect()
}

/// Quantity summed over category (rows) × age bucket (columns).
///
/// Columns cover every configured bucket; absent combinations are 0.
/// Unbucketed orders contribute to no cell.
pub fn age_bucket_by_category_pivot(table: &OrderTable) -> Pivot<i128> {
    let categories: BTreeSet<&str> = table.orders().map(|o| o.category.as_str()).collect();
    let row_labels: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
    let column_labels: Vec<String> = table.buckets().labels().map(String::from).collect();
    let mut pivot = Pivot::zeroed(row_labels, column_labels);

    for row in table.rows() {
        let Some(bucket) = row.age_bucket() else {
            continue;
        };
        if let Some(r) = pivot
            .row_labels
            .iter()
            .position(|l| *l == row.order().category)
        {
            pivot.cells[r][bucket] += i128::from(row.order().quantity);
        }
    }
    pivot
}

/// Number of orders per gender (rows) × category (columns), zero-filled
pub fn gender_category_counts(table: &OrderTable) -> Pivot<usize> {
    let genders: BTreeSet<&str> = table.orders().map(|o| o.gender.as_str()).collect();
    let categories: BTreeSet<&str> = table.orders().map(|o| o.category.as_str()).collect();
    let mut pivot = Pivot::zeroed(
        genders.iter().map(|g| g.to_string()).collect(),
        categories.iter().map(|c| c.to_string()).collect(),
    );

    for order in table.orders() {
        let r = pivot.row_labels.iter().position(|l| *l == order.gender);
        let c = pivot.column_labels.iter().position(|l| *l == order.category);
        if let (Some(r), Some(c)) = (r, c) {
            pivot.cells[r][c] += 1;
        }
    }
    pivot
}

/// Mean quantity across every order
pub fn overall_average_basket_size(table: &OrderTable) -> Result<f64> {
    if table.is_empty() {
        return Err(Error::EmptyDataset {
            aggregate: "overall average basket size",
        });
    }
    let sum: i128 = table.orders().map(|o| i128::from(o.quantity)).sum();
    Ok(sum as f64 / table.len() as f64)
}

/// Every aggregate the report and the charts consume
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub revenue_by_category: BTreeMap<String, f64>,
    pub basket_size_by_user: BTreeMap<String, f64>,
    pub daily_revenue: BTreeMap<NaiveDate, f64>,
    pub age_category_pivot: Pivot<i128>,
    pub gender_demand: Pivot<usize>,
    pub average_basket_size: f64,
}

impl Aggregates {
    pub fn compute(table: &OrderTable) -> Result<Self> {
        let aggregates = Self {
            revenue_by_category: revenue_by_category(table),
            basket_size_by_user: average_basket_size_by_user(table),
            daily_revenue: daily_revenue(table),
            age_category_pivot: age_bucket_by_category_pivot(table),
            gender_demand: gender_category_counts(table),
            average_basket_size: overall_average_basket_size(table)?,
        };
        debug!(
            categories = aggregates.revenue_by_category.len(),
            users = aggregates.basket_size_by_user.len(),
            days = aggregates.daily_revenue.len(),
            "computed aggregates"
        );
        Ok(aggregates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::AgeBuckets;
    use crate::order::{sample_orders, Order};

    fn sample_table() -> OrderTable {
        OrderTable::build(sample_orders(), AgeBuckets::default()).unwrap()
    }

    fn order(id: i64, user: &str, category: &str, quantity: i64, price: f64) -> Order {
        Order {
            order_id: id,
            user_id: user.to_string(),
            gender: "Female".to_string(),
            age: 30,
            category: category.to_string(),
            quantity,
            price,
            order_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        }
    }

    #[test]
    fn test_revenue_by_category_two_electronics_orders() {
        let table = OrderTable::build(
            vec![
                order(1, "U1", "Electronics", 2, 1500.0),
                order(2, "U2", "Electronics", 1, 2200.0),
            ],
            AgeBuckets::default(),
        )
        .unwrap();
        let revenue = revenue_by_category(&table);
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue["Electronics"], 5200.0);
    }

    #[test]
    fn test_revenue_by_category_sample() {
        let revenue = revenue_by_category(&sample_table());
        assert_eq!(revenue["Electronics"], 3000.0 + 2000.0 + 8800.0);
        assert_eq!(revenue["Fashion"], 800.0 + 1800.0 + 700.0);
        assert_eq!(revenue["Beauty"], 3600.0 + 600.0);
        assert_eq!(revenue["Groceries"], 1200.0 + 900.0);
    }

    #[test]
    fn test_average_basket_size_by_user() {
        let table = OrderTable::build(
            vec![
                order(1, "U1", "Books", 2, 10.0),
                order(2, "U1", "Books", 3, 10.0),
                order(3, "U2", "Books", 4, 10.0),
            ],
            AgeBuckets::default(),
        )
        .unwrap();
        let baskets = average_basket_size_by_user(&table);
        assert_eq!(baskets["U1"], 2.5);
        assert_eq!(baskets["U2"], 4.0);
        assert!(!baskets.contains_key("U3"));
    }

    #[test]
    fn test_average_basket_size_for_user() {
        let table = sample_table();
        assert_eq!(average_basket_size_for(&table, "U007"), Some(4.0));
        assert_eq!(average_basket_size_for(&table, "U999"), None);
    }

    #[test]
    fn test_daily_revenue_skips_empty_dates() {
        let mut a = order(1, "U1", "Books", 1, 10.0);
        let mut b = order(2, "U1", "Books", 2, 10.0);
        let mut c = order(3, "U1", "Books", 3, 10.0);
        a.order_date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        b.order_date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        c.order_date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let table = OrderTable::build(vec![a, b, c], AgeBuckets::default()).unwrap();

        let daily = daily_revenue(&table);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[&NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()], 40.0);
        assert_eq!(daily[&NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()], 20.0);
        assert!(!daily.contains_key(&NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()));
    }

    #[test]
    fn test_pivot_zero_fills_missing_cells() {
        let pivot = age_bucket_by_category_pivot(&sample_table());
        assert_eq!(pivot.column_labels, vec!["20-25", "26-30", "31-35", "36-40"]);
        assert_eq!(
            pivot.row_labels,
            vec!["Beauty", "Electronics", "Fashion", "Groceries"]
        );
        // Nobody in the sample is 36-40
        for category in &pivot.row_labels {
            assert_eq!(pivot.get(category, "36-40"), Some(0));
        }
        assert_eq!(pivot.get("Groceries", "31-35"), Some(0));
    }

    #[test]
    fn test_pivot_sample_values() {
        let pivot = age_bucket_by_category_pivot(&sample_table());
        assert_eq!(pivot.get("Electronics", "20-25"), Some(2));
        assert_eq!(pivot.get("Electronics", "26-30"), Some(1));
        assert_eq!(pivot.get("Electronics", "31-35"), Some(4));
        assert_eq!(pivot.get("Fashion", "20-25"), Some(2));
        assert_eq!(pivot.get("Fashion", "31-35"), Some(2));
        assert_eq!(pivot.get("Beauty", "20-25"), Some(3));
        assert_eq!(pivot.get("Beauty", "26-30"), Some(1));
        assert_eq!(pivot.get("Groceries", "20-25"), Some(5));
        assert_eq!(pivot.column(0), vec![3, 2, 2, 5]);
    }

    #[test]
    fn test_pivot_ignores_unbucketed_orders() {
        let mut old = order(1, "U1", "Books", 5, 10.0);
        old.age = 70;
        let young = order(2, "U2", "Books", 1, 10.0);
        let table = OrderTable::build(vec![old, young], AgeBuckets::default()).unwrap();
        let pivot = age_bucket_by_category_pivot(&table);
        let total: i128 = pivot.rows().iter().flatten().sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_quantity_sums_do_not_overflow() {
        let table = OrderTable::build(
            vec![
                order(1, "U001", "Books", i64::MAX, 0.0),
                order(2, "U001", "Books", 1, 0.0),
            ],
            AgeBuckets::default(),
        )
        .unwrap();
        let expected = (i64::MAX as f64 + 1.0) / 2.0;

        assert_eq!(average_basket_size_by_user(&table)["U001"], expected);
        assert_eq!(average_basket_size_for(&table, "U001"), Some(expected));
        assert_eq!(overall_average_basket_size(&table).unwrap(), expected);
        let pivot = age_bucket_by_category_pivot(&table);
        assert_eq!(pivot.get("Books", "26-30"), Some(i128::from(i64::MAX) + 1));
    }

    #[test]
    fn test_gender_category_counts() {
        let counts = gender_category_counts(&sample_table());
        assert_eq!(counts.row_labels, vec!["Female", "Male"]);
        assert_eq!(counts.get("Female", "Beauty"), Some(2));
        assert_eq!(counts.get("Male", "Beauty"), Some(0));
        assert_eq!(counts.get("Male", "Electronics"), Some(2));
        let total: usize = counts.rows().iter().flatten().sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_overall_average_basket_size() {
        assert_eq!(overall_average_basket_size(&sample_table()).unwrap(), 2.0);
    }

    #[test]
    fn test_overall_average_basket_size_single_row() {
        let table =
            OrderTable::build(vec![order(1, "U1", "Books", 7, 1.0)], AgeBuckets::default())
                .unwrap();
        assert_eq!(overall_average_basket_size(&table).unwrap(), 7.0);
    }

    #[test]
    fn test_overall_average_basket_size_empty() {
        let table = OrderTable::build(Vec::new(), AgeBuckets::default()).unwrap();
        let err = overall_average_basket_size(&table).unwrap_err();
        assert!(matches!(err, Error::EmptyDataset { .. }));
        assert!(err.to_string().contains("average basket size"));
    }

    #[test]
    fn test_aggregates_compute_is_idempotent() {
        let table = sample_table();
        let first = Aggregates::compute(&table).unwrap();
        let second = Aggregates::compute(&table).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ordered_sum_is_permutation_invariant() {
        let values = vec![0.1, 1e16, -1e16, 0.2, 0.3];
        let mut reversed = values.clone();
        reversed.reverse();
        assert_eq!(
            ordered_sum(values).to_bits(),
            ordered_sum(reversed).to_bits()
        );
    }
}
