use crate::aggregate::{Aggregates, Pivot};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fmt::Display;

/// How a frame column is exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Identifiers and names; always text, even when they look numeric
    Label,
    Number,
}

/// A table with named columns, the hand-off format between aggregates and charts
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub headers: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new(headers: Vec<String>, kinds: Vec<ColumnKind>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            kinds,
            rows,
        }
    }

    /// Two-column frame from a keyed series
    pub fn from_series<'a, K, V, I>(key: &str, value: &str, series: I) -> Self
    where
        K: Display + 'a,
        V: Display + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        let rows = series
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v.to_string()])
            .collect();
        Self::new(
            vec![key.to_string(), value.to_string()],
            vec![ColumnKind::Label, ColumnKind::Number],
            rows,
        )
    }

    /// Wide frame: first column holds row labels, one column per pivot column
    pub fn from_pivot<T: Copy + Default + Display>(index: &str, pivot: &Pivot<T>) -> Self {
        let mut headers = vec![index.to_string()];
        headers.extend(pivot.column_labels.iter().cloned());
        let mut kinds = vec![ColumnKind::Label];
        kinds.extend(pivot.column_labels.iter().map(|_| ColumnKind::Number));

        let rows = pivot
            .row_labels
            .iter()
            .zip(pivot.rows())
            .map(|(label, values)| {
                let mut row = vec![label.clone()];
                row.extend(values.iter().map(|v| v.to_string()));
                row
            })
            .collect();
        Self::new(headers, kinds, rows)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Column '{}' not found. Available columns: {:?}", name, self.headers))
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                row[idx].parse::<f64>().with_context(|| {
                    format!(
                        "Failed to parse '{}' as number in column '{}' at row {}",
                        row[idx], name, row_idx
                    )
                })
            })
            .collect()
    }

    /// Render as a JSON array of objects, keyed by header.
    /// Label columns stay strings; number columns become JSON numbers.
    pub fn to_json(&self) -> Value {
        let items = self
            .rows
            .iter()
            .map(|row| {
                let obj = self
                    .headers
                    .iter()
                    .zip(&self.kinds)
                    .zip(row)
                    .map(|((h, kind), v)| {
                        let value = match (kind, v.parse::<f64>()) {
                            (ColumnKind::Number, Ok(n)) if n.is_finite() => serde_json::json!(n),
                            _ => Value::String(v.clone()),
                        };
                        (h.clone(), value)
                    })
                    .collect();
                Value::Object(obj)
            })
            .collect();
        Value::Array(items)
    }
}

impl Aggregates {
    pub fn category_revenue_frame(&self) -> Frame {
        Frame::from_series("ProductCategory", "TotalAmount", &self.revenue_by_category)
    }

    pub fn basket_size_frame(&self) -> Frame {
        Frame::from_series("UserID", "Quantity", &self.basket_size_by_user)
    }

    pub fn daily_revenue_frame(&self) -> Frame {
        Frame::from_series("OrderDate", "TotalAmount", &self.daily_revenue)
    }

    pub fn gender_demand_frame(&self) -> Frame {
        Frame::from_pivot("Gender", &self.gender_demand)
    }

    pub fn age_category_frame(&self) -> Frame {
        Frame::from_pivot("ProductCategory", &self.age_category_pivot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::AgeBuckets;
    use crate::order::sample_orders;
    use crate::table::OrderTable;

    fn sample_aggregates() -> Aggregates {
        let table = OrderTable::build(sample_orders(), AgeBuckets::default()).unwrap();
        Aggregates::compute(&table).unwrap()
    }

    #[test]
    fn test_category_revenue_frame() {
        let frame = sample_aggregates().category_revenue_frame();
        assert_eq!(frame.headers, vec!["ProductCategory", "TotalAmount"]);
        assert_eq!(
            frame.text_column("ProductCategory").unwrap(),
            vec!["Beauty", "Electronics", "Fashion", "Groceries"]
        );
        assert_eq!(
            frame.numeric_column("TotalAmount").unwrap(),
            vec![4200.0, 13800.0, 3300.0, 2100.0]
        );
    }

    #[test]
    fn test_daily_revenue_frame_uses_iso_dates() {
        let frame = sample_aggregates().daily_revenue_frame();
        assert_eq!(frame.rows[0][0], "2024-06-10");
        assert_eq!(frame.rows.len(), 10);
    }

    #[test]
    fn test_pivot_frame_is_wide() {
        let frame = sample_aggregates().age_category_frame();
        assert_eq!(
            frame.headers,
            vec!["ProductCategory", "20-25", "26-30", "31-35", "36-40"]
        );
        assert_eq!(frame.rows[3], vec!["Groceries", "5", "0", "0", "0"]);
    }

    #[test]
    fn test_column_not_found() {
        let frame = sample_aggregates().basket_size_frame();
        let err = frame.column_index("Missing").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_numeric_column_rejects_text() {
        let frame = sample_aggregates().basket_size_frame();
        assert!(frame.numeric_column("UserID").is_err());
    }

    #[test]
    fn test_to_json_keeps_numeric_looking_labels_as_text() {
        let mut orders = sample_orders();
        orders[0].user_id = "1001".to_string();
        orders[0].category = "2024".to_string();
        let table = OrderTable::build(orders, AgeBuckets::default()).unwrap();
        let aggregates = Aggregates::compute(&table).unwrap();

        let baskets = aggregates.basket_size_frame().to_json();
        assert_eq!(baskets[0]["UserID"], "1001");
        assert_eq!(baskets[0]["Quantity"], 2.0);

        let revenue = aggregates.category_revenue_frame().to_json();
        assert_eq!(revenue[0]["ProductCategory"], "2024");
        assert_eq!(revenue[0]["TotalAmount"], 3000.0);
    }

    #[test]
    fn test_pivot_frame_kinds() {
        let frame = sample_aggregates().gender_demand_frame();
        assert_eq!(frame.kinds[0], ColumnKind::Label);
        assert!(frame.kinds[1..].iter().all(|k| *k == ColumnKind::Number));
        assert_eq!(frame.kinds.len(), frame.headers.len());
    }

    #[test]
    fn test_to_json() {
        let frame = sample_aggregates().category_revenue_frame();
        let json = frame.to_json();
        let first = &json.as_array().unwrap()[0];
        assert_eq!(first["ProductCategory"], "Beauty");
        assert_eq!(first["TotalAmount"], 4200.0);
    }
}
