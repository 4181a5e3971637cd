use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Persisted column names, in file order
pub const COLUMNS: [&str; 8] = [
    "OrderID",
    "UserID",
    "Gender",
    "Age",
    "ProductCategory",
    "Quantity",
    "Price",
    "OrderDate",
];

/// One raw order record.
///
/// Gender and category are open string categories. The total amount is not
/// a field: it is always derived from `quantity` and `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "OrderID")]
    pub order_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "ProductCategory")]
    pub category: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "OrderDate")]
    pub order_date: NaiveDate,
}

impl Order {
    pub fn total_amount(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// The built-in ten-order dataset, one order per day from 2024-06-10
pub fn sample_orders() -> Vec<Order> {
    let start = NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid calendar date");
    let rows: [(&str, &str, i64, &str, i64, f64); 10] = [
        ("U001", "Female", 25, "Electronics", 2, 1500.0),
        ("U002", "Male", 32, "Fashion", 1, 800.0),
        ("U003", "Female", 21, "Beauty", 3, 1200.0),
        ("U004", "Male", 29, "Electronics", 1, 2000.0),
        ("U005", "Female", 24, "Fashion", 2, 900.0),
        ("U006", "Female", 27, "Beauty", 1, 600.0),
        ("U007", "Male", 35, "Electronics", 4, 2200.0),
        ("U008", "Male", 22, "Groceries", 3, 400.0),
        ("U009", "Female", 23, "Groceries", 2, 450.0),
        ("U010", "Male", 31, "Fashion", 1, 700.0),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, &(user, gender, age, category, quantity, price))| Order {
            order_id: 1001 + i as i64,
            user_id: user.to_string(),
            gender: gender.to_string(),
            age,
            category: category.to_string(),
            quantity,
            price,
            order_date: start + Days::new(i as u64),
        })
        .collect()
}
