// Canonical order table: validation, derived columns and CSV persistence

use crate::bucket::AgeBuckets;
use crate::error::{Error, Result};
use crate::order::{Order, COLUMNS};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// An order together with its derived age bucket
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    order: Order,
    age_bucket: Option<usize>,
}

impl OrderRow {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn total_amount(&self) -> f64 {
        self.order.total_amount()
    }

    /// Index into the table's [`AgeBuckets`], `None` when unbucketed
    pub fn age_bucket(&self) -> Option<usize> {
        self.age_bucket
    }
}

/// Immutable, validated set of orders built once per run
#[derive(Debug, Clone)]
pub struct OrderTable {
    rows: Vec<OrderRow>,
    buckets: AgeBuckets,
}

impl OrderTable {
    /// Validate raw orders and derive their age buckets.
    ///
    /// Text fields are trimmed, matching what [`OrderTable::read_csv`] reads
    /// back. Rejects non-positive quantity or age, negative or non-finite
    /// price, an unrepresentable total, and duplicate order ids.
    pub fn build(orders: impl IntoIterator<Item = Order>, buckets: AgeBuckets) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        let mut unbucketed = 0usize;

        for (idx, mut order) in orders.into_iter().enumerate() {
            trim_text_fields(&mut order);
            validate(idx, &order)?;
            if !seen.insert(order.order_id) {
                return Err(Error::validation(idx, order.order_id, "duplicate OrderID"));
            }

            let age_bucket = buckets.assign(order.age);
            if age_bucket.is_none() {
                unbucketed += 1;
            }
            rows.push(OrderRow { order, age_bucket });
        }

        if unbucketed > 0 {
            warn!(unbucketed, "orders fall outside every age bucket");
        }
        debug!(rows = rows.len(), buckets = buckets.len(), "built order table");

        Ok(Self { rows, buckets })
    }

    pub fn rows(&self) -> &[OrderRow] {
        &self.rows
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.rows.iter().map(|r| &r.order)
    }

    pub fn buckets(&self) -> &AgeBuckets {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read orders from CSV with a header row and rebuild the table
    pub fn read_csv<R: Read>(reader: R, buckets: AgeBuckets) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let orders = rdr
            .deserialize::<Order>()
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
        Self::build(orders, buckets)
    }

    pub fn load(path: impl AsRef<Path>, buckets: AgeBuckets) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let table = Self::read_csv(BufReader::new(file), buckets)?;
        info!(path = %path.display(), rows = table.len(), "loaded orders");
        Ok(table)
    }

    /// Write the raw columns only; derived columns are never persisted
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(COLUMNS)?;
        for order in self.orders() {
            wtr.serialize(order)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        self.write_csv(BufWriter::new(file))?;
        info!(path = %path.display(), rows = self.len(), "saved orders");
        Ok(())
    }
}

fn trim_text_fields(order: &mut Order) {
    for field in [&mut order.user_id, &mut order.gender, &mut order.category] {
        let trimmed = field.trim();
        if trimmed.len() != field.len() {
            *field = trimmed.to_string();
        }
    }
}

fn validate(idx: usize, order: &Order) -> Result<()> {
    if order.quantity <= 0 {
        return Err(Error::validation(
            idx,
            order.order_id,
            format!("quantity must be positive, got {}", order.quantity),
        ));
    }
    if order.age <= 0 {
        return Err(Error::validation(
            idx,
            order.order_id,
            format!("age must be positive, got {}", order.age),
        ));
    }
    if !order.price.is_finite() || order.price < 0.0 {
        return Err(Error::validation(
            idx,
            order.order_id,
            format!("price must be a non-negative number, got {}", order.price),
        ));
    }
    if !order.total_amount().is_finite() {
        return Err(Error::validation(
            idx,
            order.order_id,
            "quantity times price exceeds the representable range",
        ));
    }
    Ok(())
}
