// Text report: missing values, descriptive statistics and narrative insights

use crate::aggregate::{Aggregates, Pivot};
use crate::order::{Order, COLUMNS};
use crate::stats::{self, Summary};
use crate::table::OrderTable;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

const HEAD_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub row_count: usize,
    pub head_headers: Vec<String>,
    pub head: Vec<Vec<String>>,
    pub missing: Vec<(&'static str, usize)>,
    pub statistics: Vec<(&'static str, Summary)>,
    pub average_basket_size: f64,
    pub insights: Vec<String>,
}

impl Report {
    pub fn build(table: &OrderTable, aggregates: &Aggregates) -> Self {
        let mut head_headers: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        head_headers.push("TotalAmount".to_string());
        head_headers.push("AgeGroup".to_string());

        let head = table
            .rows()
            .iter()
            .take(HEAD_ROWS)
            .map(|row| {
                let o = row.order();
                vec![
                    o.order_id.to_string(),
                    o.user_id.clone(),
                    o.gender.clone(),
                    o.age.to_string(),
                    o.category.clone(),
                    o.quantity.to_string(),
                    o.price.to_string(),
                    o.order_date.to_string(),
                    row.total_amount().to_string(),
                    row.age_bucket()
                        .and_then(|b| table.buckets().label(b))
                        .unwrap_or("-")
                        .to_string(),
                ]
            })
            .collect();

        Self {
            row_count: table.len(),
            head_headers,
            head,
            missing: missing_values(table),
            statistics: numeric_statistics(table),
            average_basket_size: aggregates.average_basket_size,
            insights: insights(aggregates),
        }
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{}", self)?;
        out.flush()
    }
}

/// Missing values per persisted column. Text fields count as missing when
/// blank; numeric and date fields are typed and always present.
pub fn missing_values(table: &OrderTable) -> Vec<(&'static str, usize)> {
    COLUMNS
        .iter()
        .map(|&column| {
            let count = match column {
                "UserID" => count_blank(table, |o| o.user_id.as_str()),
                "Gender" => count_blank(table, |o| o.gender.as_str()),
                "ProductCategory" => count_blank(table, |o| o.category.as_str()),
                _ => 0,
            };
            (column, count)
        })
        .collect()
}

fn count_blank(table: &OrderTable, field: fn(&Order) -> &str) -> usize {
    table.orders().filter(|o| field(o).trim().is_empty()).count()
}

pub fn numeric_statistics(table: &OrderTable) -> Vec<(&'static str, Summary)> {
    let columns: [(&'static str, Vec<f64>); 5] = [
        ("OrderID", table.orders().map(|o| o.order_id as f64).collect()),
        ("Age", table.orders().map(|o| o.age as f64).collect()),
        ("Quantity", table.orders().map(|o| o.quantity as f64).collect()),
        ("Price", table.orders().map(|o| o.price).collect()),
        ("TotalAmount", table.rows().iter().map(|r| r.total_amount()).collect()),
    ];
    columns
        .into_iter()
        .filter_map(|(name, values)| stats::describe(&values).map(|s| (name, s)))
        .collect()
}

/// Category with the highest revenue; ties go to the first category by name
pub fn top_category(revenue: &BTreeMap<String, f64>) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (category, &amount) in revenue {
        if best.map_or(true, |(_, b)| amount > b) {
            best = Some((category.as_str(), amount));
        }
    }
    best
}

/// Day with the highest revenue; ties go to the earliest day
pub fn peak_day(daily: &BTreeMap<NaiveDate, f64>) -> Option<(NaiveDate, f64)> {
    let mut best: Option<(NaiveDate, f64)> = None;
    for (&date, &amount) in daily {
        if best.map_or(true, |(_, b)| amount > b) {
            best = Some((date, amount));
        }
    }
    best
}

/// Genders with the most orders, and that order count
pub fn leading_genders(demand: &Pivot<usize>) -> Option<(Vec<&str>, usize)> {
    let totals: Vec<(&str, usize)> = demand
        .row_labels
        .iter()
        .zip(demand.rows())
        .map(|(g, row)| (g.as_str(), row.iter().sum()))
        .collect();
    let max = totals.iter().map(|(_, n)| *n).max()?;
    let leaders = totals
        .iter()
        .filter(|(_, n)| *n == max)
        .map(|(g, _)| *g)
        .collect();
    Some((leaders, max))
}

/// Most bought category in the youngest age bucket that has any orders
pub fn youngest_favourite(pivot: &Pivot<i128>) -> Option<(&str, &str, i128)> {
    (0..pivot.column_labels.len()).find_map(|c| {
        let column = pivot.column(c);
        let mut best: Option<(usize, i128)> = None;
        for (r, &qty) in column.iter().enumerate() {
            if qty > 0 && best.map_or(true, |(_, b)| qty > b) {
                best = Some((r, qty));
            }
        }
        best.map(|(r, qty)| {
            (
                pivot.column_labels[c].as_str(),
                pivot.row_labels[r].as_str(),
                qty,
            )
        })
    })
}

pub fn insights(aggregates: &Aggregates) -> Vec<String> {
    let mut out = Vec::new();

    if let Some((category, amount)) = top_category(&aggregates.revenue_by_category) {
        out.push(format!(
            "{} category generated the highest revenue ({:.2}).",
            category, amount
        ));
    }

    if let Some((leaders, count)) = leading_genders(&aggregates.gender_demand) {
        let total: usize = aggregates.gender_demand.rows().iter().flatten().sum();
        if leaders.len() == 1 {
            out.push(format!(
                "{} users placed the most orders ({} of {}).",
                leaders[0], count, total
            ));
        } else {
            out.push(format!(
                "{} users placed the same number of orders ({} each).",
                leaders.join(" and "),
                count
            ));
        }
    }

    out.push(format!(
        "The average basket size is around {:.2} items per order.",
        aggregates.average_basket_size
    ));

    if let Some((date, amount)) = peak_day(&aggregates.daily_revenue) {
        out.push(format!(
            "Sales peaked on {} ({}) at {:.2}.",
            date,
            date.format("%A"),
            amount
        ));
    }

    if let Some((bucket, category, qty)) = youngest_favourite(&aggregates.age_category_pivot) {
        out.push(format!(
            "{} is the most popular category among users aged {} ({} items).",
            category, bucket, qty
        ));
    }

    out
}

fn write_table(f: &mut fmt::Formatter<'_>, headers: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let widths: Vec<usize> = (0..headers.len())
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .chain(std::iter::once(&headers[i]))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_row(f, headers, &widths)?;
    for row in rows {
        write_row(f, row, &widths)?;
    }
    Ok(())
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            write!(f, "  ")?;
        }
        write!(f, "{:>width$}", cell, width = widths.get(i).copied().unwrap_or(0))?;
    }
    writeln!(f)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows: {}", self.row_count)?;

        writeln!(f, "\nChecking for missing values:")?;
        for (column, count) in &self.missing {
            writeln!(f, "{:<16}{:>4}", column, count)?;
        }

        writeln!(f, "\nSample Data:")?;
        write_table(f, &self.head_headers, &self.head)?;

        writeln!(f, "\n--- Summary Statistics ---")?;
        let mut headers = vec![String::new()];
        headers.extend(self.statistics.iter().map(|(name, _)| name.to_string()));
        let stat_rows: Vec<Vec<String>> = [
            "count", "mean", "std", "min", "25%", "50%", "75%", "max",
        ]
        .iter()
        .map(|&stat| {
            let mut row = vec![stat.to_string()];
            row.extend(self.statistics.iter().map(|(_, s)| match stat {
                "count" => format!("{:.2}", s.count as f64),
                "mean" => format!("{:.2}", s.mean),
                "std" => s.std.map_or_else(|| "NaN".to_string(), |v| format!("{:.2}", v)),
                "min" => format!("{:.2}", s.min),
                "25%" => format!("{:.2}", s.q1),
                "50%" => format!("{:.2}", s.median),
                "75%" => format!("{:.2}", s.q3),
                _ => format!("{:.2}", s.max),
            }));
            row
        })
        .collect();
        write_table(f, &headers, &stat_rows)?;

        writeln!(
            f,
            "\nAverage Basket Size: {:.2} items per order",
            self.average_basket_size
        )?;

        writeln!(f, "\n--- Key Insights ---")?;
        for (i, insight) in self.insights.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, insight)?;
        }
        Ok(())
    }
}
