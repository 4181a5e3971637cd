// Age buckets with explicit boundary inclusivity

use crate::error::{Error, Result};
use crate::parser::{self, BucketDef};
use std::fmt;
use std::str::FromStr;

/// Which side of each edge-derived bucket is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// `(a, b]`
    #[default]
    RightClosed,
    /// `[a, b)`
    LeftClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeBucket {
    pub label: String,
    pub lower: i64,
    pub upper: i64,
    pub lower_inclusive: bool,
    pub upper_inclusive: bool,
}

impl AgeBucket {
    pub fn contains(&self, age: i64) -> bool {
        let above = if self.lower_inclusive {
            age >= self.lower
        } else {
            age > self.lower
        };
        let below = if self.upper_inclusive {
            age <= self.upper
        } else {
            age < self.upper
        };
        above && below
    }

    /// Smallest integer age inside the bucket
    fn first_age(&self) -> i64 {
        if self.lower_inclusive {
            self.lower
        } else {
            self.lower.saturating_add(1)
        }
    }

    /// Largest integer age inside the bucket
    fn last_age(&self) -> i64 {
        if self.upper_inclusive {
            self.upper
        } else {
            self.upper.saturating_sub(1)
        }
    }

    /// True if no integer age falls inside the bucket
    fn is_degenerate(&self) -> bool {
        self.first_age() > self.last_age()
    }

    /// True if the two buckets share at least one integer age
    fn overlaps(&self, other: &AgeBucket) -> bool {
        self.first_age().max(other.first_age()) <= self.last_age().min(other.last_age())
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}{},{}{}",
            self.label,
            if self.lower_inclusive { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_inclusive { ']' } else { ')' },
        )
    }
}

impl From<BucketDef> for AgeBucket {
    fn from(def: BucketDef) -> Self {
        let label = def
            .label
            .unwrap_or_else(|| format!("{}-{}", def.lower.value, def.upper.value));
        AgeBucket {
            label,
            lower: def.lower.value,
            upper: def.upper.value,
            lower_inclusive: def.lower.inclusive,
            upper_inclusive: def.upper.inclusive,
        }
    }
}

/// Ordered, non-overlapping set of labelled age intervals.
///
/// Ages outside every interval are *unbucketed*: [`AgeBuckets::assign`]
/// returns `None` for them instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeBuckets {
    buckets: Vec<AgeBucket>,
}

impl AgeBuckets {
    pub fn new(mut buckets: Vec<AgeBucket>) -> Result<Self> {
        if buckets.is_empty() {
            return Err(Error::BucketSpec("at least one bucket is required".into()));
        }
        for bucket in &buckets {
            if bucket.is_degenerate() {
                return Err(Error::BucketSpec(format!("bucket {} is empty", bucket)));
            }
        }

        buckets.sort_by_key(|b| (b.first_age(), b.last_age()));

        for pair in buckets.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(Error::BucketSpec(format!(
                    "buckets {} and {} overlap",
                    pair[0], pair[1]
                )));
            }
        }
        for (i, bucket) in buckets.iter().enumerate() {
            if buckets[..i].iter().any(|b| b.label == bucket.label) {
                return Err(Error::BucketSpec(format!(
                    "duplicate bucket label '{}'",
                    bucket.label
                )));
            }
        }

        Ok(Self { buckets })
    }

    /// Build consecutive buckets from ascending edges.
    ///
    /// `include_lowest` closes the outermost open edge: the lower edge of the
    /// first bucket under [`BoundaryPolicy::RightClosed`], the upper edge of
    /// the last bucket under [`BoundaryPolicy::LeftClosed`].
    pub fn from_edges<S: AsRef<str>>(
        edges: &[i64],
        labels: &[S],
        policy: BoundaryPolicy,
        include_lowest: bool,
    ) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::BucketSpec("at least two edges are required".into()));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::BucketSpec(format!(
                "edges must be strictly increasing: {:?}",
                edges
            )));
        }
        if labels.len() != edges.len() - 1 {
            return Err(Error::BucketSpec(format!(
                "{} edges need {} labels, got {}",
                edges.len(),
                edges.len() - 1,
                labels.len()
            )));
        }

        let last = edges.len() - 2;
        let buckets = edges
            .windows(2)
            .zip(labels)
            .enumerate()
            .map(|(i, (w, label))| {
                let (lower_inclusive, upper_inclusive) = match policy {
                    BoundaryPolicy::RightClosed => (include_lowest && i == 0, true),
                    BoundaryPolicy::LeftClosed => (true, include_lowest && i == last),
                };
                AgeBucket {
                    label: label.as_ref().to_string(),
                    lower: w[0],
                    upper: w[1],
                    lower_inclusive,
                    upper_inclusive,
                }
            })
            .collect();

        Self::new(buckets)
    }

    /// Index of the bucket containing `age`, or `None` when unbucketed
    pub fn assign(&self, age: i64) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(age))
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.buckets.get(index).map(|b| b.label.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.label.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgeBucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for AgeBuckets {
    /// `[20,25]`, `(25,30]`, `(30,35]`, `(35,40]`
    fn default() -> Self {
        let edges = [20, 25, 30, 35, 40];
        let labels = ["20-25", "26-30", "31-35", "36-40"];
        let buckets = edges
            .windows(2)
            .zip(labels)
            .enumerate()
            .map(|(i, (w, label))| AgeBucket {
                label: label.to_string(),
                lower: w[0],
                upper: w[1],
                lower_inclusive: i == 0,
                upper_inclusive: true,
            })
            .collect();
        Self { buckets }
    }
}

impl FromStr for AgeBuckets {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let defs = parser::parse_bucket_spec(s).map_err(Error::BucketSpec)?;
        Self::new(defs.into_iter().map(AgeBucket::from).collect())
    }
}

impl fmt::Display for AgeBuckets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, bucket) in self.buckets.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", bucket)?;
        }
        Ok(())
    }
}
