// Syntax tree for the age-bucket notation

/// One side of an interval: the bound value and whether it is included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub value: i64,
    pub inclusive: bool,
}

/// A parsed bucket definition, e.g. `20-25=[20,25]` or `(25,30]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDef {
    /// Explicit label; `None` when the definition omits `label=`
    pub label: Option<String>,
    pub lower: Bound,
    pub upper: Bound,
}
