// Age-bucket notation parser module

pub mod ast;
pub mod buckets;
pub mod lexer;

// Public API re-exports
pub use ast::{Bound, BucketDef};
pub use buckets::parse_bucket_spec;
