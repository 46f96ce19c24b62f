#![deny(unsafe_code)]

pub mod apply;
pub mod canonical;
pub mod error;
pub mod matcher;

pub use apply::apply_mapping;
pub use canonical::{
    CanonicalDrug, DEFAULT_CLUSTER_THRESHOLD, LeaderClusterer, NameClusterer, build_canonical,
    canonical_table,
};
pub use error::{ResolveError, Result};
pub use matcher::{DEFAULT_TOLERANCE, NameMapping, match_names, similarity};
