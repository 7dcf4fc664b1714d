//! Data module - fetching, normalization and filtering

pub mod columns;
mod fetcher;
mod filter;
mod normalizer;
pub mod regions;

pub use fetcher::{DataFetcher, FetchError};
pub use filter::{apply as apply_filter, FilterError, FilterMode};
pub use normalizer::{normalize, NormalizeError};

#[cfg(test)]
pub(crate) use fetcher::tests as fetcher_tests;
