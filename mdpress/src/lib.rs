//! Expose mdpress's command implementations for integration testing. The
//! analysis engine itself lives in `mdpress-analysis`.
pub mod cli;
pub mod convert;
pub mod lint;
