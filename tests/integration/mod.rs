//! Integration test suite for MDXE
//!
//! End-to-end tests of the compilation pipeline against a scripted transport
//! and an isolated cache directory per test.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cache_behavior**: Cache reuse, expiry, background refresh, concurrent writers
//! - **compile_scenarios**: Export generation, layout selection, failure wrapping
//! - **config_files**: `mdxe.toml` loading and discovery
//! - **domain_allow_list**: Host enforcement across resolve, fetch, and compile
//! - **metadata_partition**: Plain/linked metadata splitting through `compile`

mod cache_behavior;
mod compile_scenarios;
mod config_files;
mod metadata_partition;
