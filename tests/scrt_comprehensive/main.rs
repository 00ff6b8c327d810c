//! SCRT Comprehensive Test Suite
//!
//! End-to-end coverage of the schema model and the stream codec through the
//! `scrt` facade.
//!
//! ## Modules
//!
//! - `schema_tests`: fingerprints, Ref resolution, defaults
//! - `codec_tests`: column encodings, page boundaries, defaults on read
//! - `stream_tests`: files, pooling, bindings, views, statistics
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test scrt_comprehensive
//!
//! # Run one module
//! cargo test --test scrt_comprehensive codec_tests::
//!
//! # Run with log output
//! cargo test --test scrt_comprehensive -- --nocapture
//! ```

mod common;

mod codec_tests;
mod schema_tests;
mod stream_tests;
