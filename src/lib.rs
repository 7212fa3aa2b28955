//! Route Extractor - OpenAPI 2.0 documentation and route listings for Symfony projects.
//!
//! Routes come from two sources, merged into one ordered list:
//!
//! - `@Route` annotations in PHP docblocks, found by scanning a source tree
//! - the JSON dump written by `bin/console debug:router --format=json`
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively collects source files by extension
//! 2. [`extractor`] - Route model plus the annotation and JSON extractors
//! 3. [`pipeline`] - Runs the active extractors and merges their routes
//! 4. [`openapi_builder`] - Builds the OpenAPI 2.0 document
//! 5. [`validation`] - Structural checks on the built document
//! 6. [`serializer`] - JSON / YAML text and file output
//! 7. [`writer`] - OpenAPI, CSV and text-list writers
//!
//! # Example Usage
//!
//! ```no_run
//! use route_extractor::{
//!     extractor::ExtractionConfig,
//!     pipeline::ExtractionPipeline,
//!     openapi_builder::build_document,
//!     serializer::serialize_json,
//! };
//! use std::path::PathBuf;
//!
//! let mut config = ExtractionConfig::new();
//! config.source_dir = Some(PathBuf::from("./src/Controller"));
//! config.symfony_json = Some(PathBuf::from("./routes.json"));
//!
//! let routes = ExtractionPipeline::new().run(&config).unwrap();
//! let document = build_document(routes.as_slice(), "localhost:8080", "/");
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! For command-line usage see the [`cli`] module.

pub mod cli;
pub mod error;
pub mod extractor;
pub mod openapi_builder;
pub mod pipeline;
pub mod scanner;
pub mod serializer;
pub mod validation;
pub mod writer;
