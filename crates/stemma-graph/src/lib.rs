//! dbt manifest decoding and graph assembly
//!
//! This crate handles:
//! - Decoding manifest.json, either fully materialized or incrementally
//!   (the `streaming` feature)
//! - Choosing between the two decoders per manifest size and configuration
//! - Resolving named YAML selectors to node-id sets
//! - Assembling the filtered project graph handed to orchestration

pub mod dag;
pub mod graph;
pub mod manifest;
pub mod mode;
pub mod selector;
pub mod streaming;

pub use dag::{DependencyGraph, NodeId};
pub use graph::DbtGraph;
pub use manifest::{decode_standard, DecodedManifest, ManifestMetadata};
pub use mode::{select_mode, should_use_streaming, DecodeMode};
pub use selector::{
    resolve_selector, DefaultSelectorEvaluator, SelectorDefinition, SelectorEvaluator,
};
pub use streaming::decode_streaming;
