//! Graph assembly
//!
//! The public entry point: probe the manifest size, pick a decoder, build
//! the full node mapping, then filter it through the requested selector.
//! A load either returns a complete, invariant-satisfying graph or an
//! error; no partially constructed graph is ever observable.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use stemma_core::{DbtNode, GraphError, LoadConfig};

use crate::manifest::{decode_standard, DecodedManifest};
use crate::mode::{select_mode, DecodeMode};
use crate::selector::{resolve_selector, DefaultSelectorEvaluator, SelectorEvaluator};
use crate::streaming::decode_streaming;

/// The assembled project graph.
///
/// Immutable from the caller's perspective once returned: re-filtering
/// means loading again, never mutating `nodes` in place.
#[derive(Debug, Clone, PartialEq)]
pub struct DbtGraph {
    /// Every first-class node the manifest declares, keyed by unique id
    pub nodes: HashMap<String, DbtNode>,

    /// The subset selected for the current run. Always a subset of
    /// `nodes`; the full set when no selector was requested.
    pub filtered_nodes: HashMap<String, DbtNode>,
}

impl DbtGraph {
    /// Load a graph from a manifest file.
    ///
    /// The byte size comes from filesystem metadata, without parsing; the
    /// file handle is scoped to this call and released on every exit path.
    pub fn load(manifest_path: &Path, config: &LoadConfig) -> Result<Self, GraphError> {
        let size = std::fs::metadata(manifest_path)
            .map_err(|e| GraphError::Io(manifest_path.display().to_string(), e.to_string()))?
            .len();
        let file = File::open(manifest_path)
            .map_err(|e| GraphError::Io(manifest_path.display().to_string(), e.to_string()))?;

        Self::load_from_reader(file, size, config)
    }

    /// Load a graph from an arbitrary byte stream whose total size is
    /// already known (e.g. a length-prefixed network stream).
    pub fn load_from_reader<R: Read>(
        reader: R,
        byte_size: u64,
        config: &LoadConfig,
    ) -> Result<Self, GraphError> {
        let decoded = match select_mode(config, byte_size) {
            DecodeMode::Streaming => decode_streaming(reader)?,
            DecodeMode::Standard => decode_standard(reader)?,
        };

        Self::from_decoded(decoded, config, &DefaultSelectorEvaluator)
    }

    /// Assemble a graph from already-decoded manifest content, using a
    /// caller-supplied selector evaluator. This is the seam for plugging
    /// in a fuller selector DSL.
    pub fn from_decoded(
        decoded: DecodedManifest,
        config: &LoadConfig,
        evaluator: &dyn SelectorEvaluator,
    ) -> Result<Self, GraphError> {
        let nodes = decoded.nodes;

        let filtered_nodes = match config.selector.as_deref() {
            Some(name) => {
                let selected = resolve_selector(&nodes, &decoded.selectors, name, evaluator)?;
                nodes
                    .iter()
                    .filter(|(unique_id, _)| selected.contains(*unique_id))
                    .map(|(unique_id, node)| (unique_id.clone(), node.clone()))
                    .collect()
            }
            // No selection criterion: the filtered set IS the full set.
            None => nodes.clone(),
        };

        info!(
            nodes = nodes.len(),
            filtered = filtered_nodes.len(),
            "assembled manifest graph"
        );

        Ok(Self {
            nodes,
            filtered_nodes,
        })
    }

    /// Get a node by unique id.
    pub fn get_node(&self, unique_id: &str) -> Option<&DbtNode> {
        self.nodes.get(unique_id)
    }

    /// Count of nodes with the given resource type in the full set.
    pub fn count_by_type(&self, resource_type: stemma_core::ResourceType) -> usize {
        self.nodes
            .values()
            .filter(|node| node.resource_type == resource_type)
            .count()
    }
}
