//! Standard manifest decoding
//!
//! Parses the complete manifest document as one structured value and runs
//! every `nodes` / `sources` entry through the node constructor. Peak
//! memory is proportional to the full document; for very large manifests
//! the streaming decoder is the cheaper path. This decoder is the
//! behavioral reference the streaming decoder must match exactly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;

use stemma_core::{DbtNode, GraphError};

use crate::selector::SelectorDefinition;

/// Root-level manifest metadata. Consumed opaquely; the schema version is
/// not validated against any version list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub dbt_schema_version: Option<String>,

    #[serde(default)]
    pub dbt_version: Option<String>,
}

/// Decoded manifest content, identical in shape for both decoders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedManifest {
    /// Root metadata fields
    pub metadata: ManifestMetadata,

    /// Validated nodes from the `nodes` and `sources` collections,
    /// keyed by unique id
    pub nodes: HashMap<String, DbtNode>,

    /// Named selector definitions declared by the manifest
    pub selectors: HashMap<String, SelectorDefinition>,
}

/// Raw document shape. Node records stay untyped `Value`s so both decoders
/// share the exact same validation path in `DbtNode::from_record`.
#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    metadata: ManifestMetadata,

    #[serde(default)]
    nodes: HashMap<String, Value>,

    #[serde(default)]
    sources: HashMap<String, Value>,

    #[serde(default)]
    selectors: HashMap<String, SelectorDefinition>,
}

/// Decode a complete manifest document from a byte stream.
///
/// Fails with [`GraphError::MalformedManifest`] when the document is not
/// parseable JSON of the expected top-level shape. Entries lacking a file
/// path are dropped per the external-reference rule; nothing else is
/// silently skipped.
pub fn decode_standard<R: Read>(reader: R) -> Result<DecodedManifest, GraphError> {
    let raw: RawManifest = serde_json::from_reader(reader)
        .map_err(|e| GraphError::MalformedManifest(e.to_string()))?;

    let mut nodes = HashMap::with_capacity(raw.nodes.len() + raw.sources.len());
    for (unique_id, record) in raw.nodes.iter().chain(raw.sources.iter()) {
        if let Some(node) = DbtNode::from_record(unique_id, record) {
            nodes.insert(unique_id.clone(), node);
        }
    }

    Ok(DecodedManifest {
        metadata: raw.metadata,
        nodes,
        selectors: raw.selectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stemma_core::ResourceType;

    const SMALL_MANIFEST: &str = r#"{
        "metadata": {"dbt_schema_version": "https://schemas.getdbt.com/dbt/manifest/v12.json", "dbt_version": "1.8.0"},
        "nodes": {
            "model.jaffle_shop.customers": {
                "resource_type": "model",
                "package_name": "jaffle_shop",
                "original_file_path": "models/customers.sql",
                "depends_on": {"nodes": ["model.jaffle_shop.stg_customers"]},
                "tags": ["daily"],
                "config": {"materialized": "table"}
            },
            "model.external.ghost": {
                "resource_type": "model",
                "package_name": "external"
            }
        },
        "sources": {
            "source.jaffle_shop.raw.orders": {
                "resource_type": "source",
                "package_name": "jaffle_shop",
                "original_file_path": "models/sources.yml"
            }
        }
    }"#;

    #[test]
    fn decode_small_manifest() {
        let decoded = decode_standard(SMALL_MANIFEST.as_bytes()).unwrap();

        assert_eq!(decoded.metadata.dbt_version.as_deref(), Some("1.8.0"));
        assert_eq!(decoded.nodes.len(), 2);

        let customers = &decoded.nodes["model.jaffle_shop.customers"];
        assert_eq!(customers.resource_type, ResourceType::Model);
        assert_eq!(customers.depends_on, vec!["model.jaffle_shop.stg_customers"]);

        // The external entry has no file path and never becomes a node.
        assert!(!decoded.nodes.contains_key("model.external.ghost"));

        // Sources land in the same node mapping.
        assert!(decoded.nodes.contains_key("source.jaffle_shop.raw.orders"));
    }

    #[test]
    fn dangling_dependency_is_retained_verbatim() {
        let decoded = decode_standard(SMALL_MANIFEST.as_bytes()).unwrap();
        let customers = &decoded.nodes["model.jaffle_shop.customers"];

        assert!(!decoded.nodes.contains_key("model.jaffle_shop.stg_customers"));
        assert_eq!(customers.depends_on, vec!["model.jaffle_shop.stg_customers"]);
    }

    #[test]
    fn malformed_manifest_fails_to_decode() {
        let err = decode_standard("{invalid json".as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::MalformedManifest(_)));
    }

    #[test]
    fn empty_document_decodes_to_empty_graph() {
        let decoded = decode_standard("{}".as_bytes()).unwrap();
        assert!(decoded.nodes.is_empty());
        assert!(decoded.selectors.is_empty());
        assert_eq!(decoded.metadata, ManifestMetadata::default());
    }
}
