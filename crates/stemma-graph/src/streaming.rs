//! Streaming manifest decoding
//!
//! Incrementally decodes the structural regions the graph needs — root
//! metadata, the `nodes` / `sources` collections, and the `selectors`
//! table — without holding the full document text or a fully decoded
//! document tree in memory. Each node record is materialized alone, run
//! through the node constructor, and dropped before the next entry is
//! read, so peak memory tracks the largest single entry plus reader
//! buffering rather than total document size.
//!
//! The capability is compiled in behind the `streaming` cargo feature.
//! Callers probe [`is_available`] before selecting this decoder; invoking
//! it without the feature fails with `StreamingUnavailable` rather than
//! silently falling back.

/// Whether the streaming decoder is compiled into this build.
pub fn is_available() -> bool {
    cfg!(feature = "streaming")
}

#[cfg(feature = "streaming")]
mod imp {
    use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::fmt;
    use std::io::{BufReader, Read};

    use stemma_core::{DbtNode, GraphError};

    use crate::manifest::DecodedManifest;

    /// Visits one `nodes` / `sources` collection entry-by-entry, building
    /// nodes into the shared mapping as they stream past.
    struct NodeCollectionSeed<'a> {
        nodes: &'a mut HashMap<String, DbtNode>,
    }

    impl<'de> DeserializeSeed<'de> for NodeCollectionSeed<'_> {
        type Value = ();

        fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }
    }

    impl<'de> Visitor<'de> for NodeCollectionSeed<'_> {
        type Value = ();

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of unique id to node record")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            while let Some(unique_id) = map.next_key::<String>()? {
                // One raw record lives at a time; it is dropped before the
                // next entry is pulled from the stream.
                let record: Value = map.next_value()?;
                if let Some(node) = DbtNode::from_record(&unique_id, &record) {
                    self.nodes.insert(unique_id, node);
                }
            }
            Ok(())
        }
    }

    struct ManifestVisitor;

    impl<'de> Visitor<'de> for ManifestVisitor {
        type Value = DecodedManifest;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a manifest document object")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut decoded = DecodedManifest::default();
            while let Some(key) = map.next_key::<String>()? {
                match key.as_str() {
                    "metadata" => decoded.metadata = map.next_value()?,
                    "nodes" | "sources" => {
                        map.next_value_seed(NodeCollectionSeed {
                            nodes: &mut decoded.nodes,
                        })?;
                    }
                    "selectors" => decoded.selectors = map.next_value()?,
                    // macros, docs, parent_map, child_map, ... are skipped
                    // without being materialized.
                    _ => {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
            }
            Ok(decoded)
        }
    }

    /// Incrementally decode a manifest document from a byte stream.
    ///
    /// Produces output field-for-field identical to
    /// [`crate::manifest::decode_standard`] for any well-formed manifest.
    /// Fails with [`GraphError::MalformedManifest`] on any structural parse
    /// error at the point it is detected; malformed input never yields a
    /// silently truncated result.
    pub fn decode_streaming<R: Read>(reader: R) -> Result<DecodedManifest, GraphError> {
        let mut de = serde_json::Deserializer::from_reader(BufReader::new(reader));
        let decoded = Deserializer::deserialize_map(&mut de, ManifestVisitor)
            .map_err(|e| GraphError::MalformedManifest(e.to_string()))?;
        de.end()
            .map_err(|e| GraphError::MalformedManifest(e.to_string()))?;
        Ok(decoded)
    }
}

#[cfg(feature = "streaming")]
pub use imp::decode_streaming;

/// Stub used when the `streaming` feature is compiled out. The mode
/// selector never picks streaming in that build, so this is only
/// reachable by calling the decoder directly.
#[cfg(not(feature = "streaming"))]
pub fn decode_streaming<R: std::io::Read>(
    _reader: R,
) -> Result<crate::manifest::DecodedManifest, stemma_core::GraphError> {
    Err(stemma_core::GraphError::StreamingUnavailable)
}
