//! Error taxonomy for manifest loading.

/// Errors surfaced by manifest decoding and graph assembly.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The manifest could not be read from its source.
    #[error("failed to read manifest {0}: {1}")]
    Io(String, String),

    /// The manifest bytes do not parse as the expected JSON structure.
    /// Never retried: reparsing the same bad bytes cannot succeed.
    #[error("failed to parse manifest: {0}")]
    MalformedManifest(String),

    /// A named selector was requested but the manifest declares no
    /// selector with that name.
    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    /// Streaming decode was invoked without the `streaming` feature
    /// compiled in. The mode selector degrades to standard decoding
    /// before this can happen in a normal `load`.
    #[error("streaming decode requested but the streaming capability is not available")]
    StreamingUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_not_found_message_names_the_selector() {
        let err = GraphError::SelectorNotFound("nightly".to_string());
        assert!(err.to_string().contains("nightly"));
    }
}
