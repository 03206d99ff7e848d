//! Decode-mode selection
//!
//! A pure policy function decides whether a load uses the streaming
//! decoder, isolated here so the decision is unit-testable without any
//! actual parsing.

use tracing::{debug, warn};

use stemma_core::LoadConfig;

use crate::streaming;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Which decoder a load will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Fully-materializing decoder; the default and always correct.
    Standard,

    /// Incremental decoder for large manifests.
    Streaming,
}

/// Decide whether to use the streaming decoder.
///
/// Streaming is opt-in: `enabled = false` always answers `false`. When
/// enabled, the manifest must be at least `threshold_mb` megabytes
/// (a threshold of zero streams everything) and the streaming capability
/// must be compiled in; without it the answer degrades to `false` and the
/// standard decoder handles the load.
pub fn should_use_streaming(
    enabled: bool,
    threshold_mb: u64,
    manifest_size_bytes: u64,
    streaming_available: bool,
) -> bool {
    if !enabled {
        return false;
    }
    if manifest_size_bytes < threshold_mb.saturating_mul(BYTES_PER_MB) {
        return false;
    }
    streaming_available
}

/// Pick the decode mode for a manifest of `manifest_size_bytes`, probing
/// the compiled-in streaming capability.
pub fn select_mode(config: &LoadConfig, manifest_size_bytes: u64) -> DecodeMode {
    let available = streaming::is_available();
    if should_use_streaming(
        config.enable_streaming,
        config.streaming_threshold_mb,
        manifest_size_bytes,
        available,
    ) {
        debug!(
            manifest_size_bytes,
            threshold_mb = config.streaming_threshold_mb,
            "using streaming manifest decoder"
        );
        return DecodeMode::Streaming;
    }

    // Size and flag wanted streaming but the capability is missing: fall
    // back to standard decoding, visibly.
    if !available
        && should_use_streaming(
            config.enable_streaming,
            config.streaming_threshold_mb,
            manifest_size_bytes,
            true,
        )
    {
        warn!("streaming decode requested but not compiled in; falling back to standard decoding");
    }

    DecodeMode::Standard
}
