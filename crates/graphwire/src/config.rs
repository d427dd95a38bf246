// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: defaults as constants below.
//! - **Level 2 (Per stream)**: an [`IoConfig`] value handed to a stream at
//!   construction time.
//! - **Level 3 (Process)**: a global default in an `ArcSwap`, seeded from
//!   `GRAPHWIRE_*` environment variables on first use and replaceable with
//!   [`set_global`].
//!
//! Both ends of a stream must agree on `small_array_bound`,
//! `no_array_buffers` and `codec`: they change the wire layout. Buffer sizes
//! are local to each end.
//!
//! # Example
//!
//! ```ignore
//! use graphwire::config::{Codec, IoConfig};
//!
//! let config = IoConfig::new()
//!     .with_buffer_size(16 * 1024)
//!     .with_codec(Codec::Hessian);
//! config.validate()?;
//! ```

use arc_swap::ArcSwap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use crate::constants::HEADER_BYTES;
use crate::error::{Error, Result};

// =======================================================================
// Defaults
// =======================================================================

/// Size of the byte-layer buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Size from which the per-type bunch lanes are derived.
pub const DEFAULT_TYPED_BUFFER_SIZE: usize = 8 * 1024;

/// Arrays whose payload reaches this many bytes bypass bunching.
pub const DEFAULT_SMALL_ARRAY_BOUND: usize = 256;

/// Number of direct arrays queued before a bunch is forced out.
pub const DEFAULT_ARRAY_BUFFER: usize = 32;

/// Smallest accepted buffer: must hold a bunch header and the widest element.
pub const MIN_BUFFER_SIZE: usize = 64;

/// Bunch counts travel as `i16`.
const MAX_LANE_CAPACITY: usize = i16::MAX as usize;

// =======================================================================
// Environment keys
// =======================================================================

pub const ENV_BUFFER_SIZE: &str = "GRAPHWIRE_BUFFER_SIZE";
pub const ENV_TYPED_BUFFER_SIZE: &str = "GRAPHWIRE_TYPED_BUFFER_SIZE";
pub const ENV_SMALL_ARRAY_BOUND: &str = "GRAPHWIRE_SMALL_ARRAY_BOUND";
pub const ENV_ARRAY_BUFFER: &str = "GRAPHWIRE_ARRAY_BUFFER";
pub const ENV_NO_ARRAY_BUFFERS: &str = "GRAPHWIRE_NO_ARRAY_BUFFERS";
pub const ENV_ASSERTS: &str = "GRAPHWIRE_ASSERTS";
pub const ENV_CODEC: &str = "GRAPHWIRE_CODEC";
pub const ENV_STATS: &str = "GRAPHWIRE_STATS";

/// Wire codec used for primitive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Codec {
    /// Bunched little-endian fixed-width encoding.
    #[default]
    Native,
    /// Self-describing variable-length Hessian-compatible encoding.
    Hessian,
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Native => write!(f, "native"),
            Codec::Hessian => write!(f, "hessian"),
        }
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "ibis" | "n" => Ok(Codec::Native),
            "hessian" | "h" => Ok(Codec::Hessian),
            other => Err(Error::Config {
                reason: format!("unknown codec '{}'", other),
            }),
        }
    }
}

/// Per-stream settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct IoConfig {
    /// Byte-layer buffer size in bytes.
    pub buffer_size: usize,
    /// Budget from which each bunch lane capacity is derived.
    pub typed_buffer_size: usize,
    /// Payload size in bytes at which an array is sent directly.
    pub small_array_bound: usize,
    /// Direct arrays queued per bunch.
    pub array_buffer: usize,
    /// Bypass bunching entirely and write straight to the byte layer.
    pub no_array_buffers: bool,
    /// Enable internal consistency checks.
    pub asserts: bool,
    pub codec: Codec,
    /// Collect per-stream write statistics.
    pub collect_stats: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            typed_buffer_size: DEFAULT_TYPED_BUFFER_SIZE,
            small_array_bound: DEFAULT_SMALL_ARRAY_BOUND,
            array_buffer: DEFAULT_ARRAY_BUFFER,
            no_array_buffers: false,
            asserts: false,
            codec: Codec::Native,
            collect_stats: false,
        }
    }
}

impl IoConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    #[must_use]
    pub fn with_typed_buffer_size(mut self, size: usize) -> Self {
        self.typed_buffer_size = size;
        self
    }

    #[must_use]
    pub fn with_small_array_bound(mut self, bound: usize) -> Self {
        self.small_array_bound = bound;
        self
    }

    #[must_use]
    pub fn with_array_buffer(mut self, count: usize) -> Self {
        self.array_buffer = count;
        self
    }

    #[must_use]
    pub fn with_no_array_buffers(mut self, disabled: bool) -> Self {
        self.no_array_buffers = disabled;
        self
    }

    #[must_use]
    pub fn with_asserts(mut self, enabled: bool) -> Self {
        self.asserts = enabled;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.collect_stats = enabled;
        self
    }

    /// Defaults overridden by the `GRAPHWIRE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup. Unparsable values are logged and skipped.
    #[must_use]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(key: &str, raw: &str) -> Option<T> {
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("[config] ignoring {}={:?}: not a valid value", key, raw);
                    None
                }
            }
        }

        fn parse_flag(key: &str, raw: &str) -> Option<bool> {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => {
                    log::warn!("[config] ignoring {}={:?}: expected a boolean", key, raw);
                    None
                }
            }
        }

        if let Some(v) = lookup(ENV_BUFFER_SIZE).and_then(|raw| parse(ENV_BUFFER_SIZE, &raw)) {
            self.buffer_size = v;
        }
        if let Some(v) =
            lookup(ENV_TYPED_BUFFER_SIZE).and_then(|raw| parse(ENV_TYPED_BUFFER_SIZE, &raw))
        {
            self.typed_buffer_size = v;
        }
        if let Some(v) =
            lookup(ENV_SMALL_ARRAY_BOUND).and_then(|raw| parse(ENV_SMALL_ARRAY_BOUND, &raw))
        {
            self.small_array_bound = v;
        }
        if let Some(v) = lookup(ENV_ARRAY_BUFFER).and_then(|raw| parse(ENV_ARRAY_BUFFER, &raw)) {
            self.array_buffer = v;
        }
        if let Some(v) =
            lookup(ENV_NO_ARRAY_BUFFERS).and_then(|raw| parse_flag(ENV_NO_ARRAY_BUFFERS, &raw))
        {
            self.no_array_buffers = v;
        }
        if let Some(v) = lookup(ENV_ASSERTS).and_then(|raw| parse_flag(ENV_ASSERTS, &raw)) {
            self.asserts = v;
        }
        if let Some(v) = lookup(ENV_STATS).and_then(|raw| parse_flag(ENV_STATS, &raw)) {
            self.collect_stats = v;
        }
        if let Some(raw) = lookup(ENV_CODEC) {
            match raw.parse() {
                Ok(codec) => self.codec = codec,
                Err(e) => log::warn!("[config] ignoring {}: {}", ENV_CODEC, e),
            }
        }
        self
    }

    /// Reject settings the stream stack cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(Error::Config {
                reason: format!(
                    "buffer_size {} is below the minimum of {}",
                    self.buffer_size, MIN_BUFFER_SIZE
                ),
            });
        }
        if self.typed_buffer_size < MIN_BUFFER_SIZE {
            return Err(Error::Config {
                reason: format!(
                    "typed_buffer_size {} is below the minimum of {}",
                    self.typed_buffer_size, MIN_BUFFER_SIZE
                ),
            });
        }
        if self.array_buffer == 0 || self.array_buffer > MAX_LANE_CAPACITY {
            return Err(Error::Config {
                reason: format!("array_buffer must be in 1..={}", MAX_LANE_CAPACITY),
            });
        }
        Ok(())
    }

    /// Number of elements of `element_size` bytes a bunch lane holds.
    #[inline]
    #[must_use]
    pub fn typed_capacity(&self, element_size: usize) -> usize {
        let budget = self.typed_buffer_size.saturating_sub(HEADER_BYTES);
        (budget / element_size.max(1)).clamp(1, MAX_LANE_CAPACITY)
    }

    /// Smallest array length of `element_size` bytes sent as a direct array.
    #[inline]
    #[must_use]
    pub fn direct_array_threshold(&self, element_size: usize) -> usize {
        self.small_array_bound / element_size.max(1)
    }

    /// Parse a YAML document; absent keys keep their default.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(doc: &str) -> Result<Self> {
        let config: IoConfig = serde_yaml::from_str(doc).map_err(|e| Error::Config {
            reason: format!("yaml: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }
}

static GLOBAL: OnceLock<ArcSwap<IoConfig>> = OnceLock::new();

fn global_slot() -> &'static ArcSwap<IoConfig> {
    GLOBAL.get_or_init(|| {
        let config = IoConfig::from_env();
        match config.validate() {
            Ok(()) => ArcSwap::from_pointee(config),
            Err(e) => {
                log::warn!("[config] environment rejected ({}), using defaults", e);
                ArcSwap::from_pointee(IoConfig::default())
            }
        }
    })
}

/// Process-wide default used by streams built without an explicit config.
#[must_use]
pub fn global() -> Arc<IoConfig> {
    global_slot().load_full()
}

/// Replace the process-wide default. Existing streams keep their copy.
pub fn set_global(config: IoConfig) -> Result<()> {
    config.validate()?;
    log::debug!("[config] global defaults replaced: {:?}", config);
    global_slot().store(Arc::new(config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let config = IoConfig::default();
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.small_array_bound, 256);
        assert_eq!(config.array_buffer, 32);
        assert_eq!(config.codec, Codec::Native);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn lane_capacity_reserves_header() {
        let config = IoConfig::default();
        assert_eq!(config.typed_capacity(1), 8176);
        assert_eq!(config.typed_capacity(8), 1022);
        assert_eq!(config.direct_array_threshold(4), 64);

        let big = IoConfig::default().with_typed_buffer_size(1 << 20);
        assert_eq!(big.typed_capacity(1), i16::MAX as usize);
    }

    #[test]
    fn overrides_apply_and_bad_values_are_skipped() {
        let env: HashMap<&str, &str> = [
            (ENV_BUFFER_SIZE, "4096"),
            (ENV_CODEC, "Hessian"),
            (ENV_ASSERTS, "yes"),
            (ENV_SMALL_ARRAY_BOUND, "lots"),
        ]
        .into_iter()
        .collect();

        let config =
            IoConfig::default().apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.codec, Codec::Hessian);
        assert!(config.asserts);
        assert_eq!(config.small_array_bound, DEFAULT_SMALL_ARRAY_BOUND);
    }

    #[test]
    fn validate_rejects_tiny_buffers() {
        let err = IoConfig::default()
            .with_buffer_size(8)
            .validate()
            .expect_err("8-byte buffer must be rejected");
        assert!(err.to_string().contains("buffer_size 8"));

        let err = IoConfig::default()
            .with_array_buffer(0)
            .validate()
            .expect_err("empty array queue must be rejected");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn codec_parses_case_insensitively() {
        assert_eq!("HESSIAN".parse::<Codec>().ok(), Some(Codec::Hessian));
        assert_eq!(" native ".parse::<Codec>().ok(), Some(Codec::Native));
        assert!("cdr".parse::<Codec>().is_err());
        assert_eq!(Codec::Hessian.to_string(), "hessian");
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn yaml_document_fills_missing_keys() {
        let config = IoConfig::from_yaml_str("buffer_size: 16384\ncodec: hessian\n")
            .expect("valid yaml config");
        assert_eq!(config.buffer_size, 16384);
        assert_eq!(config.codec, Codec::Hessian);
        assert_eq!(config.array_buffer, DEFAULT_ARRAY_BUFFER);
    }
}
