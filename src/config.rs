//! Configuration passed explicitly to decoders and registry clients.

/// Crate-wide behaviour switches.
///
/// Built once by the caller and handed to [`DatumReader::with_config`]
/// (through [`DecoderConfig`]) and to
/// [`CachingRegistry::new`](crate::registry::CachingRegistry::new).
///
/// [`DatumReader::with_config`]: crate::reader::DatumReader::with_config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrosswindConfig {
    /// Look a schema up by fingerprint before registering it (default: true).
    pub use_cacheable_schema_registration: bool,
    /// Seed records with union member index or caller-supplied fields (default: true).
    pub use_custom_initial_record: bool,
}

impl Default for CrosswindConfig {
    fn default() -> Self {
        Self {
            use_cacheable_schema_registration: true,
            use_custom_initial_record: true,
        }
    }
}

impl CrosswindConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable fingerprint lookup before registration.
    pub fn with_cacheable_schema_registration(mut self, enabled: bool) -> Self {
        self.use_cacheable_schema_registration = enabled;
        self
    }

    /// Enable or disable seeded record construction.
    pub fn with_custom_initial_record(mut self, enabled: bool) -> Self {
        self.use_custom_initial_record = enabled;
        self
    }

    /// The part of the configuration the datum reader consults.
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            use_custom_initial_record: self.use_custom_initial_record,
        }
    }
}

/// Decoder-side settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// When off, every record starts empty: no union member index is
    /// recorded and seeds passed to `read_with_seed` are ignored.
    pub use_custom_initial_record: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        CrosswindConfig::default().decoder_config()
    }
}

impl From<&CrosswindConfig> for DecoderConfig {
    fn from(config: &CrosswindConfig) -> Self {
        config.decoder_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = CrosswindConfig::default();
        assert!(config.use_cacheable_schema_registration);
        assert!(config.use_custom_initial_record);
        assert!(DecoderConfig::default().use_custom_initial_record);
    }

    #[test]
    fn test_builder() {
        let config = CrosswindConfig::new()
            .with_cacheable_schema_registration(false)
            .with_custom_initial_record(false);
        assert!(!config.use_cacheable_schema_registration);
        assert!(!DecoderConfig::from(&config).use_custom_initial_record);
    }
}
