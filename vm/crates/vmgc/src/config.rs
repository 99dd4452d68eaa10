//! Configuration Module - GC Tuning Parameters
//!
//! Manages the configuration parameters for vmgc: space sizes for the two
//! generations, post-collection verification and logging switches.

use serde::Serialize;

/// Main configuration for the VM garbage collector
///
/// # Examples
///
/// ```rust
/// use vmgc::GcConfig;
///
/// // Use default configuration
/// let config = GcConfig::default();
///
/// // Small heap that re-verifies every thread after each pass
/// let config = GcConfig {
///     young_space_size: 64 * 1024,
///     verify_after_gc: true,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct GcConfig {
    /// Young space size in bytes
    ///
    /// New objects are bump allocated here. A young pass promotes every
    /// survivor into the mature space and resets this space.
    /// Default: 4MB
    pub young_space_size: usize,

    /// Mature space size in bytes
    ///
    /// Holds promoted and directly tenured objects. Only a full pass
    /// reclaims objects here.
    /// Default: 64MB
    pub mature_space_size: usize,

    /// Re-walk every thread's frames and scopes after each pass
    ///
    /// Runs `verify_call_frame` over every thread; a dangling reference is
    /// fatal. Expensive, meant for debug builds and tests.
    /// Default: true in debug builds
    pub verify_after_gc: bool,

    /// Enable verbose GC logging to the console
    ///
    /// Default: false
    pub verbose: bool,

    /// Emit console events as JSON lines instead of text
    ///
    /// Default: false
    pub json_log: bool,

    /// Record a phase-end event for every root category of a pass
    ///
    /// Default: true
    pub log_phases: bool,

    /// Logger events kept in memory before the oldest are dropped
    ///
    /// Default: 1024
    pub max_log_events: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            young_space_size: 4 * MB,
            mature_space_size: 64 * MB,
            verify_after_gc: cfg!(debug_assertions),
            verbose: false,
            json_log: false,
            log_phases: true,
            max_log_events: 1024,
        }
    }
}

impl GcConfig {
    /// Validate configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vmgc::GcConfig;
    ///
    /// let config = GcConfig {
    ///     young_space_size: 0,  // Invalid!
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.young_space_size == 0 {
            return Err(ConfigError::InvalidSpaceSize(
                "young_space_size must be > 0".to_string(),
            ));
        }

        if self.mature_space_size == 0 {
            return Err(ConfigError::InvalidSpaceSize(
                "mature_space_size must be > 0".to_string(),
            ));
        }

        if self.young_space_size % WORD != 0 || self.mature_space_size % WORD != 0 {
            return Err(ConfigError::InvalidSpaceSize(format!(
                "space sizes must be multiples of {} bytes",
                WORD
            )));
        }

        // Every young survivor has to fit in the mature space.
        if self.young_space_size > self.mature_space_size {
            return Err(ConfigError::InvalidSpaceSize(
                "young_space_size cannot exceed mature_space_size".to_string(),
            ));
        }

        if self.young_space_size > MAX_SPACE_SIZE || self.mature_space_size > MAX_SPACE_SIZE {
            return Err(ConfigError::InvalidSpaceSize(format!(
                "space sizes are limited to {} bytes",
                MAX_SPACE_SIZE
            )));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - VMGC_YOUNG_SIZE
    /// - VMGC_MATURE_SIZE
    /// - VMGC_VERIFY
    /// - VMGC_VERBOSE
    ///
    /// ```bash
    /// export VMGC_YOUNG_SIZE=1048576
    /// export VMGC_VERIFY=1
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("VMGC_YOUNG_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.young_space_size = size;
            }
        }

        if let Ok(val) = std::env::var("VMGC_MATURE_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.mature_space_size = size;
            }
        }

        if let Ok(val) = std::env::var("VMGC_VERIFY") {
            config.verify_after_gc = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("VMGC_VERBOSE") {
            config.verbose = parse_flag(&val);
        }

        config
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid space size: {0}")]
    InvalidSpaceSize(String),
}

// ============================================================================
// CONSTANTS
// ============================================================================

const WORD: usize = std::mem::size_of::<usize>();
const MB: usize = 1024 * 1024;

/// Upper bound for one space; both spaces live in a fixed address window.
pub const MAX_SPACE_SIZE: usize = 1 << 36;
