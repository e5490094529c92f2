//! Fixed access point id range

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Largest range accepted by validation
pub const MAX_RANGE_LEN: u32 = 1024;

fn default_prefix() -> String {
    "ap_".to_string()
}

const fn default_first() -> u32 {
    1
}

const fn default_last() -> u32 {
    16
}

const fn default_width() -> usize {
    2
}

/// The access points shown on the dashboard, e.g. `ap_01..=ap_16`
///
/// The snapshot always lists exactly these ids in ascending order,
/// whatever the devices report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApRange {
    /// Name prefix shared by all ids
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// First number, inclusive
    #[serde(default = "default_first")]
    pub first: u32,
    /// Last number, inclusive
    #[serde(default = "default_last")]
    pub last: u32,
    /// Zero-padded width of the number
    #[serde(default = "default_width")]
    pub width: usize,
}

impl Default for ApRange {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            first: default_first(),
            last: default_last(),
            width: default_width(),
        }
    }
}

impl ApRange {
    /// Creates a range with the default `ap_` prefix and width 2
    #[must_use]
    pub fn new(first: u32, last: u32) -> Self {
        Self {
            first,
            last,
            ..Self::default()
        }
    }

    /// Sets the id prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the zero-padded width
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Formats the id for one number
    #[must_use]
    pub fn id(&self, number: u32) -> String {
        format!("{}{:0width$}", self.prefix, number, width = self.width)
    }

    /// All ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = String> + '_ {
        (self.first..=self.last).map(|n| self.id(n))
    }

    /// Number of ids in the range
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    /// Returns true if the range holds no id
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `ap_id` is one of the ids of this range
    #[must_use]
    pub fn contains(&self, ap_id: &str) -> bool {
        ap_id
            .strip_prefix(self.prefix.as_str())
            .filter(|digits| digits.len() == self.width || self.width == 0)
            .and_then(|digits| digits.parse::<u32>().ok())
            .is_some_and(|n| (self.first..=self.last).contains(&n) && self.id(n) == ap_id)
    }

    /// Checks that the range is non-empty, bounded and formattable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the malformed bound.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.prefix.is_empty() {
            return Err(ConfigError::Validation {
                field: "access_points.prefix".to_string(),
                reason: "prefix cannot be empty".to_string(),
            });
        }
        if self.first > self.last {
            return Err(ConfigError::Validation {
                field: "access_points.last".to_string(),
                reason: format!("last ({}) is below first ({})", self.last, self.first),
            });
        }
        if self.last - self.first >= MAX_RANGE_LEN {
            return Err(ConfigError::Validation {
                field: "access_points.last".to_string(),
                reason: format!("range is larger than {MAX_RANGE_LEN} access points"),
            });
        }
        if self.width > 0 && self.last.to_string().len() > self.width {
            return Err(ConfigError::Validation {
                field: "access_points.width".to_string(),
                reason: format!("{} does not fit in {} digits", self.last, self.width),
            });
        }
        Ok(())
    }
}
