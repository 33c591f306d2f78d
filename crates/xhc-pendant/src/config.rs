//! Pendant session configuration.

use hid_xhc_protocol::{DEFAULT_DISPLAY_DAY, XHC_VENDOR_ID, XhcModel, product_ids};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PendantError, PendantResult};

/// Default signal name prefix.
pub const DEFAULT_COMPONENT_NAME: &str = "xhc-whb04b-6";

/// Default receive timeout of one poll cycle, in milliseconds.
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 500;

/// Configuration of one pendant session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendantConfig {
    /// Prefix of every published signal name.
    pub component_name: String,
    /// USB vendor ID the transport should claim.
    pub vendor_id: u16,
    /// USB product ID the transport should claim.
    pub product_id: u16,
    /// Longest wait for one input report before the cycle proceeds.
    pub receive_timeout_ms: u64,
    /// Show machine (absolute) instead of workpiece (relative) coordinates.
    pub display_machine_coordinates: bool,
    /// Day byte written into display updates.
    pub display_day: u8,
    /// Mirrored to the `require_pendant` signal.
    pub require_pendant: bool,
    /// Move the position inputs from the jog wheel, for running without a
    /// motion controller.
    pub simulate_machine: bool,
}

impl Default for PendantConfig {
    fn default() -> Self {
        Self {
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            vendor_id: XHC_VENDOR_ID,
            product_id: product_ids::WHB04B_6,
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
            display_machine_coordinates: false,
            display_day: DEFAULT_DISPLAY_DAY,
            require_pendant: false,
            simulate_machine: false,
        }
    }
}

impl PendantConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> PendantResult<()> {
        if self.component_name.trim().is_empty() {
            return Err(PendantError::invalid_configuration(
                "component_name must not be empty",
            ));
        }
        if self.component_name.contains(char::is_whitespace) {
            return Err(PendantError::invalid_configuration(
                "component_name must not contain whitespace",
            ));
        }
        if self.receive_timeout_ms == 0 {
            return Err(PendantError::invalid_configuration(
                "receive_timeout_ms must be greater than 0",
            ));
        }
        if !self.model().is_known() {
            return Err(PendantError::invalid_configuration(format!(
                "product_id 0x{:04x} is not a known WHB04B model",
                self.product_id
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result is invalid.
    pub fn from_json_str(json: &str) -> PendantResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PendantError::invalid_configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> PendantResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PendantError::invalid_configuration(e.to_string()))
    }

    /// Receive timeout as a [`Duration`].
    #[must_use]
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Pendant model selected by the product ID.
    #[must_use]
    pub fn model(&self) -> XhcModel {
        XhcModel::from_product_id(self.product_id)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> PendantConfigBuilder {
        PendantConfigBuilder::default()
    }
}

/// Builder for `PendantConfig`.
#[derive(Debug, Default)]
pub struct PendantConfigBuilder {
    config: PendantConfig,
}

impl PendantConfigBuilder {
    /// Set the signal name prefix.
    #[must_use]
    pub fn component_name(mut self, name: impl Into<String>) -> Self {
        self.config.component_name = name.into();
        self
    }

    /// Set the USB product ID.
    #[must_use]
    pub fn product_id(mut self, product_id: u16) -> Self {
        self.config.product_id = product_id;
        self
    }

    /// Set the receive timeout in milliseconds.
    #[must_use]
    pub fn receive_timeout_ms(mut self, ms: u64) -> Self {
        self.config.receive_timeout_ms = ms;
        self
    }

    /// Show machine coordinates on the display.
    #[must_use]
    pub fn display_machine_coordinates(mut self, enabled: bool) -> Self {
        self.config.display_machine_coordinates = enabled;
        self
    }

    /// Set the display day byte.
    #[must_use]
    pub fn display_day(mut self, day: u8) -> Self {
        self.config.display_day = day;
        self
    }

    /// Set the `require_pendant` flag.
    #[must_use]
    pub fn require_pendant(mut self, required: bool) -> Self {
        self.config.require_pendant = required;
        self
    }

    /// Enable the built-in machine simulation.
    #[must_use]
    pub fn simulate_machine(mut self, enabled: bool) -> Self {
        self.config.simulate_machine = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> PendantResult<PendantConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
