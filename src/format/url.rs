//! Map URL output formatter

use crate::address::ResolvedAddress;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::OutputFormatter;
use crate::resolver::ResolverSnapshot;

/// URL formatter - map link for the position (or current map center)
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format a confirmed address with an optional provider override
    pub fn format_with_provider(
        &self,
        address: &ResolvedAddress,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        let position = address.position.ok_or_else(|| {
            Error::Config(format!(
                "Address has no position to link to: {}",
                address.display_address
            ))
        })?;
        config.format_url(provider, position)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the position"
    }

    fn format_snapshot(&self, snapshot: &ResolverSnapshot, config: &Config) -> Result<String> {
        config.format_url(None, snapshot.map_center)
    }

    fn format_address(&self, address: &ResolvedAddress, config: &Config) -> Result<String> {
        self.format_with_provider(address, config, None)
    }
}
