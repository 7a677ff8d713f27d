//! JSON output formatter

use crate::address::ResolvedAddress;
use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::resolver::ResolverSnapshot;

/// JSON formatter - pretty-printed serde output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON"
    }

    fn format_snapshot(&self, snapshot: &ResolverSnapshot, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(snapshot)?)
    }

    fn format_address(&self, address: &ResolvedAddress, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(address)?)
    }
}
