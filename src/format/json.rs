//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::view::ViewFrame;

/// JSON formatter - outputs the full frame as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON view frame"
    }

    fn format(&self, frame: &ViewFrame, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::sample_frame;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter
            .format(&sample_frame(), &Config::default())
            .unwrap();

        let parsed: ViewFrame = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, sample_frame());
    }
}
