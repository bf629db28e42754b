//! Map URL output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::view::ViewFrame;

/// URL formatter - links to the frame's center on a map site
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format with a specific provider instead of the configured default
    pub fn format_with_provider(
        &self,
        frame: &ViewFrame,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        config.format_url(provider, frame.center, frame.zoom)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the current view"
    }

    fn format(&self, frame: &ViewFrame, config: &Config) -> Result<String> {
        self.format_with_provider(frame, config, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::sample_frame;

    #[test]
    fn test_url_format_default_provider() {
        let output = UrlFormatter
            .format(&sample_frame(), &Config::default())
            .unwrap();
        assert_eq!(output, "https://www.openstreetmap.org/#map=13/51.505/-0.09");
    }

    #[test]
    fn test_url_format_with_provider() {
        let output = UrlFormatter
            .format_with_provider(&sample_frame(), &Config::default(), Some("google"))
            .unwrap();
        assert!(output.contains("google.com/maps/@51.505,-0.09,13z"));
    }
}
