//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::view::{MarkerKind, ViewFrame};

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, frame: &ViewFrame, _config: &Config) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("Center: {} (zoom {})\n", frame.center, frame.zoom));

        for marker in &frame.markers {
            let label = match marker.kind {
                MarkerKind::Origin => "Origin",
                MarkerKind::Destination => "Destination",
            };
            output.push_str(&format!("{}: {} [{}]\n", label, marker.coords, marker.label));
        }

        output.push_str(&format!("\nRoute ({} points):\n", frame.polyline.len()));
        for (i, point) in frame.polyline.iter().enumerate() {
            output.push_str(&format!("  {:>3}. {}\n", i + 1, point));
        }

        if !frame.directions.is_empty() {
            output.push_str(&format!("\nDirections: {} points\n", frame.directions.len()));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::sample_frame;

    #[test]
    fn test_text_format() {
        let output = TextFormatter
            .format(&sample_frame(), &Config::default())
            .unwrap();

        assert!(output.starts_with("Center: (51.505000, -0.090000) (zoom 13)"));
        assert!(output.contains("Origin: (51.505000, -0.090000) [You are here]"));
        assert!(output.contains("Destination: (48.856600, 2.352200) [Destination]"));
        assert!(output.contains("Route (2 points):"));
        assert!(!output.contains("Directions"));
    }
}
