//! GPX output formatter
//!
//! Pins become waypoints, the route becomes a track, and known directions
//! become a second track.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::view::{MarkerKind, ViewFrame};
use chrono::{SecondsFormat, Utc};

/// GPX formatter - outputs a GPX 1.1 document
pub struct GpxFormatter;

fn push_track(gpx: &mut String, name: &str, points: &[Coordinates]) {
    gpx.push_str("  <trk>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", name));
    gpx.push_str("    <trkseg>\n");
    for point in points {
        gpx.push_str(&format!(
            "      <trkpt lat=\"{}\" lon=\"{}\"></trkpt>\n",
            point.lat, point.lng
        ));
    }
    gpx.push_str("    </trkseg>\n");
    gpx.push_str("  </trk>\n");
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints and route track"
    }

    fn format(&self, frame: &ViewFrame, _config: &Config) -> Result<String> {
        let mut gpx = String::new();

        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="trailmark" xmlns="http://www.topografix.com/GPX/1/1">"#);
        gpx.push('\n');

        gpx.push_str("  <metadata>\n");
        gpx.push_str("    <name>trailmark route</name>\n");
        gpx.push_str(&format!(
            "    <time>{}</time>\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        gpx.push_str("  </metadata>\n");

        for marker in &frame.markers {
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                marker.coords.lat, marker.coords.lng
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", marker.label));
            let symbol = match marker.kind {
                MarkerKind::Origin => "Pin, Blue",
                MarkerKind::Destination => "Flag, Red",
            };
            gpx.push_str(&format!("    <sym>{}</sym>\n", symbol));
            gpx.push_str("  </wpt>\n");
        }

        if !frame.polyline.is_empty() {
            push_track(&mut gpx, "Route", &frame.polyline);
        }
        if !frame.directions.is_empty() {
            push_track(&mut gpx, "Directions", &frame.directions);
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::sample_frame;

    #[test]
    fn test_gpx_format() {
        let output = GpxFormatter
            .format(&sample_frame(), &Config::default())
            .unwrap();

        assert!(output.contains(r#"<?xml version="1.0""#));
        assert!(output.contains(r#"<gpx version="1.1""#));
        assert!(output.contains(r#"<wpt lat="51.505" lon="-0.09">"#));
        assert!(output.contains("<name>Destination</name>"));
        assert_eq!(output.matches("<trkpt").count(), 2);
        assert!(!output.contains("<name>Directions</name>"));
        assert!(output.trim_end().ends_with("</gpx>"));
    }

    #[test]
    fn test_gpx_includes_directions_track() {
        let mut frame = sample_frame();
        frame.directions = vec![
            Coordinates::new(51.505, -0.09),
            Coordinates::new(50.0, 1.0),
            Coordinates::new(48.8566, 2.3522),
        ];

        let output = GpxFormatter.format(&frame, &Config::default()).unwrap();

        assert!(output.contains("<name>Directions</name>"));
        assert_eq!(output.matches("<trkpt").count(), 5);
    }

    #[test]
    fn test_gpx_empty_frame_has_no_track() {
        let frame = crate::view::project(&crate::tracker::ViewState::default(), 13);
        let output = GpxFormatter.format(&frame, &Config::default()).unwrap();
        assert!(!output.contains("<trk>"));
        assert!(!output.contains("<wpt"));
    }
}
