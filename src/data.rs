// src/data.rs - Session export: per-frame CSV, intent log and HTML summary
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;

use crate::gestures::Gesture;
use crate::intents::IntentEvent;
use crate::landmarks::Finger;
use crate::pipeline::FrameOutput;

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: usize,
    timestamp: f64,
    hand_present: bool,
    gesture: &'static str,
    stable_frames: u32,

    thumb_extended: Option<bool>,
    index_extended: Option<bool>,
    middle_extended: Option<bool>,
    ring_extended: Option<bool>,
    pinky_extended: Option<bool>,

    index_curled: Option<bool>,
    middle_curled: Option<bool>,
    ring_curled: Option<bool>,
    pinky_curled: Option<bool>,

    thumb_index_distance: Option<f64>,
    thumb_middle_distance: Option<f64>,
    thumb_ring_distance: Option<f64>,
    thumb_pinky_distance: Option<f64>,

    peace_angle: Option<f64>,
    pointer_x: Option<f64>,
    pointer_y: Option<f64>,
}

#[derive(Debug, Serialize)]
struct IntentRecord {
    timestamp: f64,
    intent: &'static str,
    mode: &'static str,
    scroll_notches: Option<i32>,
}

/// Collects a session's frames and intents and writes them under
/// `<output_dir>/<session_name>/`.
pub struct SessionExporter {
    output_dir: PathBuf,
    session_name: String,
    frames: Vec<(FrameOutput, Option<(f64, f64)>)>,
    intents: Vec<IntentEvent>,
}

impl SessionExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name
            .unwrap_or_else(|| format!("session_{}", Local::now().format("%Y%m%d_%H%M%S")));

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            frames: Vec::new(),
            intents: Vec::new(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn add_frame(&mut self, output: FrameOutput, pointer: Option<(f64, f64)>) {
        self.frames.push((output, pointer));
    }

    pub fn add_intents(&mut self, events: &[IntentEvent]) {
        self.intents.extend_from_slice(events);
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn prepare_dir(&self) -> Result<PathBuf> {
        let dir = self.session_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {:?}", dir))?;
        Ok(dir)
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.prepare_dir()?.join("frames.csv");
        let file = File::create(&csv_path)
            .with_context(|| format!("Failed to create {:?}", csv_path))?;
        let mut writer = Writer::from_writer(file);

        for (i, (output, pointer)) in self.frames.iter().enumerate() {
            writer.serialize(Self::create_record(i, output, *pointer))?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    pub fn export_intents(&self) -> Result<PathBuf> {
        let csv_path = self.prepare_dir()?.join("intents.csv");
        let file = File::create(&csv_path)
            .with_context(|| format!("Failed to create {:?}", csv_path))?;
        let mut writer = Writer::from_writer(file);

        for event in &self.intents {
            writer.serialize(IntentRecord {
                timestamp: event.timestamp,
                intent: event.intent.as_str(),
                mode: event.mode.as_str(),
                scroll_notches: event.scroll.map(|s| s.notches()),
            })?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    fn create_record(frame: usize, output: &FrameOutput, pointer: Option<(f64, f64)>) -> FrameRecord {
        let fingers = output.analysis.map(|a| a.fingers);
        let distances = output.analysis.map(|a| a.distances);
        let extended = |f: Finger| fingers.map(|s| s.is_extended(f));
        let curled = |f: Finger| fingers.map(|s| s.is_curled(f));
        let distance = |f: Finger| distances.and_then(|d| d.thumb_to(f));

        FrameRecord {
            frame,
            timestamp: output.timestamp,
            hand_present: output.hand_present(),
            gesture: output.gesture.as_str(),
            stable_frames: output.stable_frames,
            thumb_extended: extended(Finger::Thumb),
            index_extended: extended(Finger::Index),
            middle_extended: extended(Finger::Middle),
            ring_extended: extended(Finger::Ring),
            pinky_extended: extended(Finger::Pinky),
            index_curled: curled(Finger::Index),
            middle_curled: curled(Finger::Middle),
            ring_curled: curled(Finger::Ring),
            pinky_curled: curled(Finger::Pinky),
            thumb_index_distance: distance(Finger::Index),
            thumb_middle_distance: distance(Finger::Middle),
            thumb_ring_distance: distance(Finger::Ring),
            thumb_pinky_distance: distance(Finger::Pinky),
            peace_angle: output.peace_angle,
            pointer_x: pointer.map(|p| p.0),
            pointer_y: pointer.map(|p| p.1),
        }
    }

    /// Frames per classified gesture, in declaration order.
    pub fn gesture_counts(&self) -> BTreeMap<Gesture, usize> {
        let mut counts = BTreeMap::new();
        for (output, _) in &self.frames {
            *counts.entry(output.gesture).or_insert(0) += 1;
        }
        counts
    }

    pub fn intent_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.intents {
            *counts.entry(event.intent.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn generate_report(&self) -> Result<PathBuf> {
        let report_path = self.prepare_dir()?.join("report.html");
        let html_content = self.create_html_report();
        fs::write(&report_path, html_content)
            .with_context(|| format!("Failed to write {:?}", report_path))?;
        Ok(report_path)
    }

    fn create_html_report(&self) -> String {
        let total_frames = self.frames.len();
        let hand_frames = self.frames.iter().filter(|(o, _)| o.hand_present()).count();
        let detection_rate = if total_frames == 0 {
            0.0
        } else {
            hand_frames as f64 / total_frames as f64 * 100.0
        };
        let duration = match (self.frames.first(), self.frames.last()) {
            (Some((first, _)), Some((last, _))) => last.timestamp - first.timestamp,
            _ => 0.0,
        };

        let gesture_rows: String = self
            .gesture_counts()
            .iter()
            .map(|(gesture, count)| {
                format!(
                    "            <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    gesture.as_str(),
                    gesture.description(),
                    count
                )
            })
            .collect();

        let intent_rows: String = self
            .intent_counts()
            .iter()
            .map(|(intent, count)| format!("            <tr><td>{}</td><td>{}</td></tr>\n", intent, count))
            .collect();

        format!(r#"
<!DOCTYPE html>
<html>
<head>
    <title>Gesture Session Report - {}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); margin-bottom: 20px; }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #4682EA; font-size: 1.2em; }}
        td, th {{ padding: 4px 12px; text-align: left; }}
    </style>
</head>
<body>
    <h1>Gesture Session Report</h1>
    <div class="stats">
        <h2>Session: {}</h2>
        <div class="stat-item">
            <span class="stat-label">Total Frames:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Duration:</span>
            <span class="stat-value">{:.2}s</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Hand Detection Rate:</span>
            <span class="stat-value">{:.1}%</span>
        </div>
    </div>
    <div class="stats">
        <h2>Gestures</h2>
        <table>
            <tr><th>Gesture</th><th>Description</th><th>Frames</th></tr>
{}        </table>
    </div>
    <div class="stats">
        <h2>Intents</h2>
        <table>
            <tr><th>Intent</th><th>Count</th></tr>
{}        </table>
    </div>
</body>
</html>
"#,
            self.session_name,
            self.session_name,
            total_frames,
            duration,
            detection_rate,
            gesture_rows,
            intent_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gestures::ControlMode;
    use crate::intents::Intent;

    fn output(timestamp: f64, gesture: Gesture) -> FrameOutput {
        FrameOutput {
            timestamp,
            gesture,
            stable_frames: 1,
            analysis: None,
            peace_angle: None,
        }
    }

    #[test]
    fn default_session_name_is_timestamped() {
        let exporter = SessionExporter::new("/tmp", None);
        assert!(exporter.session_name().starts_with("session_"));
    }

    #[test]
    fn exports_frames_intents_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = SessionExporter::new(dir.path(), Some("test".to_string()));
        exporter.add_frame(output(0.0, Gesture::None), None);
        exporter.add_frame(output(0.1, Gesture::Grab), Some((10.0, 20.0)));
        exporter.add_frame(output(0.2, Gesture::Grab), None);
        exporter.add_intents(&[IntentEvent {
            intent: Intent::SwitchMode,
            mode: ControlMode::Scroll,
            scroll: None,
            timestamp: 0.2,
        }]);

        let frames = exporter.export_csv().unwrap();
        let text = fs::read_to_string(&frames).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("frame,timestamp,hand_present,gesture"));
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("GRAB"));

        let intents = fs::read_to_string(exporter.export_intents().unwrap()).unwrap();
        assert!(intents.contains("switch_mode,scroll"));

        let report = fs::read_to_string(exporter.generate_report().unwrap()).unwrap();
        assert!(report.contains("Session: test"));
        assert!(report.contains("<td>GRAB</td>"));

        assert_eq!(exporter.gesture_counts().get(&Gesture::Grab), Some(&2));
        assert_eq!(frames, dir.path().join("test").join("frames.csv"));
    }
}
