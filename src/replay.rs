// src/replay.rs - Recorded landmark streams (wide CSV) for deterministic replay
//
// One row per frame: `timestamp` then x,y,z for each of the 21 landmarks in
// provider order. A row whose coordinate cells are empty is a frame without a
// hand.
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;
use tracing::warn;

use crate::landmarks::{LandmarkSet, LANDMARK_COUNT};

const COORDS: usize = LANDMARK_COUNT * 3;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {reason}")]
    BadRow { row: usize, reason: String },

    #[error("row {row}: timestamp {timestamp} is earlier than the previous frame")]
    TimeWentBackwards { row: usize, timestamp: f64 },

    #[error("recording contains no frames")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub timestamp: f64,
    pub landmarks: Option<LandmarkSet>,
}

/// Column names of a recording: `timestamp, x0, y0, z0, ..., z20`.
pub fn header() -> Vec<String> {
    let mut names = Vec::with_capacity(COORDS + 1);
    names.push("timestamp".to_string());
    for i in 0..LANDMARK_COUNT {
        for axis in ["x", "y", "z"] {
            names.push(format!("{}{}", axis, i));
        }
    }
    names
}

pub fn load_recording(path: impl AsRef<Path>) -> Result<Vec<RecordedFrame>, ReplayError> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut frames = Vec::new();
    let mut last_timestamp = f64::NEG_INFINITY;

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result?;
        let frame = parse_row(&record, row)?;

        if frame.timestamp < last_timestamp {
            return Err(ReplayError::TimeWentBackwards {
                row,
                timestamp: frame.timestamp,
            });
        }
        last_timestamp = frame.timestamp;
        frames.push(frame);
    }

    if frames.is_empty() {
        return Err(ReplayError::Empty);
    }
    Ok(frames)
}

fn parse_row(record: &StringRecord, row: usize) -> Result<RecordedFrame, ReplayError> {
    let bad = |reason: String| ReplayError::BadRow { row, reason };

    if record.len() < COORDS + 1 {
        return Err(bad(format!(
            "expected {} columns, found {}",
            COORDS + 1,
            record.len()
        )));
    }

    let timestamp: f64 = record[0]
        .parse()
        .map_err(|_| bad(format!("invalid timestamp {:?}", &record[0])))?;
    if !timestamp.is_finite() {
        return Err(bad("timestamp is not finite".to_string()));
    }

    let cells: Vec<&str> = (1..=COORDS).map(|i| &record[i]).collect();
    let empty = cells.iter().filter(|c| c.is_empty()).count();
    if empty == COORDS {
        return Ok(RecordedFrame {
            timestamp,
            landmarks: None,
        });
    }
    if empty > 0 {
        warn!("Row {} has {} missing coordinates, treating as no hand", row, empty);
        return Ok(RecordedFrame {
            timestamp,
            landmarks: None,
        });
    }

    let mut raw = Vec::with_capacity(LANDMARK_COUNT);
    for chunk in cells.chunks(3) {
        let mut point = [0.0; 3];
        for (slot, cell) in point.iter_mut().zip(chunk) {
            *slot = cell
                .parse()
                .map_err(|_| bad(format!("invalid coordinate {:?}", cell)))?;
        }
        raw.push(point);
    }

    let landmarks = LandmarkSet::from_slice(&raw).map_err(|e| bad(e.to_string()))?;
    Ok(RecordedFrame {
        timestamp,
        landmarks: Some(landmarks),
    })
}

/// Writes frames in the format [`load_recording`] reads.
pub fn save_recording(path: impl AsRef<Path>, frames: &[RecordedFrame]) -> Result<(), ReplayError> {
    let mut writer = WriterBuilder::new().from_path(path.as_ref())?;
    writer.write_record(header())?;

    for frame in frames {
        let mut row = Vec::with_capacity(COORDS + 1);
        row.push(frame.timestamp.to_string());
        match &frame.landmarks {
            Some(set) => {
                for p in set.points() {
                    row.extend([p.x.to_string(), p.y.to_string(), p.z.to_string()]);
                }
            }
            None => row.extend(std::iter::repeat(String::new()).take(COORDS)),
        }
        writer.write_record(&row)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
