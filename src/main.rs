// src/main.rs - Replay a recorded landmark stream through the gesture pipeline
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hand_gesture::data::SessionExporter;
use hand_gesture::intents::Intent;
use hand_gesture::replay::load_recording;
use hand_gesture::smoothing::clamp_to_extent;
use hand_gesture::{ControlMode, EngineConfig, GesturePipeline, IntentResolver, ManualClock};

#[derive(Parser, Debug)]
#[command(name = "hand_gesture")]
#[command(version, about = "Replay a recorded hand landmark stream through the gesture pipeline", long_about = None)]
pub struct Args {
    /// Recording CSV (timestamp, x0, y0, z0, ..., z20)
    pub recording: PathBuf,

    /// Configuration file path (defaults to the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to export the session into
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Starting control mode
    #[arg(short, long, default_value = "cursor", value_parser = parse_mode)]
    pub mode: ControlMode,

    /// Print every frame instead of gesture changes only
    #[arg(long)]
    pub frames: bool,
}

fn parse_mode(name: &str) -> Result<ControlMode, String> {
    ControlMode::from_name(name)
        .ok_or_else(|| format!("unknown mode {:?} (cursor, scroll, window, media)", name))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let opts = Args::parse();
    let config = EngineConfig::load_or_default(opts.config.as_deref())
        .context("Failed to load configuration")?;
    let frames = load_recording(&opts.recording)
        .with_context(|| format!("Failed to load recording {:?}", opts.recording))?;
    info!("Replaying {} frames from {:?}", frames.len(), opts.recording);

    let (width, height) = (config.smoothing.width, config.smoothing.height);
    let clock = ManualClock::new(frames.first().map_or(0.0, |f| f.timestamp));
    let mut pipeline = GesturePipeline::with_clock(config, clock.clone());
    let mut resolver = IntentResolver::new(opts.mode);
    let mut exporter = opts
        .export
        .as_ref()
        .map(|dir| SessionExporter::new(dir, None));

    let mut cursor = (width / 2.0, height / 2.0);
    let mut last_gesture = pipeline.gesture();

    for frame in &frames {
        clock.set(frame.timestamp);
        let output = pipeline.process(frame.landmarks.as_ref());
        let events = resolver.resolve(&pipeline.state(), output.peace_angle, output.timestamp);

        let mut pointer = None;
        if let Some(hand) = &frame.landmarks {
            if events.iter().any(|e| e.intent == Intent::MoveCursor) {
                if let Some(target) = pipeline.track_index_tip(hand, cursor) {
                    cursor = clamp_to_extent(target, width, height);
                    pointer = Some(cursor);
                }
            }
        }

        if opts.frames {
            println!(
                "{:>9.3}  {:<12} {:>4}  {}",
                output.timestamp,
                output.gesture.as_str(),
                output.stable_frames,
                resolver.mode()
            );
        } else if output.gesture != last_gesture {
            println!("{:>9.3}  {}", output.timestamp, output.gesture.as_str());
        }
        last_gesture = output.gesture;

        for event in events.iter().filter(|e| e.intent != Intent::MoveCursor) {
            match event.scroll {
                Some(step) => println!("{:>9.3}  -> {} {:+}", event.timestamp, event.intent.as_str(), step.notches()),
                None => println!("{:>9.3}  -> {} [{}]", event.timestamp, event.intent.as_str(), event.mode),
            }
        }

        if let Some(exporter) = exporter.as_mut() {
            exporter.add_frame(output, pointer);
            exporter.add_intents(&events);
        }
    }

    info!("Final mode: {}, pointer at ({:.0}, {:.0})", resolver.mode(), cursor.0, cursor.1);

    if let Some(exporter) = exporter {
        let csv = exporter.export_csv()?;
        let intents = exporter.export_intents()?;
        let report = exporter.generate_report()?;
        println!("Exported {:?}, {:?} and {:?}", csv, intents, report);
    }

    Ok(())
}
