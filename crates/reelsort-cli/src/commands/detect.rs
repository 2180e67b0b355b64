//! `detect` subcommand: run shot-boundary detectors and fusion on one
//! video file.

use reelsort_media::{fuse, Detector, FrameDifference, FusionConfig, Histogram, MediaReader};

use crate::cli::DetectArgs;
use crate::commands::{algorithm_tags, parse_fusion_weights, require_file};
use crate::error::CliError;

pub async fn run(args: &DetectArgs) -> Result<serde_json::Value, CliError> {
    require_file(&args.file)?;

    let reader = MediaReader::default();
    let video = reader.probe(&args.file).await?;
    let frames = reader.frames(&video, 1).await?;

    let tags = algorithm_tags(args.algorithm);
    let detectors: Vec<Box<dyn Detector>> = tags
        .iter()
        .map(|tag| -> Box<dyn Detector> {
            match *tag {
                "histogram" => Box::new(Histogram::default()),
                _ => Box::new(FrameDifference::default()),
            }
        })
        .collect();

    let sink: reelsort_media::ProgressSink = Box::new(|_| {});
    let mut candidates = Vec::new();
    for detector in &detectors {
        let mut detected = detector.detect_boundaries(&frames, &sink).await?;
        candidates.append(&mut detected);
    }

    let weights = parse_fusion_weights(&args.fusion_weights)?;
    let config = FusionConfig {
        weights,
        fusion_threshold: args.threshold,
        fps: video.fps,
        ..FusionConfig::default()
    };

    let boundaries = fuse(candidates.clone(), &config);

    Ok(serde_json::json!({
        "boundaries": boundaries,
        "stats": {
            "candidateCount": candidates.len(),
            "detectorCount": detectors.len(),
            "boundaryCount": boundaries.len(),
        }
    }))
}
