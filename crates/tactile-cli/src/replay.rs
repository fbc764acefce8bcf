//! Trace replay and report rendering.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tactile_core::{FrameReport, GestureEvent, InputConfig, InputContext, TouchTrace};

/// Output format for replay reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Format {
    Text,
    Json,
}

/// One recognized gesture with its frame.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GestureRow {
    pub(crate) frame: u64,
    pub(crate) time_ms: u64,
    pub(crate) gesture: GestureEvent,
}

/// Result of replaying a trace.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplaySummary {
    pub(crate) frames: usize,
    pub(crate) duration_ms: u64,
    pub(crate) anomalies: u64,
    pub(crate) gestures: Vec<GestureRow>,
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<InputConfig> {
    match path {
        Some(path) => InputConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(InputConfig::default()),
    }
}

pub(crate) fn load_trace(path: &Path) -> Result<TouchTrace> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trace {}", path.display()))?;
    parse_trace(&contents).with_context(|| format!("invalid trace {}", path.display()))
}

pub(crate) fn parse_trace(contents: &str) -> Result<TouchTrace> {
    Ok(serde_json::from_str(contents)?)
}

pub(crate) fn replay(trace: &TouchTrace, config: InputConfig) -> Result<ReplaySummary> {
    let mut input = InputContext::new(config).context("invalid input config")?;
    let reports = trace.replay(&mut input);
    let summary = summarize(&reports, &input, trace);
    tracing::info!(
        frames = summary.frames,
        gestures = summary.gestures.len(),
        anomalies = summary.anomalies,
        "trace replayed"
    );
    Ok(summary)
}

fn summarize(reports: &[FrameReport], input: &InputContext, trace: &TouchTrace) -> ReplaySummary {
    let gestures = reports
        .iter()
        .flat_map(|report| {
            report.gestures.iter().map(|&gesture| GestureRow {
                frame: report.stamp.frame,
                time_ms: report.stamp.time.as_millis() as u64,
                gesture,
            })
        })
        .collect();
    ReplaySummary {
        frames: reports.len(),
        duration_ms: trace.duration().as_millis() as u64,
        anomalies: input.recognizer().anomalies(),
        gestures,
    }
}

pub(crate) fn render(summary: &ReplaySummary, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(summary)?),
        Format::Text => Ok(render_text(summary)),
    }
}

fn render_text(summary: &ReplaySummary) -> String {
    let mut out = String::new();
    for row in &summary.gestures {
        let _ = writeln!(
            out,
            "frame {:>5}  {:>7} ms  {}",
            row.frame,
            row.time_ms,
            describe(&row.gesture)
        );
    }
    let _ = writeln!(
        out,
        "{} gesture(s) in {} frame(s), {} ms, {} anomal{}",
        summary.gestures.len(),
        summary.frames,
        summary.duration_ms,
        summary.anomalies,
        if summary.anomalies == 1 { "y" } else { "ies" }
    );
    out
}

fn describe(gesture: &GestureEvent) -> String {
    match gesture {
        GestureEvent::Tap(tap) | GestureEvent::DoubleTap(tap) => format!(
            "{} at ({:.1}, {:.1})",
            gesture.label(),
            tap.position.x,
            tap.position.y
        ),
        GestureEvent::Hold(hold) => format!(
            "hold at ({:.1}, {:.1}) for {} ms",
            hold.position.x,
            hold.position.y,
            hold.duration.as_millis()
        ),
        GestureEvent::OnePointDrag(drag) => {
            let t = drag.translation();
            format!(
                "{} at ({:.1}, {:.1}) moved ({:.1}, {:.1})",
                gesture.label(),
                drag.position.x,
                drag.position.y,
                t.x,
                t.y
            )
        }
        GestureEvent::TwoPointDrag(drag) => format!(
            "{} centroid ({:.1}, {:.1}) scale {:.2} rotation {:.1} deg",
            gesture.label(),
            drag.centroid.x,
            drag.centroid.y,
            drag.scale(),
            (drag.angle - drag.start_angle).to_degrees()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactile_core::Point;
    use tactile_test::GestureScript;

    const TAP_TRACE: &str = r#"{
        "frame_ms": 16,
        "frames": [
            { "touches": [{ "id": 0, "state": "pressed", "x": 10.0, "y": 20.0 }] },
            { "delta_ms": 50, "touches": [{ "id": 0, "state": "released", "x": 10.0, "y": 20.0 }] }
        ]
    }"#;

    #[test]
    fn test_parse_and_replay_tap() {
        let trace = parse_trace(TAP_TRACE).expect("valid trace");
        let summary = replay(&trace, InputConfig::default()).expect("replays");
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.duration_ms, 66);
        assert_eq!(summary.gestures.len(), 1);
        assert_eq!(summary.gestures[0].frame, 2);

        let text = render(&summary, Format::Text).expect("renders");
        assert!(text.contains("tap at (10.0, 20.0)"));
        assert!(text.contains("1 gesture(s) in 2 frame(s), 66 ms, 0 anomalies"));
    }

    #[test]
    fn test_json_output_is_tagged() {
        let trace = parse_trace(TAP_TRACE).expect("valid trace");
        let summary = replay(&trace, InputConfig::default()).expect("replays");
        let json = render(&summary, Format::Json).expect("renders");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["gestures"][0]["gesture"]["kind"], "tap");
        assert_eq!(value["frames"], 2);
    }

    #[test]
    fn test_drag_description() {
        let trace = GestureScript::new()
            .drag(0, Point::new(0.0, 0.0), Point::new(60.0, 0.0), 3)
            .build();
        let summary = replay(&trace, InputConfig::default()).expect("replays");
        let text = render(&summary, Format::Text).expect("renders");
        assert!(text.contains("one_point_drag_begin"));
        assert!(text.contains("one_point_drag_end at (60.0, 0.0) moved (60.0, 0.0)"));
    }

    #[test]
    fn test_oversized_delay_does_not_abort() {
        let trace = parse_trace(
            r#"{ "frames": [
                { "touches": [{ "id": 0, "state": "pressed", "x": 0.0, "y": 0.0 }] },
                { "delta_ms": 18446744073709551615, "touches": [] },
                { "delta_ms": 18446744073709551615, "touches": [] }
            ] }"#,
        )
        .expect("valid trace");
        let summary = replay(&trace, InputConfig::default()).expect("replays");
        assert_eq!(summary.frames, 3);
        assert!(render(&summary, Format::Text).is_ok());
    }

    #[test]
    fn test_malformed_trace_rejected() {
        assert!(parse_trace("{ \"frames\": [ { \"touches\": [ { \"id\": 0 } ] } ] }").is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = InputConfig::default();
        config.dispatch.max_scope_depth = 0;
        assert!(replay(&TouchTrace::default(), config).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Some(Path::new("/nonexistent/tactile.toml"))).expect_err("missing");
        assert!(err.to_string().contains("failed to load config"));
        assert_eq!(load_config(None).expect("default"), InputConfig::default());
    }
}
