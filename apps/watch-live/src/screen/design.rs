//! Text layout of the Live Detection page.

use std::fmt::Write;
use watch_data::{display_name, Detection, Lifecycle, LiveView, Mode};
use watch_widgets::WatchAppData;

/// Above this confidence a detection renders in the "high" band.
pub const HIGH_CONFIDENCE: f32 = 0.7;

pub fn confidence_band(confidence: f32) -> &'static str {
    if confidence > HIGH_CONFIDENCE {
        "high"
    } else {
        "low"
    }
}

pub fn confidence_percent(confidence: f32) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn status_text(view: &LiveView) -> String {
    match view.lifecycle {
        Lifecycle::Streaming if view.degraded => "Streaming (connection degraded)".to_string(),
        lifecycle => lifecycle.label().to_string(),
    }
}

/// The model the page tags "(Active)"
fn active_model(view: &LiveView) -> Option<&str> {
    view.selected_model
        .as_deref()
        .or(view.registry_active.as_deref())
}

fn detection_row(out: &mut String, detection: &Detection) {
    let _ = writeln!(
        out,
        "  {:<20} {:>3}%  {}",
        detection.label,
        confidence_percent(detection.confidence),
        confidence_band(detection.confidence)
    );
}

pub fn render(view: &LiveView, app_data: &WatchAppData, notice: Option<&str>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "── Live Detection ── {}", app_data.api_url);

    // ─── Stat cards ───
    let _ = writeln!(out, "Status : {}", status_text(view));
    let _ = writeln!(out, "Mode   : {}", view.mode.label());
    let source_tag = if view.is_uploaded_source { " (uploaded)" } else { "" };
    let _ = writeln!(out, "Source : {}{}", view.camera_source, source_tag);
    let model = active_model(view).map(display_name).unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "Model  : {}", model);
    if view.mode == Mode::Sugar {
        let _ = writeln!(out, "Bags   : {}", view.bag_count);
    }
    if let Some(snapshot) = &view.snapshot {
        let _ = writeln!(
            out,
            "Frame  : #{} ({} bytes, {})",
            snapshot.handle_id,
            snapshot.size_bytes,
            snapshot.received_at.format("%H:%M:%S%.3f")
        );
    }

    // ─── Models ───
    if !view.selectable_models.is_empty() {
        let locked = if view.mode == Mode::Truck { " (locked)" } else { "" };
        let _ = writeln!(out, "Models{}:", locked);
        let active = active_model(view);
        for id in &view.selectable_models {
            let tag = if Some(id.as_str()) == active { " (Active)" } else { "" };
            let _ = writeln!(out, "  {}{}", display_name(id), tag);
        }
    }

    // ─── Detections ───
    match &view.detections_at {
        Some(at) => {
            let _ = writeln!(
                out,
                "Detections ({}) at {}:",
                view.detections.len(),
                at.format("%H:%M:%S")
            );
            if view.detections.is_empty() {
                let _ = writeln!(out, "  none");
            }
            for detection in &view.detections {
                detection_row(&mut out, detection);
            }
        }
        None if view.lifecycle == Lifecycle::Streaming => {
            let _ = writeln!(out, "Detections: waiting for first frame");
        }
        None => {}
    }

    if let Some(notice) = notice {
        let _ = writeln!(out, "! {}", notice);
    }
    out
}
