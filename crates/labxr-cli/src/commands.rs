use std::path::Path;

use anyhow::{Context, Result};
use crossterm::event::{KeyEvent, KeyModifiers};
use labxr_config::LabConfig;
use labxr_core::{AnchorId, Lab, ManipulationEvent, ObjectId, Workspace};
use labxr_input::{Handedness, HapticPulse, InputSimulator};
use serde_json::{json, Value};

use crate::bench::{self, Step};

fn object_label(ws: &Workspace, id: ObjectId) -> String {
    match ws.objects.get(id) {
        Some(object) => format!("{} ({})", object.kind(), id),
        None => id.to_string(),
    }
}

fn anchor_label(ws: &Workspace, id: Option<AnchorId>) -> String {
    match id.and_then(|a| ws.anchors.get(a)) {
        Some(anchor) => anchor.name().to_string(),
        None => "-".to_string(),
    }
}

fn describe(ws: &Workspace, event: &ManipulationEvent) -> String {
    let text = match *event {
        ManipulationEvent::Highlighted { object, .. } => match object {
            Some(id) => format!("highlights {}", object_label(ws, id)),
            None => "highlights nothing".to_string(),
        },
        ManipulationEvent::GrabStarted { object, .. } => {
            format!("reaches for {}", object_label(ws, object))
        }
        ManipulationEvent::Grabbed { object, .. } => format!("holds {}", object_label(ws, object)),
        ManipulationEvent::Dropped {
            object, near_anchor, ..
        } => format!(
            "drops {} toward {}",
            object_label(ws, object),
            anchor_label(ws, near_anchor)
        ),
        ManipulationEvent::Released { object, anchor, .. } => format!(
            "released {} on {}",
            object_label(ws, object),
            anchor_label(ws, anchor)
        ),
    };
    format!("{:<5} {}", event.hand().to_string(), text)
}

fn pulse_json(pulse: &HapticPulse) -> Value {
    json!({
        "event": "haptic",
        "hand": pulse.hand,
        "intensity": pulse.intensity,
        "duration_ms": pulse.duration.as_millis() as u64,
    })
}

fn report(lab: &mut Lab, as_json: bool) -> Result<()> {
    let frame = lab.frames();
    for event in lab.drain_events() {
        if as_json {
            let mut value = serde_json::to_value(event)?;
            value["frame"] = json!(frame);
            println!("{}", value);
        } else {
            println!("[{:>4}] {}", frame, describe(&lab.workspace, &event));
        }
    }
    for pulse in lab.drain_haptics() {
        if as_json {
            println!("{}", pulse_json(&pulse));
        } else {
            println!(
                "[{:>4}] {:<5} pulse {:.2} for {}ms",
                frame,
                pulse.hand.to_string(),
                pulse.intensity,
                pulse.duration.as_millis()
            );
        }
    }
    Ok(())
}

pub fn demo(config: LabConfig, as_json: bool) -> Result<()> {
    labxr_core::validate_config(&config).context("Invalid configuration")?;

    let mut lab = Lab::with_workspace(bench::workspace(config));
    let mut simulator = InputSimulator::new();
    for hand in Handedness::BOTH {
        lab.set_controller_pose(hand, simulator.pose(hand));
    }

    tracing::info!("Running demo bench with {} objects", lab.workspace.objects.len());
    for step in bench::script() {
        match step {
            Step::Key(code) => {
                for input in simulator.process_key(KeyEvent::new(code, KeyModifiers::NONE)) {
                    lab.apply(&input);
                }
            }
            Step::Frames(count) => {
                for _ in 0..count {
                    lab.frame();
                    report(&mut lab, as_json)?;
                }
            }
        }
    }

    if !as_json {
        println!();
        for object in lab.workspace.objects.iter() {
            println!(
                "{:<24} {}",
                object_label(&lab.workspace, object.id()),
                anchor_label(&lab.workspace, object.anchored())
            );
        }
    }
    Ok(())
}

pub fn anchors(config: LabConfig, as_json: bool, group: Option<&str>) -> Result<()> {
    labxr_core::validate_config(&config).context("Invalid configuration")?;
    let ws = bench::workspace(config);

    let listed: Vec<_> = ws
        .anchors
        .iter()
        .filter(|a| group.map_or(true, |g| a.name().starts_with(g)))
        .collect();
    if listed.is_empty() {
        tracing::warn!("No anchor matched");
    }

    if as_json {
        let values: Vec<Value> = listed
            .iter()
            .map(|a| {
                let p = a.position(&ws.scene);
                json!({
                    "id": a.id().value(),
                    "name": a.name(),
                    "kind": a.kind().map(|k| k.name()),
                    "enabled": a.enabled(),
                    "min_distance": a.min_distance(),
                    "occupant": a.occupant().map(|o| object_label(&ws, o)),
                    "position": [p.x, p.y, p.z],
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    println!(
        "{:<16} {:<22} {:>6} {:<8} {}",
        "NAME", "KIND", "SNAP", "ENABLED", "OCCUPANT"
    );
    for anchor in listed {
        println!(
            "{:<16} {:<22} {:>6.2} {:<8} {}",
            anchor.name(),
            anchor.kind().map_or("-", |k| k.name()),
            anchor.min_distance(),
            anchor.enabled(),
            anchor
                .occupant()
                .map_or_else(|| "-".to_string(), |o| object_label(&ws, o))
        );
    }
    Ok(())
}

pub fn config_show(config: &LabConfig) -> Result<()> {
    let text = config
        .to_toml_string()
        .context("Failed to serialize configuration")?;
    print!("{}", text);
    Ok(())
}

pub fn config_check(config: &LabConfig, path: Option<&Path>) -> Result<()> {
    labxr_core::validate_config(config).context("Invalid configuration")?;
    match path {
        Some(p) => println!("Configuration OK ({})", p.display()),
        None => println!("Configuration OK (defaults)"),
    }
    Ok(())
}
