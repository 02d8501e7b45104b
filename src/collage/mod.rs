// SPDX-License-Identifier: GPL-3.0-only

//! Collage jobs and templates
//!
//! A collage template is a background image plus an ordered list of slot
//! descriptors (position, size, rotation angle, horizontal duplicate
//! offset). A job tracks which slot the next capture lands in; slots fill
//! strictly in order and the job is complete exactly when the last slot has
//! an image assigned.

pub mod compositor;

pub use compositor::render;

use crate::errors::CollageError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-left corner of a slot on the template canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPosition {
    pub x: i64,
    pub y: i64,
}

/// Exact pixel size a slot's capture is fitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSize {
    pub width: u32,
    pub height: u32,
}

/// One sub-image placement within a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub id: u32,
    pub position: SlotPosition,
    pub size: SlotSize,
    /// Rotation in degrees, positive turns counter-clockwise
    #[serde(default)]
    pub angle: f32,
    /// Horizontal offset of the intentional duplicate paste
    #[serde(default)]
    pub offset: i64,
}

/// Template descriptor as stored next to the background image
/// (`<template>_positions.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Background image file name, relative to the descriptor
    pub filename: String,
    pub images: Vec<SlotSpec>,
}

/// Load a template descriptor from disk
pub fn load_descriptor(path: &Path) -> Result<TemplateDescriptor, CollageError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CollageError::InvalidDescriptor(format!("{}: {}", path.display(), e)))?;
    let descriptor: TemplateDescriptor = serde_json::from_str(&raw)
        .map_err(|e| CollageError::InvalidDescriptor(format!("{}: {}", path.display(), e)))?;
    if descriptor.images.is_empty() {
        return Err(CollageError::InvalidDescriptor(format!(
            "{}: no slots defined",
            path.display()
        )));
    }
    Ok(descriptor)
}

/// One slot of a running job
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub spec: SlotSpec,
    /// Capture assigned to this slot; None until its shot completes
    pub image_path: Option<PathBuf>,
}

/// A multi-shot collage in progress.
///
/// Created by the UI on template selection; the sequencer assigns captures
/// and advances the cursor, nobody else mutates the job.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageJob {
    template: PathBuf,
    slots: Vec<Slot>,
    cursor: usize,
}

impl CollageJob {
    pub fn new(template: PathBuf, specs: Vec<SlotSpec>) -> Self {
        let slots = specs
            .into_iter()
            .map(|spec| Slot {
                spec,
                image_path: None,
            })
            .collect();
        Self {
            template,
            slots,
            cursor: 0,
        }
    }

    /// Build a job from a descriptor; the background image resolves
    /// relative to the descriptor's directory.
    pub fn from_descriptor(descriptor_dir: &Path, descriptor: TemplateDescriptor) -> Self {
        Self::new(descriptor_dir.join(&descriptor.filename), descriptor.images)
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot the next capture lands in
    pub fn current_slot(&self) -> &Slot {
        &self.slots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Assign a capture to the current slot. Returns true when that was the
    /// final slot and the job is now complete.
    pub fn assign_current(&mut self, path: PathBuf) -> bool {
        self.slots[self.cursor].image_path = Some(path);
        self.cursor == self.slots.len() - 1
    }

    /// Move the cursor to the next unfilled slot
    pub fn advance(&mut self) {
        debug_assert!(self.cursor + 1 < self.slots.len());
        self.cursor += 1;
    }

    /// Complete exactly when the last slot is assigned
    pub fn is_complete(&self) -> bool {
        self.slots
            .last()
            .map(|s| s.image_path.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: u32) -> SlotSpec {
        SlotSpec {
            id,
            position: SlotPosition { x: 60, y: 118 },
            size: SlotSize {
                width: 505,
                height: 360,
            },
            angle: 5.0,
            offset: 583,
        }
    }

    #[test]
    fn slots_fill_in_order() {
        let mut job = CollageJob::new(PathBuf::from("collage_3_by_2.png"), vec![spec(1), spec(2), spec(3)]);
        assert_eq!(job.cursor(), 0);
        assert!(!job.assign_current(PathBuf::from("a.jpg")));
        job.advance();
        assert!(!job.assign_current(PathBuf::from("b.jpg")));
        job.advance();
        assert!(!job.is_complete());
        assert!(job.assign_current(PathBuf::from("c.jpg")));
        assert!(job.is_complete());
    }

    #[test]
    fn descriptor_roundtrip() {
        let descriptor = TemplateDescriptor {
            filename: "collage_3_by_2.png".to_string(),
            images: vec![spec(1), spec(2)],
        };
        let raw = serde_json::to_string(&descriptor).unwrap();
        let parsed: TemplateDescriptor = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn descriptor_defaults_angle_and_offset() {
        let raw = r#"{
            "filename": "strip.png",
            "images": [
                {"id": 1, "position": {"x": 10, "y": 20}, "size": {"width": 100, "height": 80}}
            ]
        }"#;
        let parsed: TemplateDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.images[0].angle, 0.0);
        assert_eq!(parsed.images[0].offset, 0);
    }
}
