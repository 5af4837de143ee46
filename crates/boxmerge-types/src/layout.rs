//! Room and box layouts.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{BoxmergeError, DEFAULT_BASE, DateRange, LayoutError, MergeUnit};

/// Number of boxes each room takes from a positional box list.
pub const BOXES_PER_ROOM: usize = 2;

/// The lab layout embedded at compile time.
const BUILTIN_LAYOUT_JSON: &str = include_str!("../data/layout.json");

/// Global built-in layout instance.
static BUILTIN: OnceLock<RoomLayout> = OnceLock::new();

/// A recording room and its acquisition boxes, in claim order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room name (e.g., "G126").
    pub name: String,
    /// Box labels (e.g., "1-16", "1B-16B").
    pub boxes: Vec<String>,
}

impl Room {
    /// Creates a new room.
    #[must_use]
    pub fn new(name: impl Into<String>, boxes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            boxes: boxes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered rooms with their boxes, plus the remote base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Remote directory holding the per-room backups.
    #[serde(default = "default_base")]
    pub base: String,
    /// Rooms in claim order.
    pub rooms: Vec<Room>,
}

fn default_base() -> String {
    DEFAULT_BASE.to_string()
}

impl RoomLayout {
    /// Creates a layout from structured rooms, validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rooms, a room has no boxes, or a
    /// name cannot be used as a path component.
    pub fn new(base: impl Into<String>, rooms: Vec<Room>) -> Result<Self, LayoutError> {
        let layout = Self {
            base: base.into(),
            rooms,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Creates a layout from a room list and a flat box list, where each room
    /// takes the next [`BOXES_PER_ROOM`] boxes in order.
    ///
    /// Boxes past the last room's pair are never claimed and are dropped with
    /// a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the box list is too short for the room list.
    pub fn from_positional(
        base: impl Into<String>,
        rooms: &[String],
        boxes: &[String],
    ) -> Result<Self, LayoutError> {
        if rooms.is_empty() {
            return Err(LayoutError::Empty);
        }
        let expected = rooms.len() * BOXES_PER_ROOM;
        if boxes.len() < expected {
            return Err(LayoutError::MissingBoxes {
                rooms: rooms.len(),
                expected,
                actual: boxes.len(),
            });
        }
        if boxes.len() > expected {
            warn!(
                ignored = ?&boxes[expected..],
                "box list is longer than {BOXES_PER_ROOM} per room; trailing boxes are ignored"
            );
        }

        let rooms = rooms
            .iter()
            .zip(boxes.chunks_exact(BOXES_PER_ROOM))
            .map(|(name, pair)| Room::new(name.clone(), pair.iter().cloned()))
            .collect();
        Self::new(base, rooms)
    }

    /// Returns the built-in lab layout.
    #[must_use]
    pub fn builtin() -> &'static Self {
        BUILTIN.get_or_init(|| {
            serde_json::from_str(BUILTIN_LAYOUT_JSON).expect("Invalid layout.json")
        })
    }

    /// Parses and validates a layout from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the layout is invalid.
    pub fn from_json(json: &str) -> Result<Self, BoxmergeError> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Reads and validates a layout file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid layout.
    pub fn from_file(path: &Path) -> Result<Self, BoxmergeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that the layout can be enumerated into merge units.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.rooms.is_empty() {
            return Err(LayoutError::Empty);
        }
        for room in &self.rooms {
            check_name(&room.name)?;
            if room.boxes.is_empty() {
                return Err(LayoutError::RoomWithoutBoxes(room.name.clone()));
            }
            for box_label in &room.boxes {
                check_name(box_label)?;
            }
        }
        Ok(())
    }

    /// Returns the total number of (room, box) units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.rooms.iter().map(|room| room.boxes.len()).sum()
    }

    /// Expands the layout into merge units in claim order.
    #[must_use]
    pub fn units(&self, range: DateRange) -> Vec<MergeUnit> {
        self.rooms
            .iter()
            .flat_map(|room| {
                room.boxes
                    .iter()
                    .map(move |box_label| MergeUnit::new(&room.name, box_label, range))
            })
            .collect()
    }
}

fn check_name(name: &str) -> Result<(), LayoutError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if bad {
        return Err(LayoutError::InvalidName(name.to_string()));
    }
    Ok(())
}
