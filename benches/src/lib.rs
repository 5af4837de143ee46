//! Benchmark fixtures for boxmerge.
//!
//! Builds an in-memory share shaped like the lab backup so the merge
//! pipeline can be measured without a network.

use boxmerge_lib::{DateRange, MemoryShare, Room, RoomLayout, day_path};
use chrono::NaiveDate;

/// Shape of a synthetic share.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of rooms.
    pub rooms: usize,
    /// Boxes in each room.
    pub boxes_per_room: usize,
    /// Days in the range, starting 2024-01-01.
    pub days: u64,
    /// Size of each day file in bytes.
    pub day_bytes: usize,
    /// Every `gap`-th day has no file. Zero means no gaps.
    pub gap: u64,
}

impl BenchmarkConfig {
    /// Returns the date range covered.
    pub fn range(&self) -> DateRange {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let end = start + chrono::Days::new(self.days.saturating_sub(1));
        DateRange::new(start, end).expect("start precedes end")
    }

    /// Returns the room layout.
    pub fn layout(&self) -> RoomLayout {
        let rooms = (0..self.rooms)
            .map(|r| {
                Room::new(
                    format!("R{r}"),
                    (0..self.boxes_per_room).map(|b| format!("{}-{}", b * 16 + 1, b * 16 + 16)),
                )
            })
            .collect();
        RoomLayout::new("bench", rooms).expect("valid layout")
    }

    /// Returns the number of payload bytes a full merge writes.
    pub fn total_bytes(&self) -> u64 {
        let files_per_box = if self.gap == 0 {
            self.days
        } else {
            self.days - self.days / self.gap
        };
        (self.rooms * self.boxes_per_room) as u64 * files_per_box * self.day_bytes as u64
    }

    /// Builds the share holding every day file of the layout.
    pub fn share(&self) -> MemoryShare {
        let share = MemoryShare::new();
        let layout = self.layout();
        let payload: Vec<u8> = b"0123456789abcdef\n"
            .iter()
            .copied()
            .cycle()
            .take(self.day_bytes)
            .collect();

        for room in &layout.rooms {
            for box_label in &room.boxes {
                for (i, day) in self.range().days().enumerate() {
                    if self.gap != 0 && (i as u64 + 1) % self.gap == 0 {
                        continue;
                    }
                    let path = day_path(&layout.base, &room.name, box_label, day);
                    share.insert(path, payload.clone());
                }
            }
        }
        share
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_matches_total() {
        let config = BenchmarkConfig {
            rooms: 2,
            boxes_per_room: 2,
            days: 10,
            day_bytes: 100,
            gap: 5,
        };
        let share = config.share();
        assert_eq!(share.len(), 4 * 8);
        assert_eq!(config.total_bytes(), 4 * 8 * 100);
        assert_eq!(config.range().total_days(), 10);
    }
}
