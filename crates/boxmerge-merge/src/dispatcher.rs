//! Work queue handing out merge units.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use boxmerge_types::{BOXES_PER_ROOM, DateRange, MergeUnit, RoomLayout};
use tracing::error;

/// Shared (room, box) cursor.
#[derive(Debug, Default)]
struct Cursor {
    room: usize,
    box_index: usize,
}

/// Hands out merge units to workers, each unit exactly once.
///
/// The cursor is a (room index, box index) pair over the room names and the
/// flat box list. The box index always advances; the room index advances
/// once every box of the current room has been claimed. Once all rooms are
/// consumed, or the dispatcher is halted, every claim returns `None`.
#[derive(Debug)]
pub struct Dispatcher {
    rooms: Vec<String>,
    boxes: Vec<String>,
    /// Exclusive end of each room's slice of `boxes`.
    room_ends: Vec<usize>,
    range: DateRange,
    cursor: Mutex<Cursor>,
    halted: AtomicBool,
    claimed: AtomicUsize,
}

impl Dispatcher {
    /// Creates a dispatcher over a layout. Rooms without boxes are skipped.
    #[must_use]
    pub fn new(layout: &RoomLayout, range: DateRange) -> Self {
        let mut boxes = Vec::with_capacity(layout.unit_count());
        let mut room_ends = Vec::with_capacity(layout.rooms.len());
        for room in &layout.rooms {
            boxes.extend(room.boxes.iter().cloned());
            room_ends.push(boxes.len());
        }
        Self::from_parts(
            layout.rooms.iter().map(|r| r.name.clone()).collect(),
            boxes,
            room_ends,
            range,
        )
    }

    /// Creates a dispatcher over raw room and box lists, each room taking
    /// the next [`BOXES_PER_ROOM`] boxes.
    ///
    /// The lists are not validated. If the box list runs out before the
    /// rooms do, the dispatcher stops at that point.
    #[must_use]
    pub fn positional(rooms: Vec<String>, boxes: Vec<String>, range: DateRange) -> Self {
        let room_ends = (1..=rooms.len()).map(|i| i * BOXES_PER_ROOM).collect();
        Self::from_parts(rooms, boxes, room_ends, range)
    }

    fn from_parts(
        rooms: Vec<String>,
        boxes: Vec<String>,
        room_ends: Vec<usize>,
        range: DateRange,
    ) -> Self {
        Self {
            rooms,
            boxes,
            room_ends,
            range,
            cursor: Mutex::new(Cursor::default()),
            halted: AtomicBool::new(false),
            claimed: AtomicUsize::new(0),
        }
    }

    /// Claims the next unit, or `None` when there is nothing left to claim.
    pub fn claim_next(&self) -> Option<MergeUnit> {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        self.skip_finished_rooms(&mut cursor);
        if self.halted.load(Ordering::Acquire) || cursor.room >= self.rooms.len() {
            return None;
        }

        let Some(box_label) = self.boxes.get(cursor.box_index) else {
            error!(
                room = %self.rooms[cursor.room],
                box_index = cursor.box_index,
                boxes = self.boxes.len(),
                "box list exhausted before rooms; stopping dispatch"
            );
            cursor.room = self.rooms.len();
            return None;
        };

        let unit = MergeUnit::new(&self.rooms[cursor.room], box_label, self.range);
        cursor.box_index += 1;
        self.skip_finished_rooms(&mut cursor);
        self.claimed.fetch_add(1, Ordering::Relaxed);
        Some(unit)
    }

    /// Moves the cursor past every room whose boxes are all claimed,
    /// including rooms without boxes.
    fn skip_finished_rooms(&self, cursor: &mut Cursor) {
        while cursor.room < self.rooms.len() && cursor.box_index >= self.room_ends[cursor.room] {
            cursor.room += 1;
        }
    }

    /// Stops handing out units. Claims already made are unaffected.
    pub fn halt(&self) {
        self.halted.store(true, Ordering::Release);
    }

    /// Returns true if [`Self::halt`] has been called.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Returns the number of units claimed so far.
    #[must_use]
    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::Relaxed)
    }

    /// Returns the number of units this dispatcher hands out in total.
    #[must_use]
    pub fn total(&self) -> usize {
        self.room_ends
            .last()
            .map_or(0, |end| (*end).min(self.boxes.len()))
    }

    /// Returns the date range given to every unit.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxmerge_types::Room;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn range() -> DateRange {
        DateRange::single_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn drain(dispatcher: &Dispatcher) -> Vec<String> {
        std::iter::from_fn(|| dispatcher.claim_next())
            .map(|u| u.output_name())
            .collect()
    }

    #[test]
    fn test_positional_claim_order() {
        let dispatcher =
            Dispatcher::positional(strings(&["A", "B"]), strings(&["1", "2", "3", "4"]), range());
        assert_eq!(dispatcher.total(), 4);
        assert_eq!(
            drain(&dispatcher),
            vec!["A_1.txt", "A_2.txt", "B_3.txt", "B_4.txt"]
        );
        assert_eq!(dispatcher.claimed(), 4);
    }

    #[test]
    fn test_done_is_terminal() {
        let dispatcher = Dispatcher::positional(strings(&["A"]), strings(&["1", "2"]), range());
        assert_eq!(drain(&dispatcher).len(), 2);
        for _ in 0..5 {
            assert!(dispatcher.claim_next().is_none());
        }
    }

    #[test]
    fn test_short_box_list_stops_dispatch() {
        let dispatcher =
            Dispatcher::positional(strings(&["A", "B"]), strings(&["1", "2", "3"]), range());
        assert_eq!(drain(&dispatcher), vec!["A_1.txt", "A_2.txt", "B_3.txt"]);
        assert!(dispatcher.claim_next().is_none());
    }

    #[test]
    fn test_halt_stops_claims() {
        let dispatcher =
            Dispatcher::positional(strings(&["A", "B"]), strings(&["1", "2", "3", "4"]), range());
        assert!(dispatcher.claim_next().is_some());
        dispatcher.halt();
        assert!(dispatcher.is_halted());
        assert!(dispatcher.claim_next().is_none());
        assert_eq!(dispatcher.claimed(), 1);
    }

    #[test]
    fn test_structured_layout_matches_enumeration() {
        let layout = RoomLayout::new(
            "b",
            vec![Room::new("A", ["1", "2", "3"]), Room::new("B", ["4"])],
        )
        .unwrap();
        let dispatcher = Dispatcher::new(&layout, range());
        let expected: Vec<_> = layout.units(range()).iter().map(|u| u.output_name()).collect();
        assert_eq!(drain(&dispatcher), expected);
    }

    #[test]
    fn test_rooms_without_boxes_are_skipped() {
        let layout = RoomLayout {
            base: "b".to_string(),
            rooms: vec![
                Room::new("A", Vec::<String>::new()),
                Room::new("B", ["1"]),
                Room::new("C", Vec::<String>::new()),
                Room::new("D", ["2", "3"]),
                Room::new("E", Vec::<String>::new()),
            ],
        };
        let dispatcher = Dispatcher::new(&layout, range());
        let expected: Vec<_> = layout.units(range()).iter().map(|u| u.output_name()).collect();

        assert_eq!(expected, vec!["B_1.txt", "D_2.txt", "D_3.txt"]);
        assert_eq!(drain(&dispatcher), expected);
        assert_eq!(dispatcher.total(), 3);
        assert!(dispatcher.claim_next().is_none());
    }

    #[test]
    fn test_concurrent_claims_are_unique_and_complete() {
        let rooms: Vec<String> = (0..50).map(|i| format!("R{i}")).collect();
        let boxes: Vec<String> = (0..100).map(|i| format!("B{i}")).collect();
        let dispatcher = Arc::new(Dispatcher::positional(rooms, boxes, range()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dispatcher = Arc::clone(&dispatcher);
                std::thread::spawn(move || drain(&dispatcher))
            })
            .collect();

        let claimed: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let unique: HashSet<_> = claimed.iter().cloned().collect();

        assert_eq!(claimed.len(), 100);
        assert_eq!(unique.len(), 100);
        assert!(unique.contains("R0_B0.txt"));
        assert!(unique.contains("R49_B99.txt"));
    }
}
