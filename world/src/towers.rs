//! Authoritative tower state management utilities.

use concept_trainer_core::{Position, TowerElement, TowerId, TowerSnapshot};

/// Tower stored inside the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Display name of the tower.
    pub(crate) name: &'static str,
    /// Position the tower occupies.
    pub(crate) position: Position,
    /// Element the tower demands from its soaker.
    pub(crate) element: TowerElement,
}

/// Name and position of every tower in the two-tower set.
const FIRST_SET: [(&str, Position); 2] = [
    ("North Tower", Position::new(270.0, 120.0)),
    ("South Tower", Position::new(270.0, 380.0)),
];

/// Name and position of every tower in the four-tower set.
const FINAL_SET: [(&str, Position); 4] = [
    ("North Tower", Position::new(270.0, 75.0)),
    ("Mid-North Tower", Position::new(270.0, 195.0)),
    ("Mid-South Tower", Position::new(270.0, 315.0)),
    ("South Tower", Position::new(270.0, 435.0)),
];

/// Board that stores phase-scoped towers and manages identifier allocation.
///
/// Identifiers keep incrementing across spawns; a cleared tower's id is
/// never reused.
#[derive(Debug)]
pub(crate) struct TowerBoard {
    entries: Vec<TowerState>,
    next_tower_id: TowerId,
}

impl TowerBoard {
    /// Creates an empty tower board with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Removes every tower from the board.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Resets the board and the identifier counter to their initial state.
    pub(crate) fn reset(&mut self) {
        self.entries.clear();
        self.next_tower_id = TowerId::new(0);
    }

    /// Spawns the two-tower set, replacing any previous set.
    pub(crate) fn spawn_first_set(&mut self, element: TowerElement) {
        self.spawn(&FIRST_SET, element);
    }

    /// Spawns the four-tower set, replacing any previous set.
    pub(crate) fn spawn_final_set(&mut self, element: TowerElement) {
        self.spawn(&FINAL_SET, element);
    }

    fn spawn(&mut self, layout: &[(&'static str, Position)], element: TowerElement) {
        self.entries.clear();
        for (name, position) in layout {
            let id = self.next_tower_id;
            self.next_tower_id = TowerId::new(id.get() + 1);
            self.entries.push(TowerState {
                id,
                name,
                position: *position,
                element,
            });
        }
    }

    /// Captures snapshots of every tower on the board.
    pub(crate) fn snapshots(&self) -> Vec<TowerSnapshot> {
        self.entries
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                name: tower.name,
                position: tower.position,
                element: tower.element,
            })
            .collect()
    }
}
