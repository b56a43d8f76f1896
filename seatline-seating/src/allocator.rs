use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use seatline_shared::SeatAssignment;
use crate::layout::SectionLayout;

/// Random draws attempted before falling back to scanning the free seats
const MAX_RANDOM_DRAWS: usize = 32;

/// Point-in-time view of one section
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SectionOccupancy {
    pub section: String,
    pub capacity: u32,
    pub occupied: u32,
    pub seats: Vec<u32>,
}

struct SectionState {
    name: String,
    capacity: u32,
    occupied: HashSet<u32>,
}

impl SectionState {
    fn has_free_capacity(&self) -> bool {
        (self.occupied.len() as u32) < self.capacity
    }

    fn can_take(&self, seat: u32) -> bool {
        seat < self.capacity && self.has_free_capacity() && !self.occupied.contains(&seat)
    }

    fn draw_free_seat<R: Rng>(&self, rng: &mut R) -> Option<u32> {
        for _ in 0..MAX_RANDOM_DRAWS {
            let candidate = rng.gen_range(0..self.capacity);
            if !self.occupied.contains(&candidate) {
                return Some(candidate);
            }
        }

        tracing::debug!(
            "Random draw exhausted in section {} ({}/{} taken), scanning free seats",
            self.name,
            self.occupied.len(),
            self.capacity
        );
        let free: Vec<u32> = (0..self.capacity)
            .filter(|seat| !self.occupied.contains(seat))
            .collect();
        free.choose(rng).copied()
    }
}

/// In-memory occupancy for every section.
///
/// All sections sit behind one mutex so each public operation is a single
/// read-check-mark step; the lock is never held across an await point.
pub struct SeatAllocator {
    sections: Mutex<Vec<SectionState>>,
}

impl SeatAllocator {
    pub fn new(layout: Vec<SectionLayout>) -> Result<Self, AllocationError> {
        if layout.is_empty() {
            return Err(AllocationError::InvalidLayout("at least one section is required".to_string()));
        }

        let mut names = HashSet::new();
        let mut sections = Vec::with_capacity(layout.len());
        for section in layout {
            if section.name.trim().is_empty() {
                return Err(AllocationError::InvalidLayout("section name is empty".to_string()));
            }
            if section.capacity == 0 {
                return Err(AllocationError::InvalidLayout(format!(
                    "section {} has zero capacity",
                    section.name
                )));
            }
            if !names.insert(section.name.clone()) {
                return Err(AllocationError::InvalidLayout(format!(
                    "section {} is declared twice",
                    section.name
                )));
            }
            sections.push(SectionState {
                name: section.name,
                capacity: section.capacity,
                occupied: HashSet::new(),
            });
        }

        Ok(Self {
            sections: Mutex::new(sections),
        })
    }

    /// Pick a section with free capacity (uniformly when several qualify),
    /// then a free seat inside it, and mark it occupied.
    pub fn allocate(&self) -> Result<SeatAssignment, AllocationError> {
        let mut sections = self.lock();
        let mut rng = rand::thread_rng();

        let candidates: Vec<usize> = sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has_free_capacity())
            .map(|(index, _)| index)
            .collect();

        let index = *candidates
            .choose(&mut rng)
            .ok_or(AllocationError::CapacityExhausted)?;

        let section = &mut sections[index];
        let seat = section
            .draw_free_seat(&mut rng)
            .ok_or(AllocationError::CapacityExhausted)?;
        section.occupied.insert(seat);

        Ok(SeatAssignment::new(seat, section.name.clone()))
    }

    /// Take one named seat, failing when it is held or its section is full
    pub fn allocate_specific(&self, seat: u32, section: &str) -> Result<(), AllocationError> {
        let mut sections = self.lock();
        let state = sections
            .iter_mut()
            .find(|s| s.name == section)
            .filter(|s| s.can_take(seat))
            .ok_or_else(|| AllocationError::unavailable(seat, section))?;

        state.occupied.insert(seat);
        Ok(())
    }

    /// Release a seat. Releasing a free seat or an unknown section is a no-op.
    pub fn deallocate(&self, seat: u32, section: &str) {
        let mut sections = self.lock();
        if let Some(state) = sections.iter_mut().find(|s| s.name == section) {
            state.occupied.remove(&seat);
        }
    }

    /// Move a holder from one seat to another in a single step.
    ///
    /// The old seat is released before the new one is checked. On failure the
    /// old seat stays held.
    pub fn reassign(&self, from: &SeatAssignment, to: &SeatAssignment) -> Result<(), AllocationError> {
        let mut sections = self.lock();

        let target = sections
            .iter()
            .position(|s| s.name == to.section)
            .ok_or_else(|| AllocationError::unavailable(to.seat, &to.section))?;
        let source = sections.iter().position(|s| s.name == from.section);

        let released = match source {
            Some(index) => sections[index].occupied.remove(&from.seat),
            None => false,
        };

        if !sections[target].can_take(to.seat) {
            if let (Some(index), true) = (source, released) {
                sections[index].occupied.insert(from.seat);
            }
            return Err(AllocationError::unavailable(to.seat, &to.section));
        }

        sections[target].occupied.insert(to.seat);
        Ok(())
    }

    /// Mark a seat recorded in durable storage as occupied
    pub fn restore(&self, assignment: &SeatAssignment) -> Result<(), AllocationError> {
        self.allocate_specific(assignment.seat, &assignment.section)
    }

    pub fn is_occupied(&self, seat: u32, section: &str) -> bool {
        self.lock()
            .iter()
            .find(|s| s.name == section)
            .is_some_and(|s| s.occupied.contains(&seat))
    }

    pub fn occupancy(&self) -> Vec<SectionOccupancy> {
        self.lock()
            .iter()
            .map(|s| {
                let mut seats: Vec<u32> = s.occupied.iter().copied().collect();
                seats.sort_unstable();
                SectionOccupancy {
                    section: s.name.clone(),
                    capacity: s.capacity,
                    occupied: seats.len() as u32,
                    seats,
                }
            })
            .collect()
    }

    // Every critical section leaves the sets consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<SectionState>> {
        self.sections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SeatAllocator {
    fn default() -> Self {
        let sections = SectionLayout::default_layout()
            .into_iter()
            .map(|layout| SectionState {
                name: layout.name,
                capacity: layout.capacity,
                occupied: HashSet::new(),
            })
            .collect();

        Self {
            sections: Mutex::new(sections),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("Max seat limit reached in every section")]
    CapacityExhausted,

    #[error("Seat {seat} in section {section} is not available")]
    SeatUnavailable {
        seat: u32,
        section: String,
    },

    #[error("Invalid seating layout: {0}")]
    InvalidLayout(String),
}

impl AllocationError {
    fn unavailable(seat: u32, section: &str) -> Self {
        AllocationError::SeatUnavailable {
            seat,
            section: section.to_string(),
        }
    }
}
