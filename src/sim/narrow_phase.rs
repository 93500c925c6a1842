//! Narrow phase: exact circle/circle tests between bubbles sharing a cell

use std::collections::BTreeSet;

use super::collision::circle_circle_overlap;
use super::state::{BubbleId, World};

/// Counters from one narrow phase pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NarrowPhaseStats {
    /// Exact overlap tests performed
    pub checks: usize,
    /// Unordered bubble pairs in contact
    pub contact_pairs: usize,
}

/// Rebuild every bubble's contact set from the current grid.
///
/// Requires a broad phase over the same registry; grid slots index into it.
pub fn detect(world: &mut World) -> NarrowPhaseStats {
    let mut stats = NarrowPhaseStats::default();
    let mut candidates: Vec<usize> = Vec::new();

    let found: Vec<BTreeSet<BubbleId>> = world
        .bubbles
        .iter()
        .enumerate()
        .map(|(slot, bubble)| {
            candidates.clear();
            for &coord in &bubble.cells {
                candidates.extend_from_slice(world.grid.cell(coord));
            }
            // A pair sharing several cells is tested once
            candidates.sort_unstable();
            candidates.dedup();

            let mut contacts = BTreeSet::new();
            for &other_slot in &candidates {
                if other_slot == slot {
                    continue;
                }
                let other = &world.bubbles[other_slot];
                stats.checks += 1;
                if circle_circle_overlap(bubble.pos, bubble.radius, other.pos, other.radius) {
                    contacts.insert(other.id);
                }
            }
            contacts
        })
        .collect();

    stats.contact_pairs = assign(world, found);
    stats
}

/// Reference narrow phase: every bubble against every other, ignoring the grid
pub fn detect_brute_force(world: &mut World) -> NarrowPhaseStats {
    let mut stats = NarrowPhaseStats::default();

    let found: Vec<BTreeSet<BubbleId>> = world
        .bubbles
        .iter()
        .map(|bubble| {
            world
                .bubbles
                .iter()
                .filter(|other| other.id != bubble.id)
                .filter(|other| {
                    stats.checks += 1;
                    circle_circle_overlap(bubble.pos, bubble.radius, other.pos, other.radius)
                })
                .map(|other| other.id)
                .collect()
        })
        .collect();

    stats.contact_pairs = assign(world, found);
    stats
}

/// Store contact sets on their bubbles; returns the number of unordered pairs
fn assign(world: &mut World, found: Vec<BTreeSet<BubbleId>>) -> usize {
    let mut directed = 0;
    for (bubble, contacts) in world.bubbles.iter_mut().zip(found) {
        directed += contacts.len();
        bubble.contacts = contacts;
    }
    directed / 2
}
