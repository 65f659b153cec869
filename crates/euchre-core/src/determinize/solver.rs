//! Backtracking search for the card-assignment problem behind determinization.
//!
//! Variables are (seat, slot) pairs. A pinned variable already holds a known
//! card; a free variable draws from a shared pool, filtered per seat. Every
//! variable must receive a distinct card. Domains are bit-masks over pool
//! positions, so the pool must not exceed 32 cards (the deck has 24).

use crate::model::card::Card;
use crate::model::player::PlayerPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub seat: PlayerPosition,
    pub slot: usize,
    pub card: Card,
}

#[derive(Debug, Clone, Copy)]
enum Domain {
    Pinned(Card),
    Pool(u32),
}

#[derive(Debug, Clone, Copy)]
struct Variable {
    seat: PlayerPosition,
    slot: usize,
    domain: Domain,
}

/// Free slots of one seat. They share a domain, so they are filled as an
/// increasing run of pool positions to skip permutations of the same hand.
#[derive(Debug, Clone)]
struct SeatGroup {
    seat: PlayerPosition,
    slots: Vec<usize>,
    mask: u32,
}

/// Search effort, reported through tracing by the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolveStats {
    pub nodes: usize,
    pub backtracks: usize,
}

#[derive(Debug, Clone)]
pub struct AllDifferentProblem {
    pool: Vec<Card>,
    variables: Vec<Variable>,
}

impl AllDifferentProblem {
    pub fn new(pool: Vec<Card>) -> Self {
        debug_assert!(pool.len() <= 32, "pool exceeds mask width");
        Self {
            pool,
            variables: Vec::new(),
        }
    }

    /// Adds a variable whose value is already known.
    pub fn pin(&mut self, seat: PlayerPosition, slot: usize, card: Card) {
        self.variables.push(Variable {
            seat,
            slot,
            domain: Domain::Pinned(card),
        });
    }

    /// Adds a variable ranging over the pool cards accepted by `allowed`.
    pub fn add_free<F>(&mut self, seat: PlayerPosition, slot: usize, allowed: F)
    where
        F: Fn(Card) -> bool,
    {
        let mask = self
            .pool
            .iter()
            .enumerate()
            .filter(|(_, card)| allowed(**card))
            .fold(0u32, |mask, (index, _)| mask | (1 << index));
        self.variables.push(Variable {
            seat,
            slot,
            domain: Domain::Pool(mask),
        });
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Finds one assignment satisfying every domain and the all-different
    /// constraint. Among solutions, the one using the earliest pool cards
    /// is returned, so a shuffled pool yields a random solution.
    pub fn solve(&self) -> (Option<Vec<Assignment>>, SolveStats) {
        let mut stats = SolveStats::default();
        let mut assignments = Vec::with_capacity(self.variables.len());

        let mut pinned = 0u32;
        for variable in &self.variables {
            if let Domain::Pinned(card) = variable.domain {
                let bit = 1u32 << card.to_id();
                if pinned & bit != 0 || self.pool.contains(&card) {
                    return (None, stats);
                }
                pinned |= bit;
                assignments.push(Assignment {
                    seat: variable.seat,
                    slot: variable.slot,
                    card,
                });
            }
        }

        let mut groups = self.seat_groups();
        // Most constrained seat first.
        groups.sort_by_key(|group| (group.mask.count_ones(), group.seat.index()));

        let mut chosen: Vec<Vec<usize>> = groups.iter().map(|_| Vec::new()).collect();
        let search = Search {
            groups: &groups,
            stats: &mut stats,
        };
        if !search.run(&mut chosen) {
            return (None, stats);
        }

        for (group, positions) in groups.iter().zip(chosen) {
            for (slot, position) in group.slots.iter().zip(positions) {
                assignments.push(Assignment {
                    seat: group.seat,
                    slot: *slot,
                    card: self.pool[position],
                });
            }
        }
        (Some(assignments), stats)
    }

    fn seat_groups(&self) -> Vec<SeatGroup> {
        let mut groups: Vec<SeatGroup> = Vec::new();
        for variable in &self.variables {
            let Domain::Pool(mask) = variable.domain else {
                continue;
            };
            match groups
                .iter_mut()
                .find(|group| group.seat == variable.seat && group.mask == mask)
            {
                Some(group) => group.slots.push(variable.slot),
                None => groups.push(SeatGroup {
                    seat: variable.seat,
                    slots: vec![variable.slot],
                    mask,
                }),
            }
        }
        groups
    }
}

struct Search<'a> {
    groups: &'a [SeatGroup],
    stats: &'a mut SolveStats,
}

impl Search<'_> {
    fn run(mut self, chosen: &mut [Vec<usize>]) -> bool {
        if !hall_condition(self.groups, chosen, 0) {
            return false;
        }
        self.fill(chosen, 0, 0)
    }

    fn fill(&mut self, chosen: &mut [Vec<usize>], group_index: usize, used: u32) -> bool {
        let Some(group) = self.groups.get(group_index) else {
            return true;
        };
        if chosen[group_index].len() == group.slots.len() {
            return self.fill(chosen, group_index + 1, used);
        }

        let floor = chosen[group_index].last().map_or(0, |&last| last + 1);
        let mut candidates = group.mask & !used & at_or_above(floor);
        while candidates != 0 {
            let position = candidates.trailing_zeros() as usize;
            candidates &= candidates - 1;
            self.stats.nodes += 1;

            let next_used = used | (1 << position);
            chosen[group_index].push(position);
            if hall_condition(self.groups, chosen, next_used)
                && self.fill(chosen, group_index, next_used)
            {
                return true;
            }
            chosen[group_index].pop();
            self.stats.backtracks += 1;
        }
        false
    }
}

fn at_or_above(position: usize) -> u32 {
    u32::try_from(position)
        .ok()
        .and_then(|shift| u32::MAX.checked_shl(shift))
        .unwrap_or(0)
}

/// Every set of unfinished seats must still see at least as many usable
/// cards as it needs. With this holding, the remaining slots can always be
/// completed, so the search never descends into a dead branch.
fn hall_condition(groups: &[SeatGroup], chosen: &[Vec<usize>], used: u32) -> bool {
    let open: Vec<(u32, usize)> = groups
        .iter()
        .zip(chosen)
        .filter(|(group, picked)| picked.len() < group.slots.len())
        .map(|(group, picked)| {
            let floor = picked.last().map_or(0, |&last| last + 1);
            let available = group.mask & !used & at_or_above(floor);
            (available, group.slots.len() - picked.len())
        })
        .collect();

    let subsets = 1usize << open.len();
    (1..subsets).all(|subset| {
        let (union, need) = open
            .iter()
            .enumerate()
            .filter(|(index, _)| subset & (1 << index) != 0)
            .fold((0u32, 0usize), |(union, need), (_, (available, count))| {
                (union | available, need + count)
            });
        union.count_ones() as usize >= need
    })
}
