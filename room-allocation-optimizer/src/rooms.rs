//! Project room allocation for teams.
//!
//! Teams are grouped by the day pair they asked for and served largest
//! first. Each team goes into the first room (ascending id) of its day pair
//! with enough seats left. Teams that did not fit get one first-fit attempt
//! on the other day pair once both day pairs served their own teams, and
//! end up on the waitlist otherwise.
//!
//! This is a greedy heuristic. It can waitlist a team that a different
//! packing would have placed.

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::error::{AllocationError, ConfigError, ValidationError};
use crate::fairness::{priority_order, FairnessRng};
use crate::model::{
    DayPair, Room, RoomAllocation, RoomOutcome, Team, WaitlistReason, WaitlistedTeam, TEAM_SIZES,
};

/// Remaining seats of the rooms of one day pair.
struct RoomLedger<'a> {
    rooms: Vec<(&'a Room, u32)>,
}

impl<'a> RoomLedger<'a> {
    fn new(rooms: impl Iterator<Item = &'a Room>) -> Self {
        let mut rooms: Vec<_> = rooms.map(|room| (room, room.capacity)).collect();
        rooms.sort_by(|left, right| left.0.id.cmp(&right.0.id));
        Self { rooms }
    }

    fn first_fit(&mut self, size: u32) -> Option<&'a Room> {
        let (room, remaining) = self
            .rooms
            .iter_mut()
            .find(|(_, remaining)| *remaining >= size)?;
        *remaining -= size;
        Some(*room)
    }
}

pub(crate) fn validate_rooms(rooms: &[Room]) -> Result<(), ConfigError> {
    if let Some(room) = rooms.iter().find(|room| room.capacity == 0) {
        return Err(ConfigError::RoomCapacity(room.id.clone()));
    }
    if let Some(id) = rooms.iter().map(|room| &room.id).duplicates().next() {
        return Err(ConfigError::DuplicateRoom(id.clone()));
    }
    Ok(())
}

pub(crate) fn validate_teams(teams: &[Team]) -> Result<(), ValidationError> {
    if let Some(team) = teams.iter().find(|team| !TEAM_SIZES.contains(&team.size)) {
        return Err(ValidationError::TeamSize {
            team: team.id.clone(),
            size: team.size,
        });
    }
    if let Some(id) = teams.iter().map(|team| &team.id).duplicates().next() {
        return Err(ValidationError::DuplicateTeam(id.clone()));
    }
    Ok(())
}

pub fn allocate(
    teams: &[Team],
    rooms: &[Room],
    rng: &mut FairnessRng,
) -> Result<RoomOutcome, AllocationError> {
    validate_rooms(rooms)?;
    validate_teams(teams)?;
    Ok(place(teams, rooms, rng))
}

/// Places teams that already passed [`validate_teams`] into rooms that
/// passed [`validate_rooms`].
#[instrument(skip_all, fields(teams = teams.len(), rooms = rooms.len(), seed = rng.seed()))]
pub(crate) fn place(teams: &[Team], rooms: &[Room], rng: &mut FairnessRng) -> RoomOutcome {
    let mut ledgers = DayPair::ALL.map(|pair| {
        RoomLedger::new(rooms.iter().filter(move |room| room.day_pair == pair))
    });
    let mut groups = teams
        .iter()
        .into_group_map_by(|team| team.preferred_day_pair);

    let mut allocations = Vec::with_capacity(teams.len());
    let mut unplaced = Vec::new();

    for pair in DayPair::ALL {
        let mut group = groups.remove(&pair).unwrap_or_default();
        priority_order(&mut group, rng, |team| team.size);
        for team in group {
            match ledgers[pair.index()].first_fit(team.size) {
                Some(room) => allocations.push(RoomAllocation {
                    team_id: team.id.clone(),
                    room_id: room.id.clone(),
                    day_pair: pair,
                    fallback: false,
                }),
                None => unplaced.push(team),
            }
        }
    }
    debug!(
        placed = allocations.len(),
        unplaced = unplaced.len(),
        "served preferred day pairs"
    );

    priority_order(&mut unplaced, rng, |team| team.size);
    let mut waitlist = Vec::new();
    for team in unplaced {
        let pair = team.preferred_day_pair.other();
        match ledgers[pair.index()].first_fit(team.size) {
            Some(room) => allocations.push(RoomAllocation {
                team_id: team.id.clone(),
                room_id: room.id.clone(),
                day_pair: pair,
                fallback: true,
            }),
            None => waitlist.push(WaitlistedTeam {
                team: team.clone(),
                reason: WaitlistReason::NoCapacity,
            }),
        }
    }

    info!(
        placed = allocations.len(),
        waitlisted = waitlist.len(),
        "allocated project rooms"
    );
    RoomOutcome {
        allocations,
        waitlist,
    }
}
