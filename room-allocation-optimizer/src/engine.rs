use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::AllocationError;
use crate::fairness::FairnessRng;
use crate::model::{
    DayPair, OasisOutcome, PeriodId, Person, Room, RoomId, RoomOutcome, Team, Weekday,
};
use crate::{oasis, rooms};

pub const DEFAULT_DAILY_CAPACITY: u32 = 11;

/// Everything that can be handed out in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub rooms: Vec<Room>,
    pub daily_capacity: u32,
    pub weekdays: Vec<Weekday>,
}

impl Default for Resources {
    /// Two rooms with six seats and seven rooms with four seats, each bookable
    /// on both day pairs, and an oasis with eleven seats from Monday to Friday.
    fn default() -> Self {
        let rooms = DayPair::ALL
            .into_iter()
            .flat_map(|day_pair| {
                ('A'..='I').map(move |letter| Room {
                    id: RoomId::new(format!(
                        "room-{}-{}",
                        letter.to_ascii_lowercase(),
                        day_pair.as_str()
                    )),
                    capacity: if matches!(letter, 'A' | 'B') { 6 } else { 4 },
                    day_pair,
                })
            })
            .collect();
        Self {
            rooms,
            daily_capacity: DEFAULT_DAILY_CAPACITY,
            weekdays: Weekday::ALL.to_vec(),
        }
    }
}

/// All submissions of one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub period: PeriodId,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub people: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRun {
    pub period: PeriodId,
    pub seed: u64,
    pub rooms: RoomOutcome,
    pub oasis: OasisOutcome,
}

/// Entry point for callers. Holds no state, every call only depends on its
/// arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine;

impl AllocationEngine {
    pub fn allocate_rooms(
        &self,
        teams: &[Team],
        rooms: &[Room],
        rng: &mut FairnessRng,
    ) -> Result<RoomOutcome, AllocationError> {
        rooms::allocate(teams, rooms, rng)
    }

    pub fn allocate_oasis(
        &self,
        people: &[Person],
        daily_capacity: u32,
        weekdays: &[Weekday],
        rng: &mut FairnessRng,
    ) -> Result<OasisOutcome, AllocationError> {
        oasis::allocate(people, daily_capacity, weekdays, rng)
    }

    /// Runs both allocations. Nothing is allocated unless both categories
    /// pass validation.
    #[instrument(skip_all, fields(period = %snapshot.period, seed = rng.seed()))]
    pub fn run(
        &self,
        snapshot: &Snapshot,
        resources: &Resources,
        rng: &mut FairnessRng,
    ) -> Result<AllocationRun, AllocationError> {
        rooms::validate_rooms(&resources.rooms)?;
        oasis::validate_config(resources.daily_capacity, &resources.weekdays)?;
        rooms::validate_teams(&snapshot.teams)?;
        oasis::validate_people(&snapshot.people, &resources.weekdays)?;

        let rooms = rooms::place(&snapshot.teams, &resources.rooms, rng);
        let oasis = oasis::distribute(
            &snapshot.people,
            resources.daily_capacity,
            &resources.weekdays,
            rng,
        );
        info!(
            waitlisted = rooms.waitlist.len(),
            unmet = oasis.unmet.len(),
            "allocation run finished"
        );
        Ok(AllocationRun {
            period: snapshot.period.clone(),
            seed: rng.seed(),
            rooms,
            oasis,
        })
    }
}
