//! Audit and summary of a finished run.

use alloc::collections::{BTreeMap, BTreeSet};
use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{AllocationRun, Resources};
use crate::model::{
    DayPair, OasisOutcome, PeriodId, Person, PersonId, Room, RoomId, RoomOutcome, Team, TeamId,
    Weekday,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub period: PeriodId,
    pub seed: u64,
    pub teams_placed: usize,
    pub teams_on_fallback: usize,
    pub teams_waitlisted: usize,
    pub rooms_used: usize,
    pub oasis_allocations: usize,
    pub people_allocated: usize,
    pub people_unmet: usize,
    pub people_short: usize,
    pub oasis_daily_usage: BTreeMap<Weekday, usize>,
    /// Percent of the daily capacity.
    pub oasis_utilization: BTreeMap<Weekday, f64>,
}

#[must_use]
pub fn summarize(run: &AllocationRun, resources: &Resources) -> AllocationSummary {
    let rooms = &run.rooms;
    let oasis = &run.oasis;
    let mut usage = oasis.allocations.iter().counts_by(|allocation| allocation.day);

    let oasis_daily_usage: BTreeMap<Weekday, usize> = resources
        .weekdays
        .iter()
        .map(|day| (*day, usage.remove(day).unwrap_or(0)))
        .collect();
    let oasis_utilization = oasis_daily_usage
        .iter()
        .map(|(day, used)| {
            let percent = if resources.daily_capacity == 0 {
                0.0
            } else {
                let used = u32::try_from(*used).unwrap_or(u32::MAX);
                f64::from(used) * 100.0 / f64::from(resources.daily_capacity)
            };
            (*day, percent)
        })
        .collect();

    AllocationSummary {
        period: run.period.clone(),
        seed: run.seed,
        teams_placed: rooms.allocations.len(),
        teams_on_fallback: rooms
            .allocations
            .iter()
            .filter(|allocation| allocation.fallback)
            .count(),
        teams_waitlisted: rooms.waitlist.len(),
        rooms_used: rooms
            .allocations
            .iter()
            .map(|allocation| &allocation.room_id)
            .unique()
            .count(),
        oasis_allocations: oasis.allocations.len(),
        people_allocated: oasis
            .allocations
            .iter()
            .map(|allocation| &allocation.person_id)
            .unique()
            .count(),
        people_unmet: oasis.unmet.len(),
        people_short: oasis.shortfalls.len(),
        oasis_daily_usage,
        oasis_utilization,
    }
}

/// A broken allocation invariant. The schedulers never produce these, a
/// violation means the output was built or modified somewhere else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("room {0} is not configured")]
    UnknownRoom(RoomId),
    #[error("team {0} was never submitted")]
    UnknownTeam(TeamId),
    #[error("room {room} only serves {serves}, but was allocated for {allocated}")]
    DayPairMismatch {
        room: RoomId,
        serves: DayPair,
        allocated: DayPair,
    },
    #[error("room {room} holds {used} people but only has {capacity} seats")]
    RoomOverCapacity {
        room: RoomId,
        used: u32,
        capacity: u32,
    },
    #[error("team {0} got more than one room")]
    TeamAllocatedTwice(TeamId),
    #[error("team {0} is neither allocated nor waitlisted")]
    TeamMissing(TeamId),
    #[error("team {0} is allocated and waitlisted")]
    TeamListedTwice(TeamId),
    #[error("person {0} was never submitted")]
    UnknownPerson(PersonId),
    #[error("{used} people sit in the oasis on {day}, capacity is {capacity}")]
    DayOverCapacity {
        day: Weekday,
        used: usize,
        capacity: u32,
    },
    #[error("{person} got {day} twice")]
    DayRepeated { person: PersonId, day: Weekday },
    #[error("person {0} is neither allocated nor unmet")]
    PersonMissing(PersonId),
    #[error("person {0} is allocated and unmet")]
    PersonListedTwice(PersonId),
}

#[must_use]
pub fn check_rooms(teams: &[Team], rooms: &[Room], outcome: &RoomOutcome) -> Vec<Violation> {
    let teams_by_id: HashMap<&TeamId, &Team> = teams.iter().map(|team| (&team.id, team)).collect();
    let rooms_by_id: BTreeMap<&RoomId, &Room> =
        rooms.iter().map(|room| (&room.id, room)).collect();
    let mut violations = Vec::new();
    let mut used: BTreeMap<&RoomId, u32> = BTreeMap::new();

    for allocation in &outcome.allocations {
        let Some(room) = rooms_by_id.get(&allocation.room_id) else {
            violations.push(Violation::UnknownRoom(allocation.room_id.clone()));
            continue;
        };
        if room.day_pair != allocation.day_pair {
            violations.push(Violation::DayPairMismatch {
                room: room.id.clone(),
                serves: room.day_pair,
                allocated: allocation.day_pair,
            });
        }
        match teams_by_id.get(&allocation.team_id) {
            Some(team) => *used.entry(&room.id).or_default() += team.size,
            None => violations.push(Violation::UnknownTeam(allocation.team_id.clone())),
        }
    }
    for (room, used) in used {
        let capacity = rooms_by_id[room].capacity;
        if used > capacity {
            violations.push(Violation::RoomOverCapacity {
                room: room.clone(),
                used,
                capacity,
            });
        }
    }

    let allocated = outcome
        .allocations
        .iter()
        .counts_by(|allocation| &allocation.team_id);
    let waitlisted: BTreeSet<&TeamId> =
        outcome.waitlist.iter().map(|entry| &entry.team.id).collect();
    for team in teams {
        let times = allocated.get(&team.id).copied().unwrap_or(0);
        if times > 1 {
            violations.push(Violation::TeamAllocatedTwice(team.id.clone()));
        }
        match (times > 0, waitlisted.contains(&team.id)) {
            (false, false) => violations.push(Violation::TeamMissing(team.id.clone())),
            (true, true) => violations.push(Violation::TeamListedTwice(team.id.clone())),
            _ => {}
        }
    }
    violations
}

#[must_use]
pub fn check_oasis(
    people: &[Person],
    daily_capacity: u32,
    outcome: &OasisOutcome,
) -> Vec<Violation> {
    let known: BTreeSet<&PersonId> = people.iter().map(|person| &person.id).collect();
    let mut violations: Vec<Violation> = outcome
        .allocations
        .iter()
        .map(|allocation| &allocation.person_id)
        .filter(|person| !known.contains(person))
        .unique()
        .map(|person| Violation::UnknownPerson(person.clone()))
        .collect();

    let per_day: BTreeMap<Weekday, usize> = outcome
        .allocations
        .iter()
        .counts_by(|allocation| allocation.day)
        .into_iter()
        .collect();
    for (day, used) in per_day {
        if used > usize::try_from(daily_capacity).unwrap_or(usize::MAX) {
            violations.push(Violation::DayOverCapacity {
                day,
                used,
                capacity: daily_capacity,
            });
        }
    }

    violations.extend(
        outcome
            .allocations
            .iter()
            .map(|allocation| (&allocation.person_id, allocation.day))
            .duplicates()
            .map(|(person, day)| Violation::DayRepeated {
                person: person.clone(),
                day,
            }),
    );

    let allocated: BTreeSet<&PersonId> = outcome
        .allocations
        .iter()
        .map(|allocation| &allocation.person_id)
        .collect();
    let unmet: BTreeSet<&PersonId> =
        outcome.unmet.iter().map(|request| &request.person_id).collect();
    for person in people {
        match (allocated.contains(&person.id), unmet.contains(&person.id)) {
            (false, false) => violations.push(Violation::PersonMissing(person.id.clone())),
            (true, true) => violations.push(Violation::PersonListedTwice(person.id.clone())),
            _ => {}
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AllocationEngine;
    use crate::fairness::FairnessRng;
    use crate::model::{OasisAllocation, RoomAllocation, UnmetReason, UnmetRequest};

    fn team(id: &str, size: u32) -> Team {
        Team {
            id: id.into(),
            name: id.to_owned(),
            contact_person: "Kim".to_owned(),
            size,
            preferred_day_pair: DayPair::MonWed,
            submitted_at: None,
        }
    }

    fn room(id: &str, capacity: u32) -> Room {
        Room {
            id: id.into(),
            capacity,
            day_pair: DayPair::MonWed,
        }
    }

    fn allocation(team: &str, room: &str) -> RoomAllocation {
        RoomAllocation {
            team_id: team.into(),
            room_id: room.into(),
            day_pair: DayPair::MonWed,
            fallback: false,
        }
    }

    #[test]
    fn detects_overfull_rooms_and_missing_teams() {
        let teams = [team("t1", 4), team("t2", 4), team("t3", 3)];
        let rooms = [room("a", 6)];
        let outcome = RoomOutcome {
            allocations: vec![allocation("t1", "a"), allocation("t2", "a")],
            waitlist: Vec::new(),
        };
        assert_eq!(
            check_rooms(&teams, &rooms, &outcome),
            vec![
                Violation::RoomOverCapacity {
                    room: "a".into(),
                    used: 8,
                    capacity: 6
                },
                Violation::TeamMissing("t3".into()),
            ]
        );
    }

    #[test]
    fn detects_double_rooms() {
        let teams = [team("t1", 3)];
        let rooms = [room("a", 6), room("b", 6)];
        let outcome = RoomOutcome {
            allocations: vec![allocation("t1", "a"), allocation("t1", "b")],
            waitlist: Vec::new(),
        };
        assert_eq!(
            check_rooms(&teams, &rooms, &outcome),
            vec![Violation::TeamAllocatedTwice("t1".into())]
        );
    }

    #[test]
    fn detects_oasis_violations() {
        let people = [
            Person {
                id: "p1".into(),
                name: "p1".to_owned(),
                preferred_days: BTreeSet::from([Weekday::Monday]),
            },
            Person {
                id: "p2".into(),
                name: "p2".to_owned(),
                preferred_days: BTreeSet::from([Weekday::Monday]),
            },
        ];
        let monday = |person: &str| OasisAllocation {
            person_id: person.into(),
            day: Weekday::Monday,
        };
        let outcome = OasisOutcome {
            allocations: vec![monday("p1"), monday("p1")],
            unmet: vec![UnmetRequest {
                person_id: "p1".into(),
                requested: BTreeSet::from([Weekday::Monday]),
                reason: UnmetReason::PreferredDaysFull,
            }],
            shortfalls: Vec::new(),
        };
        assert_eq!(
            check_oasis(&people, 1, &outcome),
            vec![
                Violation::DayOverCapacity {
                    day: Weekday::Monday,
                    used: 2,
                    capacity: 1
                },
                Violation::DayRepeated {
                    person: "p1".into(),
                    day: Weekday::Monday
                },
                Violation::PersonListedTwice("p1".into()),
                Violation::PersonMissing("p2".into()),
            ]
        );
    }

    #[test]
    fn summary_counts_a_run() {
        let resources = Resources::default();
        let snapshot = crate::engine::Snapshot {
            period: "week".into(),
            teams: vec![team("t1", 6), team("t2", 6), team("t3", 6)],
            people: (0..3)
                .map(|index| Person {
                    id: format!("p{index}").into(),
                    name: format!("p{index}"),
                    preferred_days: BTreeSet::from([Weekday::Monday, Weekday::Tuesday]),
                })
                .collect(),
        };
        let run = AllocationEngine
            .run(&snapshot, &resources, &mut FairnessRng::from_seed(8))
            .unwrap();
        assert!(check_rooms(&snapshot.teams, &resources.rooms, &run.rooms).is_empty());
        assert!(check_oasis(&snapshot.people, resources.daily_capacity, &run.oasis).is_empty());

        let summary = summarize(&run, &resources);
        // two six-seat rooms per day pair: the third team falls back
        assert_eq!(summary.teams_placed, 3);
        assert_eq!(summary.teams_on_fallback, 1);
        assert_eq!(summary.teams_waitlisted, 0);
        assert_eq!(summary.rooms_used, 3);
        assert_eq!(summary.oasis_allocations, 6);
        assert_eq!(summary.people_allocated, 3);
        assert_eq!(summary.oasis_daily_usage[&Weekday::Monday], 3);
        assert_eq!(summary.oasis_daily_usage[&Weekday::Friday], 0);
        let monday = summary.oasis_utilization[&Weekday::Monday];
        assert!((monday - 300.0 / 11.0).abs() < 1e-9);
    }
}
