//! Oasis day allocation for individuals.
//!
//! The first pass guarantees every person one preferred day if any of them
//! still has a seat. Following top-up passes hand out at most one more day
//! per person and pass until nobody can get another day. Every pass visits
//! people in a fresh random order and always picks the preferred day with
//! the most seats left, so demand spreads towards emptier days.

use alloc::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::error::{AdhocRejection, AllocationError, ConfigError, ValidationError};
use crate::fairness::{pick_max_by_key, FairnessRng};
use crate::model::{
    OasisAllocation, OasisOutcome, Person, PersonId, Shortfall, UnmetReason, UnmetRequest, Weekday,
};

/// Remaining seats per weekday, `None` for days that are not allocated.
#[derive(Debug, Clone, Copy)]
struct DayLedger([Option<u32>; Weekday::ALL.len()]);

impl DayLedger {
    fn new(daily_capacity: u32, weekdays: &[Weekday]) -> Self {
        let mut remaining = [None; Weekday::ALL.len()];
        for day in weekdays {
            remaining[day.index()] = Some(daily_capacity);
        }
        Self(remaining)
    }

    const fn remaining(&self, day: Weekday) -> u32 {
        match self.0[day.index()] {
            Some(remaining) => remaining,
            None => 0,
        }
    }

    fn take(&mut self, day: Weekday) {
        if let Some(remaining) = &mut self.0[day.index()] {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

struct Request<'a> {
    person: &'a Person,
    granted: BTreeSet<Weekday>,
}

impl Request<'_> {
    /// Grants the open preferred day with the most seats left.
    fn grant_one(
        &mut self,
        ledger: &mut DayLedger,
        rng: &mut FairnessRng,
        allocations: &mut Vec<OasisAllocation>,
    ) -> bool {
        let open = self
            .person
            .preferred_days
            .iter()
            .copied()
            .filter(|day| !self.granted.contains(day) && ledger.remaining(*day) > 0);
        let Some(day) = pick_max_by_key(open, rng, |day| ledger.remaining(*day)) else {
            return false;
        };
        ledger.take(day);
        self.granted.insert(day);
        allocations.push(OasisAllocation {
            person_id: self.person.id.clone(),
            day,
        });
        true
    }
}

pub(crate) fn validate_config(
    daily_capacity: u32,
    weekdays: &[Weekday],
) -> Result<(), ConfigError> {
    if daily_capacity == 0 {
        return Err(ConfigError::DailyCapacity);
    }
    if let Some(day) = weekdays.iter().duplicates().next() {
        return Err(ConfigError::DuplicateWeekday(*day));
    }
    Ok(())
}

pub(crate) fn validate_people(
    people: &[Person],
    weekdays: &[Weekday],
) -> Result<(), ValidationError> {
    for person in people {
        if person.preferred_days.is_empty() {
            return Err(ValidationError::NoPreferredDays(person.id.clone()));
        }
        if let Some(day) = person
            .preferred_days
            .iter()
            .find(|day| !weekdays.contains(day))
        {
            return Err(ValidationError::UnknownWeekday {
                person: person.id.clone(),
                day: *day,
            });
        }
    }
    if let Some(id) = people.iter().map(|person| &person.id).duplicates().next() {
        return Err(ValidationError::DuplicatePerson(id.clone()));
    }
    Ok(())
}

pub fn allocate(
    people: &[Person],
    daily_capacity: u32,
    weekdays: &[Weekday],
    rng: &mut FairnessRng,
) -> Result<OasisOutcome, AllocationError> {
    validate_config(daily_capacity, weekdays)?;
    validate_people(people, weekdays)?;
    Ok(distribute(people, daily_capacity, weekdays, rng))
}

/// Runs the passes on input that already passed [`validate_config`] and
/// [`validate_people`].
#[instrument(
    skip_all,
    fields(people = people.len(), daily_capacity = daily_capacity, seed = rng.seed())
)]
pub(crate) fn distribute(
    people: &[Person],
    daily_capacity: u32,
    weekdays: &[Weekday],
    rng: &mut FairnessRng,
) -> OasisOutcome {
    let mut ledger = DayLedger::new(daily_capacity, weekdays);
    let mut requests: Vec<Request> = people
        .iter()
        .map(|person| Request {
            person,
            granted: BTreeSet::new(),
        })
        .collect();
    let mut allocations = Vec::new();
    let mut order: Vec<usize> = (0..requests.len()).collect();

    rng.shuffle(&mut order);
    for &index in &order {
        requests[index].grant_one(&mut ledger, rng, &mut allocations);
    }
    debug!(granted = allocations.len(), "guarantee pass done");

    // every productive pass grants at least one slot
    let max_passes: usize = people.iter().map(|person| person.preferred_days.len()).sum();
    for pass in 0..max_passes {
        rng.shuffle(&mut order);
        let mut granted = 0_usize;
        for &index in &order {
            let request = &mut requests[index];
            if !request.granted.is_empty()
                && request.grant_one(&mut ledger, rng, &mut allocations)
            {
                granted += 1;
            }
        }
        debug!(pass = pass + 2, granted, "top-up pass done");
        if granted == 0 {
            break;
        }
    }

    let mut unmet = Vec::new();
    let mut shortfalls = Vec::new();
    for request in &requests {
        if request.granted.is_empty() {
            unmet.push(UnmetRequest {
                person_id: request.person.id.clone(),
                requested: request.person.preferred_days.clone(),
                reason: UnmetReason::PreferredDaysFull,
            });
        } else if request.granted.len() < request.person.preferred_days.len() {
            shortfalls.push(Shortfall {
                person_id: request.person.id.clone(),
                granted: request.granted.len(),
                missing: request
                    .person
                    .preferred_days
                    .difference(&request.granted)
                    .copied()
                    .collect(),
            });
        }
    }

    info!(
        allocations = allocations.len(),
        unmet = unmet.len(),
        short = shortfalls.len(),
        "allocated oasis days"
    );
    OasisOutcome {
        allocations,
        unmet,
        shortfalls,
    }
}

/// Seats left per configured weekday given already persisted allocations.
#[must_use]
pub fn availability(
    existing: &[OasisAllocation],
    daily_capacity: u32,
    weekdays: &[Weekday],
) -> BTreeMap<Weekday, u32> {
    let taken = existing.iter().counts_by(|allocation| allocation.day);
    weekdays
        .iter()
        .map(|day| {
            let taken = taken.get(day).copied().unwrap_or(0);
            let taken = u32::try_from(taken).unwrap_or(u32::MAX);
            (*day, daily_capacity.saturating_sub(taken))
        })
        .collect()
}

/// Books one more day for a person after a run.
///
/// Nothing is stored, the returned row has to be persisted by the caller
/// while holding the same lock that guards allocation runs.
pub fn add_adhoc(
    person: &PersonId,
    day: Weekday,
    existing: &[OasisAllocation],
    daily_capacity: u32,
    weekdays: &[Weekday],
) -> Result<OasisAllocation, AdhocRejection> {
    let Some(remaining) = availability(existing, daily_capacity, weekdays)
        .get(&day)
        .copied()
    else {
        return Err(AdhocRejection::UnknownDay(day));
    };
    if existing
        .iter()
        .any(|allocation| allocation.day == day && &allocation.person_id == person)
    {
        return Err(AdhocRejection::AlreadyAllocated {
            person: person.clone(),
            day,
        });
    }
    if remaining == 0 {
        return Err(AdhocRejection::DayFull(day));
    }
    Ok(OasisAllocation {
        person_id: person.clone(),
        day,
    })
}
