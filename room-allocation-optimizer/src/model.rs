// these come from the submission layer, which already checked names and formats.
// ids have to be unique within one submitted set, the engine only checks that.

use alloc::collections::BTreeSet;
use core::fmt;
use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(TeamId);
define_id!(PersonId);
define_id!(RoomId);
define_id!(PeriodId);

/// Allowed number of members of a team asking for a project room.
pub const TEAM_SIZES: RangeInclusive<u32> = 3..=6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Self; 5] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    /// Position in the week, usable as an array index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        })
    }
}

/// The two day combinations a project room can be booked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayPair {
    MonWed,
    TueThu,
}

impl DayPair {
    pub const ALL: [Self; 2] = [Self::MonWed, Self::TueThu];

    #[must_use]
    pub const fn days(self) -> [Weekday; 2] {
        match self {
            Self::MonWed => [Weekday::Monday, Weekday::Wednesday],
            Self::TueThu => [Weekday::Tuesday, Weekday::Thursday],
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::MonWed => Self::TueThu,
            Self::TueThu => Self::MonWed,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Same spelling as the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MonWed => "mon-wed",
            Self::TueThu => "tue-thu",
        }
    }
}

impl fmt::Display for DayPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [first, second] = self.days();
        write!(f, "{first} & {second}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub contact_person: String,
    pub size: u32,
    pub preferred_day_pair: DayPair,
    /// Only shown to admins, never used for priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub preferred_days: BTreeSet<Weekday>,
}

/// A project room that is only bookable on one day pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub capacity: u32,
    pub day_pair: DayPair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAllocation {
    pub team_id: TeamId,
    pub room_id: RoomId,
    pub day_pair: DayPair,
    /// The team did not get its preferred day pair.
    pub fallback: bool,
}

impl RoomAllocation {
    #[must_use]
    pub const fn days(&self) -> [Weekday; 2] {
        self.day_pair.days()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OasisAllocation {
    pub person_id: PersonId,
    pub day: Weekday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistReason {
    NoCapacity,
}

impl fmt::Display for WaitlistReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCapacity => f.write_str("no capacity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistedTeam {
    pub team: Team,
    pub reason: WaitlistReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmetReason {
    /// Every preferred day was full before the person was served.
    PreferredDaysFull,
}

impl fmt::Display for UnmetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferredDaysFull => f.write_str("all preferred days are full"),
        }
    }
}

/// A person that did not get a single Oasis day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetRequest {
    pub person_id: PersonId,
    pub requested: BTreeSet<Weekday>,
    pub reason: UnmetReason,
}

/// Preferred days an allocated person could not get. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub person_id: PersonId,
    pub granted: usize,
    pub missing: BTreeSet<Weekday>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOutcome {
    pub allocations: Vec<RoomAllocation>,
    pub waitlist: Vec<WaitlistedTeam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OasisOutcome {
    pub allocations: Vec<OasisAllocation>,
    pub unmet: Vec<UnmetRequest>,
    pub shortfalls: Vec<Shortfall>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_pairs_cover_four_distinct_days() {
        let days: BTreeSet<Weekday> = DayPair::ALL.iter().flat_map(|pair| pair.days()).collect();
        assert_eq!(days.len(), 4);
        assert!(!days.contains(&Weekday::Friday));
    }

    #[test]
    fn other_day_pair_is_an_involution() {
        for pair in DayPair::ALL {
            assert_ne!(pair, pair.other());
            assert_eq!(pair, pair.other().other());
        }
    }

    #[test]
    fn day_pair_display_names_both_days() {
        assert_eq!(DayPair::MonWed.to_string(), "Monday & Wednesday");
        assert_eq!(DayPair::TueThu.to_string(), "Tuesday & Thursday");
    }

    #[test]
    fn weekday_index_matches_position() {
        for (position, day) in Weekday::ALL.iter().enumerate() {
            assert_eq!(day.index(), position);
        }
    }
}
