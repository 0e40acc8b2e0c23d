use thiserror::Error;

use crate::model::{PersonId, RoomId, TeamId, Weekday};

/// The submitted requests are structurally broken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("team {0} was submitted more than once")]
    DuplicateTeam(TeamId),
    #[error("team {team} has {size} members, allowed are 3 to 6")]
    TeamSize { team: TeamId, size: u32 },
    #[error("person {0} was submitted more than once")]
    DuplicatePerson(PersonId),
    #[error("person {0} did not choose any preferred day")]
    NoPreferredDays(PersonId),
    #[error("person {person} prefers {day}, which is not an allocatable weekday")]
    UnknownWeekday { person: PersonId, day: Weekday },
}

/// The resource configuration can not be allocated against.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("room {0} is configured more than once")]
    DuplicateRoom(RoomId),
    #[error("room {0} has no seats")]
    RoomCapacity(RoomId),
    #[error("the oasis daily capacity has to be positive")]
    DailyCapacity,
    #[error("weekday {0} is configured more than once")]
    DuplicateWeekday(Weekday),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid resource configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Why an ad-hoc Oasis booking was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdhocRejection {
    #[error("{0} is not an allocatable weekday")]
    UnknownDay(Weekday),
    #[error("the oasis is already full on {0}")]
    DayFull(Weekday),
    #[error("{person} already has a seat on {day}")]
    AlreadyAllocated { person: PersonId, day: Weekday },
}
