//! Soft-constraint scoring of a timetable.
//!
//! A score starts at 0 and only ever goes down:
//!
//! - every repeat of a (teacher, day, session, slot) combination costs
//!   [`COLLISION_PENALTY`];
//! - on every day holding at least one entry, each session outside
//!   [`SESSION_MIN`]..=[`SESSION_MAX`] costs [`LOAD_PENALTY`] per missing or
//!   surplus entry, and a day total outside [`DAY_MIN`]..=[`DAY_MAX`] costs
//!   a flat [`DAY_PENALTY`].

use crate::timetable::{Day, ScheduleEntry, Session};
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

pub const COLLISION_PENALTY: i64 = 10;
pub const LOAD_PENALTY: i64 = 10;
pub const DAY_PENALTY: i64 = 20;
pub const SESSION_MIN: usize = 3;
pub const SESSION_MAX: usize = 5;
pub const DAY_MIN: usize = 8;
pub const DAY_MAX: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FitnessReport {
    pub collision_penalty: i64,
    pub session_penalty: i64,
    pub day_penalty: i64,
}

impl FitnessReport {
    pub fn score(&self) -> i64 {
        -(self.collision_penalty + self.session_penalty + self.day_penalty)
    }

    pub fn is_perfect(&self) -> bool {
        self.score() == 0
    }
}

pub fn score(entries: &[ScheduleEntry]) -> i64 {
    report(entries).score()
}

pub fn report(entries: &[ScheduleEntry]) -> FitnessReport {
    let collisions: HashMap<(&str, Day, Session, u8), usize> = entries
        .iter()
        .map(|e| (e.teacher(), e.day, e.session, e.slot()))
        .counts();

    let collision_penalty = collisions
        .values()
        .map(|&count| COLLISION_PENALTY * (count as i64 - 1))
        .sum();

    // Only days that hold something are checked, both of their sessions.
    let mut day_sessions: BTreeMap<Day, [usize; 2]> = BTreeMap::new();
    for entry in entries {
        let sessions = day_sessions.entry(entry.day).or_default();
        sessions[entry.session as usize] += 1;
    }

    let mut session_penalty = 0;
    let mut day_penalty = 0;
    for sessions in day_sessions.values() {
        for &count in sessions {
            session_penalty += session_load_penalty(count);
        }

        let total: usize = sessions.iter().sum();
        if !(DAY_MIN..=DAY_MAX).contains(&total) {
            day_penalty += DAY_PENALTY;
        }
    }

    FitnessReport {
        collision_penalty,
        session_penalty,
        day_penalty,
    }
}

fn session_load_penalty(count: usize) -> i64 {
    if count < SESSION_MIN {
        LOAD_PENALTY * (SESSION_MIN - count) as i64
    } else if count > SESSION_MAX {
        LOAD_PENALTY * (count - SESSION_MAX) as i64
    } else {
        0
    }
}
