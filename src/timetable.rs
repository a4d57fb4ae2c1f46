use crate::error::{Result, SchedulerError};
use crate::genetic_algorithm::Chromosome;
use crate::records::ClassRecord;
use itertools::iproduct;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub const SLOTS_PER_SESSION: u8 = 5;
pub const DAYS_PER_WEEK: usize = Day::ALL.len();
pub const SESSIONS_PER_DAY: usize = Session::ALL.len();

/// Every entry the factory can place before buckets run out.
pub const CAPACITY: usize = DAYS_PER_WEEK * SESSIONS_PER_DAY * SLOTS_PER_SESSION as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; 6] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Session {
    Morning,
    Afternoon,
}

impl Session {
    pub const ALL: [Session; 2] = [Session::Morning, Session::Afternoon];

    /// First grid row used by this session.
    pub fn row_offset(self) -> usize {
        match self {
            Session::Morning => 0,
            Session::Afternoon => SLOTS_PER_SESSION as usize,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One class period placed in the week. Entries are values: changing the
/// slot builds a new entry that shares the same record. The slot is always
/// within `1..=SLOTS_PER_SESSION`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub day: Day,
    pub session: Session,
    slot: u8,
    pub record: Arc<ClassRecord>,
}

impl ScheduleEntry {
    pub fn new(day: Day, session: Session, slot: u8, record: Arc<ClassRecord>) -> Result<Self> {
        if !(1..=SLOTS_PER_SESSION).contains(&slot) {
            return Err(SchedulerError::InvalidSlot { slot });
        }

        Ok(Self::placed(day, session, slot, record))
    }

    /// Callers guarantee `slot` is in range.
    fn placed(day: Day, session: Session, slot: u8, record: Arc<ClassRecord>) -> Self {
        debug_assert!((1..=SLOTS_PER_SESSION).contains(&slot));
        Self {
            day,
            session,
            slot,
            record,
        }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Same entry moved to `slot`, clamped into `1..=SLOTS_PER_SESSION`.
    pub fn with_slot(&self, slot: u8) -> Self {
        let slot = slot.clamp(1, SLOTS_PER_SESSION);
        Self::placed(self.day, self.session, slot, Arc::clone(&self.record))
    }

    pub fn teacher(&self) -> &str {
        &self.record.teacher
    }
}

/// A candidate week: the genes of the search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timetable {
    pub entries: Vec<ScheduleEntry>,
    pub fitness: i64,
}

impl Timetable {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shuffles the records and fills the (day, session) buckets in
    /// Mon..Sat, Morning/Afternoon order, five entries per bucket. Records
    /// that find no free bucket are dropped.
    pub fn random(records: &[Arc<ClassRecord>], rng: &mut dyn RngCore) -> Self {
        let mut shuffled = records.to_vec();
        shuffled.shuffle(rng);

        let mut buckets: Vec<Vec<ScheduleEntry>> = vec![Vec::new(); DAYS_PER_WEEK * SESSIONS_PER_DAY];

        for record in shuffled {
            let free = iproduct!(Day::ALL, Session::ALL)
                .zip(buckets.iter_mut())
                .find(|(_, bucket)| bucket.len() < SLOTS_PER_SESSION as usize);

            match free {
                Some(((day, session), bucket)) => {
                    let slot = bucket.len() as u8 + 1;
                    bucket.push(ScheduleEntry::placed(day, session, slot, record));
                }
                None => break,
            }
        }

        Self::new(buckets.into_iter().flatten().collect())
    }
}

impl Chromosome for Timetable {
    fn fitness(&self) -> i64 {
        self.fitness
    }
}

pub fn initialize_population(
    records: &[Arc<ClassRecord>],
    population_size: usize,
    rng: &mut dyn RngCore,
) -> Vec<Timetable> {
    if records.len() > CAPACITY {
        warn!(
            dropped = records.len() - CAPACITY,
            capacity = CAPACITY,
            "Records did not fit into the week"
        );
    }

    (0..population_size)
        .map(|_| Timetable::random(records, rng))
        .collect()
}
