use crate::patient::PatientId;

/// Lowest id ever handed out
pub const INITIAL_ID: PatientId = 1;

/// Hands out strictly increasing patient ids
///
/// Scoped to the owning manager; the counter always exceeds every id
/// currently in the tree, except transiently between `next` and a
/// possible `rollback` after a rejected insert.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_id: PatientId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Start allocating from the initial floor
    pub fn new() -> Self {
        Self {
            next_id: INITIAL_ID,
        }
    }

    /// Seed from the ids already in use: the counter resumes one past
    /// the maximum observed, or at the floor when there are none
    pub fn seeded_from<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = PatientId>,
    {
        let next_id = ids
            .into_iter()
            .max()
            .map(|max| max + 1)
            .unwrap_or(INITIAL_ID);
        Self { next_id }
    }

    /// Return the next id and advance the counter
    pub fn next(&mut self) -> PatientId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Peek at the id the next call will return
    pub fn peek(&self) -> PatientId {
        self.next_id
    }

    /// Give back the most recently allocated id after a rejected insert
    pub fn rollback(&mut self) {
        if self.next_id > INITIAL_ID {
            self.next_id -= 1;
        }
    }
}
