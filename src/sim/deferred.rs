//! Wall-clock deferred tasks
//!
//! A small cancellable timer registry. The owner feeds it wall-clock time
//! through [`Scheduler::advance_to`] once per display frame and receives the
//! tasks that became due. Time here is independent of the simulation `dt`,
//! so tasks keep firing while the simulation is not running.

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TaskId,
    due: f64,
    task: T,
}

/// Registry of tasks waiting on wall-clock deadlines
#[derive(Debug)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Create a scheduler whose clock starts at `now` (seconds)
    pub fn starting_at(now: f64) -> Self {
        Self {
            now,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Last observed wall-clock time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `task` to fire `delay` seconds from the last observed time
    pub fn schedule_in(&mut self, delay: f64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay.max(0.0),
            task,
        });
        id
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending task matching `pred`. Returns how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !pred(&p.task));
        before - self.pending.len()
    }

    /// Drop every pending task
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance the clock and take every task that is now due.
    ///
    /// Due tasks are returned ordered by deadline, ties in scheduling order.
    /// The clock never moves backwards.
    pub fn advance_to(&mut self, now: f64) -> Vec<T> {
        self.now = self.now.max(now);
        let now = self.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|p| p.task).collect()
    }
}
