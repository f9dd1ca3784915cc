use std::fmt;

use tracing::{debug, info};
use uuid::Uuid;

use super::{Action, BoxedAction};

/// Identifier of a job spawned on an [`ActionRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Job {
    id: JobId,
    label: String,
    action: BoxedAction,
    ticks: u64,
}

/// Many independent action trees ticked together by the host loop.
///
/// Jobs are initialized when spawned, executed once per [`tick`] in spawn
/// order while unfinished, and dropped as soon as they report finished.
///
/// [`tick`]: ActionRunner::tick
#[derive(Default)]
pub struct ActionRunner {
    jobs: Vec<Job>,
}

impl ActionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, label: impl Into<String>, action: impl Action + 'static) -> JobId {
        let id = JobId::new();
        let label = label.into();
        let mut action: BoxedAction = Box::new(action);
        action.initialize();
        info!(job = %id, label = %label, "job spawned");
        self.jobs.push(Job {
            id,
            label,
            action,
            ticks: 0,
        });
        id
    }

    /// Executes every unfinished job once and removes the finished ones.
    /// Returns the ids of the jobs that finished during this tick (including
    /// jobs that were already finished when spawned).
    pub fn tick(&mut self) -> Vec<JobId> {
        for job in &mut self.jobs {
            if !job.action.is_finished() {
                job.action.execute();
                job.ticks += 1;
            }
        }

        let mut finished = Vec::new();
        self.jobs.retain(|job| {
            if job.action.is_finished() {
                debug!(job = %job.id, label = %job.label, ticks = job.ticks, "job finished");
                finished.push(job.id);
                false
            } else {
                true
            }
        });
        finished
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.iter().any(|job| job.id == id)
    }

    /// Labels of the running jobs, in spawn order.
    pub fn labels(&self) -> Vec<(JobId, &str)> {
        self.jobs
            .iter()
            .map(|job| (job.id, job.label.as_str()))
            .collect()
    }
}
