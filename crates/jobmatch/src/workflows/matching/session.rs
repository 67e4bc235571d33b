use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::domain::JobId;
use super::engine::{RankedJob, RecommendationBatch};

/// Observable phase of a swipe session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    Ready,
    Empty,
    Failed,
}

impl SessionPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Empty => "empty",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
enum SessionState {
    Loading,
    Ready {
        queue: Vec<RankedJob>,
        cursor: usize,
        skipped: HashSet<JobId>,
    },
    Empty,
    Failed {
        message: String,
    },
}

/// Per-user state machine over one recommendation batch.
///
/// The cursor is purely positional and wraps modulo the queue length; a
/// skipped job stays in the queue and is filtered out at presentation time
/// instead, so it is never re-shown for the rest of the session. The
/// suppression set lives only in memory: a fresh session starts with
/// full amnesia about earlier skips.
#[derive(Debug)]
pub struct SwipeSession {
    state: SessionState,
}

impl Default for SwipeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Loading,
        }
    }

    /// Install a freshly fetched batch, replacing whatever state the session
    /// held before. An empty batch lands directly in `Empty`.
    pub fn load(&mut self, batch: RecommendationBatch) {
        self.state = if batch.jobs.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Ready {
                queue: batch.jobs,
                cursor: 0,
                skipped: HashSet::new(),
            }
        };
    }

    /// Record a failed batch fetch. `Failed` is distinct from `Empty`: the
    /// former renders an error display, the latter a "no recommendations"
    /// terminal screen.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = SessionState::Failed {
            message: message.into(),
        };
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            SessionState::Loading => SessionPhase::Loading,
            SessionState::Empty => SessionPhase::Empty,
            SessionState::Failed { .. } => SessionPhase::Failed,
            SessionState::Ready { queue, skipped, .. } => {
                if queue.iter().all(|entry| skipped.contains(&entry.job.id)) {
                    SessionPhase::Empty
                } else {
                    SessionPhase::Ready
                }
            }
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// The job at the raw cursor slot, ignoring suppression.
    pub fn cursor_slot(&self) -> Option<&RankedJob> {
        match &self.state {
            SessionState::Ready { queue, cursor, .. } => queue.get(*cursor),
            _ => None,
        }
    }

    /// The job currently presented: the first slot at or after the cursor
    /// (wrapping) whose id has not been suppressed this session.
    pub fn presented(&self) -> Option<&RankedJob> {
        let SessionState::Ready {
            queue,
            cursor,
            skipped,
        } = &self.state
        else {
            return None;
        };

        (0..queue.len())
            .map(|offset| &queue[(cursor + offset) % queue.len()])
            .find(|entry| !skipped.contains(&entry.job.id))
    }

    /// Suppress the presented job and advance the cursor one slot, wrapping
    /// at the end of the queue. Returns the suppressed id, or `None` when the
    /// session is not in `Ready` or the queue is exhausted.
    pub fn skip(&mut self) -> Option<JobId> {
        self.suppress_presented()
    }

    /// Record a successful shortlist write for the presented job. Cursor
    /// mechanics mirror [`SwipeSession::skip`]; callers must only invoke this
    /// after the store write succeeded, so a failed write leaves the job
    /// presented for retry.
    pub fn commit_shortlist(&mut self) -> Option<JobId> {
        self.suppress_presented()
    }

    fn suppress_presented(&mut self) -> Option<JobId> {
        let SessionState::Ready {
            queue,
            cursor,
            skipped,
        } = &mut self.state
        else {
            return None;
        };

        let len = queue.len();
        let index = (0..len)
            .map(|offset| (*cursor + offset) % len)
            .find(|index| !skipped.contains(&queue[*index].job.id))?;

        let id = queue[index].job.id.clone();
        skipped.insert(id.clone());
        *cursor = (index + 1) % len;
        Some(id)
    }

    pub fn queue_len(&self) -> usize {
        match &self.state {
            SessionState::Ready { queue, .. } => queue.len(),
            _ => 0,
        }
    }

    pub fn skipped_count(&self) -> usize {
        match &self.state {
            SessionState::Ready { skipped, .. } => skipped.len(),
            _ => 0,
        }
    }

    /// Slots not yet suppressed this session.
    pub fn remaining(&self) -> usize {
        match &self.state {
            SessionState::Ready { queue, skipped, .. } => queue
                .iter()
                .filter(|entry| !skipped.contains(&entry.job.id))
                .count(),
            _ => 0,
        }
    }
}
