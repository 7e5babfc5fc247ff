use crate::domain::entities::pattern::{status_for_staleness, PatternStatus};
use crate::domain::error::DomainError;
use crate::domain::ports::pattern_repository::PatternRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub struct LifecycleManager {
    patterns: Arc<dyn PatternRepository>,
}

#[derive(Debug, Serialize)]
pub struct LifecycleSweep {
    pub evaluated: usize,
    pub transitions: Vec<StatusTransition>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusTransition {
    pub pattern_id: String,
    pub from: PatternStatus,
    pub to: PatternStatus,
}

impl LifecycleManager {
    pub fn new(patterns: Arc<dyn PatternRepository>) -> Self {
        Self { patterns }
    }

    /// Re-evaluate every non-archived pattern against the staleness table.
    /// Archived is terminal; the status write deliberately leaves
    /// `last_updated_at` alone so the staleness clock keeps running.
    ///
    /// Patterns written at this exact instant are left alone: within one
    /// pipeline run the reconciler and the linker stamp `last_updated_at`
    /// with the same clock, and the status they just chose (the growth
    /// promotion in particular) must not be folded back to day-zero.
    pub fn run(&self, now: DateTime<Utc>) -> Result<LifecycleSweep, DomainError> {
        let mut evaluated = 0;
        let mut transitions = Vec::new();
        let mut errors = Vec::new();

        for pattern in self.patterns.list(None, None)? {
            if pattern.status == PatternStatus::Archived {
                continue;
            }
            if pattern.last_updated_at >= now {
                continue;
            }
            evaluated += 1;

            let days_stale = (now - pattern.last_updated_at).num_days();
            let next = status_for_staleness(days_stale);
            if next == pattern.status {
                continue;
            }

            match self.patterns.set_status(&pattern.id, next) {
                Ok(()) => transitions.push(StatusTransition {
                    pattern_id: pattern.id,
                    from: pattern.status,
                    to: next,
                }),
                Err(e) => errors.push(format!("Failed to transition pattern {}: {e}", pattern.id)),
            }
        }

        Ok(LifecycleSweep {
            evaluated,
            transitions,
            errors,
        })
    }
}
