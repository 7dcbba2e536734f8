//! Compensation stack for operations that span storage and the database.
//!
//! Each forward step that leaves something behind registers an undo action.
//! On failure `rollback` runs the registered actions newest-first; their own
//! failures are logged and swallowed so the original error is what the caller
//! sees.

use futures::future::BoxFuture;
use std::future::Future;

struct Compensation<'a> {
    label: String,
    action: BoxFuture<'a, anyhow::Result<()>>,
}

pub struct Saga<'a> {
    name: &'static str,
    compensations: Vec<Compensation<'a>>,
}

impl<'a> Saga<'a> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    /// Registers an undo action for the step that just completed. The future is not polled
    /// unless the saga is rolled back.
    pub fn on_rollback<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'a,
    {
        self.compensations.push(Compensation {
            label: label.into(),
            action: Box::pin(action),
        });
    }

    pub fn pending(&self) -> usize {
        self.compensations.len()
    }

    /// Runs every registered compensation in reverse order. Returns how many failed.
    pub async fn rollback(mut self) -> usize {
        let mut failed = 0;
        while let Some(compensation) = self.compensations.pop() {
            match compensation.action.await {
                Ok(()) => tracing::info!(
                    "↩️  [{}] compensated: {}",
                    self.name,
                    compensation.label
                ),
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        "❌ [{}] compensation '{}' failed: {:?}",
                        self.name,
                        compensation.label,
                        e
                    );
                }
            }
        }
        failed
    }

    /// Forward path finished; registered compensations are dropped unrun.
    pub fn complete(self) {
        tracing::debug!(
            "[{}] completed, discarding {} compensation(s)",
            self.name,
            self.compensations.len()
        );
    }
}
