//! Strictly sequential execution of per-window async steps.
//!
//! Used for actions like "save every satellite's unsaved docs, then quit":
//! each window's step (which may block on a user prompt) must finish before
//! the next window's step starts. A step that fails is logged and skipped;
//! the remaining steps and the finalizer still run.

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

/// One queued step
pub type QueueTask<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Step run once after every queued step, regardless of failures
pub type QueueFinalizer<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Outcome of running a [`SerializedQueue`]
#[derive(Debug)]
pub struct QueueReport<T> {
    /// Outputs of successful steps, in queue order
    pub outputs: Vec<(String, T)>,
    /// Failed steps with their error text
    pub skipped: Vec<(String, String)>,
    pub finalized: bool,
}

impl<T> QueueReport<T> {
    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Sequential task queue with skip-and-continue on error
pub struct SerializedQueue<'a, T> {
    tasks: Vec<(String, QueueTask<'a, T>)>,
    finalizer: Option<QueueFinalizer<'a>>,
}

impl<'a, T: Send + 'a> SerializedQueue<'a, T> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            finalizer: None,
        }
    }

    /// Queue a step. `label` identifies it in the report and in logs.
    pub fn push<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<T>> + Send + 'a,
    {
        self.tasks.push((label.into(), Box::pin(task)));
    }

    /// Set the step that runs after all others
    pub fn finally<F>(&mut self, finalizer: F)
    where
        F: Future<Output = ()> + Send + 'a,
    {
        self.finalizer = Some(Box::pin(finalizer));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every step in order, then the finalizer
    pub async fn run(self) -> QueueReport<T> {
        let mut report = QueueReport {
            outputs: Vec::with_capacity(self.tasks.len()),
            skipped: Vec::new(),
            finalized: false,
        };

        for (label, task) in self.tasks {
            match task.await {
                Ok(output) => {
                    crate::debug_trace!("QUEUE", "Step {} completed", label);
                    report.outputs.push((label, output));
                }
                Err(e) => {
                    log::warn!("Skipping queued step {}: {:#}", label, e);
                    report.skipped.push((label, format!("{e:#}")));
                }
            }
        }

        if let Some(finalizer) = self.finalizer {
            finalizer.await;
            report.finalized = true;
        }
        report
    }
}

impl<'a, T: Send + 'a> Default for SerializedQueue<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}
