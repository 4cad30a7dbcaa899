use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::application::errors::CommandError;

/// Job body run by the external scheduler
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self) -> Result<(), CommandError>;
}

/// A scheduled task declared by an extension
pub struct Task {
    pub name: String,
    /// Cron expression, interpreted by the scheduler
    pub schedule: String,
    handler: Arc<dyn TaskHandler>,
}

impl Task {
    pub fn new(name: impl Into<String>, schedule: impl Into<String>, handler: impl TaskHandler + 'static) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn handler(&self) -> &Arc<dyn TaskHandler> {
        &self.handler
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredTask {
    pub extension: String,
    pub task: Arc<Task>,
}

impl RegisteredTask {
    pub fn new(extension: impl Into<String>, task: Task) -> Self {
        Self {
            extension: extension.into(),
            task: Arc::new(task),
        }
    }
}
