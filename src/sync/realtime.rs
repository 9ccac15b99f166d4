use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::records::ProjectTask;

/// Replaces the task with the same id as `updated`. Updates for tasks not in
/// the list are dropped. Last write wins.
pub fn apply_task_update(mut tasks: Vec<ProjectTask>, updated: ProjectTask) -> Vec<ProjectTask> {
    match tasks.iter_mut().find(|task| task.id == updated.id) {
        Some(slot) => *slot = updated,
        None => tracing::debug!("Ignoring update for unknown task {}", updated.id),
    }
    tasks
}

/// Source of pushed task rows for one project. `None` means the channel closed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskSubscription: Send {
    async fn next_update(&mut self) -> Option<ProjectTask>;
}

pub struct ChannelSubscription {
    project_id: String,
    receiver: mpsc::Receiver<ProjectTask>,
}

impl ChannelSubscription {
    pub fn new(project_id: impl Into<String>, receiver: mpsc::Receiver<ProjectTask>) -> Self {
        Self {
            project_id: project_id.into(),
            receiver,
        }
    }

    pub fn channel(project_id: impl Into<String>, buffer: usize) -> (mpsc::Sender<ProjectTask>, Self) {
        let (sender, receiver) = mpsc::channel(buffer);
        (sender, Self::new(project_id, receiver))
    }
}

#[async_trait]
impl TaskSubscription for ChannelSubscription {
    async fn next_update(&mut self) -> Option<ProjectTask> {
        loop {
            let task = self.receiver.recv().await?;
            if task.project_id == self.project_id {
                return Some(task);
            }
            tracing::debug!("Dropping update for task {} of project {}", task.id, task.project_id);
        }
    }
}

/// Task list of a single project kept current by pushed updates.
pub struct RealtimeTaskList<S> {
    project_id: String,
    tasks: Vec<ProjectTask>,
    subscription: S,
}

impl<S: TaskSubscription> RealtimeTaskList<S> {
    pub fn new(project_id: impl Into<String>, initial_tasks: Vec<ProjectTask>, subscription: S) -> Self {
        Self {
            project_id: project_id.into(),
            tasks: initial_tasks,
            subscription,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn tasks(&self) -> &[ProjectTask] {
        &self.tasks
    }

    pub fn apply(&mut self, updated: ProjectTask) {
        let tasks = std::mem::take(&mut self.tasks);
        self.tasks = apply_task_update(tasks, updated);
    }

    /// Waits for one update and applies it. Returns false once the
    /// subscription has closed.
    pub async fn poll_next(&mut self) -> bool {
        match self.subscription.next_update().await {
            Some(updated) => {
                tracing::debug!("Task {} is now {}", updated.id, updated.status);
                self.apply(updated);
                true
            }
            None => false,
        }
    }

    pub async fn run_until_closed(&mut self) -> usize {
        let mut applied = 0;
        while self.poll_next().await {
            applied += 1;
        }
        tracing::info!("Subscription for project {} closed after {} updates", self.project_id, applied);
        applied
    }

    pub fn into_tasks(self) -> Vec<ProjectTask> {
        self.tasks
    }
}
