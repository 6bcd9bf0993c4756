//! Handle over the running live feeds.

use tokio::task::JoinHandle;

use crate::domain::Collection;

/// Owns the tasks that drive the live subscriptions.
///
/// Dropping the handle aborts every task, which drops its subscription and
/// releases the live query in the store. No callback can run after that.
#[derive(Debug)]
pub struct LiveViews {
    tasks: Vec<(Collection, JoinHandle<()>)>,
}

impl LiveViews {
    pub(crate) fn new(tasks: Vec<(Collection, JoinHandle<()>)>) -> Self {
        Self { tasks }
    }

    pub(crate) fn push(&mut self, collection: Collection, handle: JoinHandle<()>) {
        self.tasks.push((collection, handle));
    }

    /// Collections with a feed that is still running.
    #[must_use]
    pub fn running(&self) -> Vec<Collection> {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(collection, _)| *collection)
            .collect()
    }

    /// Aborts every feed and waits for the tasks to wind down.
    pub async fn shutdown(mut self) {
        for (collection, handle) in self.tasks.drain(..) {
            handle.abort();
            let _ = handle.await;
            tracing::debug!(%collection, "live feed stopped");
        }
    }
}

impl Drop for LiveViews {
    fn drop(&mut self) {
        for (_, handle) in &self.tasks {
            handle.abort();
        }
    }
}
