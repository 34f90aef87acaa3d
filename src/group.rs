//! # TaskGroup: wait for several independently submitted tasks as a unit.
//!
//! A [`TaskGroup`] tracks tasks the caller has (or will have) submitted to a
//! [`Pool`](crate::Pool) and waits for all of them, collecting one
//! [`TaskErrors`](crate::TaskErrors) per member in insertion order.
//! Adding a task does **not** submit it; submission stays the caller's job,
//! so a task can be both pool-submitted and group-tracked.
//!
//! Waiting is sequential in insertion order: a member that finishes out of
//! order delays the group by nothing beyond the slowest *preceding* member,
//! since each wait returns as soon as its own task has already completed.

use std::fmt;

use crate::task::{TaskErrors, TaskRef};

/// Caller-side aggregator over independently submitted tasks.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use repeatpool::{HandlerFn, Pool, PoolConfig, Task, TaskError, TaskGroup};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let pool = Pool::new(PoolConfig::default(), Vec::new(), CancellationToken::new())
///         .expect("valid config");
///     let mut group = TaskGroup::new();
///
///     for table in 0..4 {
///         let handler = HandlerFn::arc(table, |_table, _series| async {
///             Ok::<_, TaskError>(())
///         });
///         let task = Task::new(128, 16, handler).into_ref();
///         pool.submit(&task).await.expect("submission");
///         group.add(task);
///     }
///
///     let errors = group.wait().await;
///     assert!(errors.into_result().is_ok());
/// }
/// ```
#[derive(Default)]
pub struct TaskGroup {
    tasks: Vec<TaskRef>,
}

impl TaskGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task to the group. Insertion order is wait order and the
    /// order of entries in the resulting [`TaskGroupErrors`].
    pub fn add(&mut self, task: TaskRef) {
        self.tasks.push(task);
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if no tasks are tracked.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every tracked task in insertion order and collects their
    /// aggregated errors, one entry per member, same order.
    pub async fn wait(&self) -> TaskGroupErrors {
        let mut per_task = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            per_task.push(task.wait().await);
        }
        TaskGroupErrors { per_task }
    }
}

/// Per-task error collections for one group, in insertion order.
///
/// The combined `Display` genuinely concatenates every failing member's
/// message: a group with any failure never renders as success.
#[derive(Debug, Default)]
pub struct TaskGroupErrors {
    per_task: Vec<TaskErrors>,
}

impl TaskGroupErrors {
    /// One entry per tracked task, insertion order, succeeded or not.
    pub fn per_task(&self) -> &[TaskErrors] {
        &self.per_task
    }

    /// Only the failing members' collections, insertion order preserved.
    pub fn errors(&self) -> Vec<&TaskErrors> {
        self.per_task.iter().filter(|e| !e.is_empty()).collect()
    }

    /// True if every tracked task succeeded.
    pub fn is_empty(&self) -> bool {
        self.per_task.iter().all(|e| e.is_empty())
    }

    /// Converts into a `Result`: `Ok(())` when every member succeeded,
    /// `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), TaskGroupErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for TaskGroupErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failing = self.errors();
        if failing.is_empty() {
            return write!(f, "no failures");
        }
        write!(f, "{} task(s) failed: ", failing.len())?;
        for (i, errors) in failing.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{errors}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TaskGroupErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::events::Bus;
    use crate::handler::HandlerFn;
    use crate::task::Task;
    use std::sync::Arc;

    fn one_shot_task(fail_with: Option<&'static str>) -> TaskRef {
        let handler = HandlerFn::arc(fail_with, |fail_with, _index| async move {
            match *fail_with {
                Some(message) => Err(TaskError::fail(message)),
                None => Ok(()),
            }
        });
        Task::new(1, 1, handler).into_ref()
    }

    async fn run_all(tasks: &[TaskRef]) {
        let bus = Bus::new(16);
        for task in tasks {
            task.initialize().expect("valid task");
            Arc::clone(task).run(&bus).await;
        }
    }

    #[tokio::test]
    async fn test_only_failing_members_reported() {
        let tasks = [
            one_shot_task(None),
            one_shot_task(Some("middle broke")),
            one_shot_task(None),
        ];
        let mut group = TaskGroup::new();
        for task in &tasks {
            group.add(Arc::clone(task));
        }
        run_all(&tasks).await;

        let errors = group.wait().await;
        assert_eq!(errors.per_task().len(), 3);
        assert_eq!(errors.errors().len(), 1);
        assert!(!errors.is_empty());
    }

    #[tokio::test]
    async fn test_entries_follow_insertion_order() {
        let tasks = [
            one_shot_task(Some("first")),
            one_shot_task(None),
            one_shot_task(Some("third")),
        ];
        let mut group = TaskGroup::new();
        for task in &tasks {
            group.add(Arc::clone(task));
        }
        run_all(&tasks).await;

        let errors = group.wait().await;
        assert!(errors.per_task()[0].to_string().contains("first"));
        assert!(errors.per_task()[1].is_empty());
        assert!(errors.per_task()[2].to_string().contains("third"));
    }

    #[tokio::test]
    async fn test_combined_message_keeps_every_failing_task() {
        let tasks = [
            one_shot_task(Some("alpha broke")),
            one_shot_task(Some("beta broke")),
        ];
        let mut group = TaskGroup::new();
        for task in &tasks {
            group.add(Arc::clone(task));
        }
        run_all(&tasks).await;

        let errors = group.wait().await;
        let rendered = errors.to_string();
        assert!(rendered.contains("alpha broke"), "missing alpha in: {rendered}");
        assert!(rendered.contains("beta broke"), "missing beta in: {rendered}");
        assert!(errors.into_result().is_err());
    }

    #[tokio::test]
    async fn test_all_successful_group_is_clean() {
        let tasks = [one_shot_task(None), one_shot_task(None)];
        let mut group = TaskGroup::new();
        for task in &tasks {
            group.add(Arc::clone(task));
        }
        run_all(&tasks).await;

        let errors = group.wait().await;
        assert!(errors.is_empty());
        assert_eq!(errors.errors().len(), 0);
        assert!(errors.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_empty_group_waits_nothing() {
        let group = TaskGroup::new();
        assert!(group.is_empty());
        let errors = group.wait().await;
        assert!(errors.is_empty());
    }
}
