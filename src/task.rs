//! The UI task queue.
//!
//! Everything runs on one thread. Immediate tasks go through a channel so that any
//! [`TaskRunner`] clone can post; delayed tasks wait on a millisecond clock that only moves when
//! the pipeline advances it.

use crate::pipeline::PipelineContext;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use tracing::warn;

/// A unit of work on the UI thread.
pub type Task = Box<dyn FnOnce(&mut PipelineContext)>;

enum Job {
    Immediate(Task),
    Delayed(u64, Task),
}

/// A handle to a posted task that can stop it from running.
#[derive(Debug, Clone, Default)]
pub struct CancelableTask(Rc<Cell<bool>>);

impl CancelableTask {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.get()
    }
}

/// Posts tasks to a [`TaskExecutor`].
#[derive(Clone)]
pub struct TaskRunner {
    sender: Sender<Job>,
    clock: Rc<Cell<u64>>,
}

impl TaskRunner {
    /// Runs `task` on the next turn of the UI thread.
    pub fn post_task<F: 'static + FnOnce(&mut PipelineContext)>(&self, task: F) {
        self.send(Job::Immediate(Box::new(task)));
    }

    /// Runs `task` once `delay_ms` have passed.
    pub fn post_delayed_task<F>(&self, task: F, delay_ms: u64)
    where
        F: 'static + FnOnce(&mut PipelineContext),
    {
        let due = self.clock.get() + delay_ms;
        self.send(Job::Delayed(due, Box::new(task)));
    }

    /// Like [`post_delayed_task`](Self::post_delayed_task), but the task can be canceled.
    pub fn post_cancelable_delayed_task<F>(&self, task: F, delay_ms: u64) -> CancelableTask
    where
        F: 'static + FnOnce(&mut PipelineContext),
    {
        let handle = CancelableTask::default();
        let flag = handle.clone();
        self.post_delayed_task(
            move |ctx| {
                if !flag.is_canceled() {
                    task(ctx);
                }
            },
            delay_ms,
        );
        handle
    }

    /// The current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.clock.get()
    }

    fn send(&self, job: Job) {
        if self.sender.send(job).is_err() {
            warn!("task queue has been disconnected; dropping task");
        }
    }
}

/// Owns the UI task queue.
pub struct TaskExecutor {
    runner: TaskRunner,
    receiver: Receiver<Job>,
    immediate: VecDeque<Task>,
    /// Keyed by due time, then by posting order.
    delayed: BTreeMap<(u64, u64), Task>,
    sequence: u64,
}

impl TaskExecutor {
    pub fn new() -> TaskExecutor {
        let (sender, receiver) = channel::unbounded();
        TaskExecutor {
            runner: TaskRunner {
                sender,
                clock: Rc::new(Cell::new(0)),
            },
            receiver,
            immediate: VecDeque::new(),
            delayed: BTreeMap::new(),
            sequence: 0,
        }
    }

    pub fn runner(&self) -> TaskRunner {
        self.runner.clone()
    }

    pub fn now(&self) -> u64 {
        self.runner.clock.get()
    }

    fn drain_channel(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(Job::Immediate(task)) => self.immediate.push_back(task),
                Ok(Job::Delayed(due, task)) => {
                    self.delayed.insert((due, self.sequence), task);
                    self.sequence += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Returns the next task that may run now.
    pub fn pop_ready(&mut self) -> Option<Task> {
        self.drain_channel();
        if let Some(task) = self.immediate.pop_front() {
            return Some(task);
        }
        let key = *self.delayed.keys().next()?;
        if key.0 <= self.now() {
            self.delayed.remove(&key)
        } else {
            None
        }
    }

    /// Due time of the earliest delayed task.
    pub fn next_due(&mut self) -> Option<u64> {
        self.drain_channel();
        self.delayed.keys().next().map(|key| key.0)
    }

    /// Moves the clock. Time never goes backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        if now_ms > self.now() {
            self.runner.clock.set(now_ms);
        }
    }

    /// True if no task is waiting, delayed or not.
    pub fn is_idle(&mut self) -> bool {
        self.drain_channel();
        self.immediate.is_empty() && self.delayed.is_empty()
    }
}

impl Default for TaskExecutor {
    fn default() -> TaskExecutor {
        TaskExecutor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delayed_tasks_wait_for_the_clock() {
        let mut executor = TaskExecutor::new();
        let runner = executor.runner();
        runner.post_delayed_task(|_| {}, 100);
        runner.post_task(|_| {});

        assert!(executor.pop_ready().is_some());
        assert!(executor.pop_ready().is_none());
        assert_eq!(executor.next_due(), Some(100));

        executor.set_now(100);
        assert!(executor.pop_ready().is_some());
        assert!(executor.is_idle());
    }

    #[test]
    fn clock_is_monotonic() {
        let mut executor = TaskExecutor::new();
        executor.set_now(50);
        executor.set_now(10);
        assert_eq!(executor.now(), 50);
    }

    #[test]
    fn cancel_flag_is_shared() {
        let task = CancelableTask::default();
        let clone = task.clone();
        clone.cancel();
        assert!(task.is_canceled());
    }
}
