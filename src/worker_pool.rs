//! Fixed pool of OS worker threads, the black-box `schedule(task)` facility
//! from §4.3: each worker loops forever pulling tasks and invoking the job
//! function with the task's argument (always an actor id here).
//!
//! Grounded in the teacher's legacy `kernel::kernel::Kernel::spawn` (a
//! dedicated OS thread reading `KernelMsg` off an `std::sync::mpsc`
//! channel) and in `original_source/cacti.c`'s `threadpool_schedule`, which
//! this module plays the same role as. The pool never blocks on any
//! particular actor's mailbox — `schedule` is a plain, non-blocking channel
//! send. Each job runs under `catch_unwind`, the same containment the
//! teacher's `kernel::kernel::unpark_actor`/`start_actor` wrap around
//! `run_mailbox` and actor construction, so a single panicking handler
//! costs the pool a message, not a thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use slog::{debug, error};

use crate::id::ActorId;

enum Task {
    Run(ActorId),
    Shutdown,
}

pub struct WorkerPool {
    // `mpsc::Sender` is `Send` but not `Sync`; `schedule` is called
    // concurrently from the owning `Dispatcher`'s own worker threads as well
    // as whichever thread calls `send`, so the sender needs a `Mutex` around
    // it to be safely shared rather than cloned at every call site.
    sender: Mutex<mpsc::Sender<Task>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `pool_size` worker threads, each invoking `job(id)` for every
    /// scheduled actor id, strictly one at a time per thread (never two
    /// workers pull from the queue at once thanks to the shared `Mutex` on
    /// the receiving end).
    pub fn new<F>(pool_size: usize, job: F, log: slog::Logger) -> Self
    where
        F: Fn(ActorId) + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::channel::<Task>();
        let receiver = Arc::new(Mutex::new(receiver));
        let job = Arc::new(job);

        let handles = (0..pool_size)
            .map(|index| {
                let receiver = Arc::clone(&receiver);
                let job = Arc::clone(&job);
                let log = log.clone();
                thread::Builder::new()
                    .name(format!("actor-worker-{index}"))
                    .spawn(move || loop {
                        let task = receiver.lock().unwrap().recv();
                        match task {
                            Ok(Task::Run(id)) => {
                                // A handler panic must not cost the pool a
                                // thread — that would shrink it below
                                // `pool_size` and eventually stall every
                                // actor still waiting to be scheduled.
                                // Mirrors the teacher's own
                                // `catch_unwind`/`AssertUnwindSafe` around
                                // `run_mailbox` (`kernel/kernel.rs`'s
                                // `unpark_actor`).
                                if panic::catch_unwind(AssertUnwindSafe(|| job(id))).is_err() {
                                    error!(log, "actor job panicked, worker continuing"; "worker" => index, "actor" => id.value());
                                }
                            }
                            Ok(Task::Shutdown) | Err(_) => {
                                debug!(log, "worker stopping"; "worker" => index);
                                break;
                            }
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        WorkerPool {
            sender: Mutex::new(sender),
            handles: Mutex::new(handles),
        }
    }

    /// Hands one execution ticket for `id` to the pool. Never blocks.
    pub fn schedule(&self, id: ActorId) {
        let _ = self.sender.lock().unwrap().send(Task::Run(id));
    }

    /// Sends exactly one shutdown task per worker, then joins every thread.
    /// Idempotent: a second call finds no handles left to join.
    pub fn shutdown(&self) {
        let mut handles = self.handles.lock().unwrap();
        {
            let sender = self.sender.lock().unwrap();
            for _ in 0..handles.len() {
                let _ = sender.send(Task::Shutdown);
            }
        }
        for handle in handles.drain(..) {
            let _ = handle.join();
        }
    }
}
