//! Tests for the exactly-once shutdown protocol.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use super::shutdown::ShutdownGuard;
use crate::tool::{Tool, ToolError};

#[derive(Default)]
struct CountingTool {
    shutdowns: AtomicUsize,
    fail_shutdown: bool,
}

impl Tool for CountingTool {
    fn execute(&self) -> Result<(), ToolError> {
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ToolError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            Err("deliberate shutdown failure".into())
        } else {
            Ok(())
        }
    }
}

#[test]
fn sequential_triggers_run_shutdown_exactly_once() {
    let guard = ShutdownGuard::new(CountingTool::default());

    guard.run_shutdown();
    guard.run_shutdown();

    assert_eq!(guard.tool().shutdowns.load(Ordering::SeqCst), 1);
    assert!(guard.completed());
}

#[test]
fn failed_shutdown_still_sets_the_guard_flag() {
    let guard = ShutdownGuard::new(CountingTool {
        shutdowns: AtomicUsize::new(0),
        fail_shutdown: true,
    });

    guard.run_shutdown();
    guard.run_shutdown();

    assert_eq!(guard.tool().shutdowns.load(Ordering::SeqCst), 1);
    assert!(guard.completed());
}

#[test]
fn concurrent_triggers_run_shutdown_exactly_once() {
    // Stress the race between the failure path and the termination listener:
    // both triggers start behind a barrier so the lock arbitration is
    // exercised on every iteration.
    for _ in 0..200 {
        let guard = Arc::new(ShutdownGuard::new(CountingTool::default()));
        let barrier = Arc::new(Barrier::new(2));
        let triggers: Vec<_> = (0..2)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    guard.run_shutdown();
                })
            })
            .collect();
        for trigger in triggers {
            trigger.join().expect("shutdown trigger thread panicked");
        }

        assert_eq!(guard.tool().shutdowns.load(Ordering::SeqCst), 1);
        assert!(guard.completed());
    }
}
