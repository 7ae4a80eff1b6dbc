//! Tests for the lifecycle coordinator.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use clap::Parser;
use rstest::rstest;

use super::errors::ExecutorError;
use super::exit::ProcessExit;
use super::termination::{TerminationHook, TerminationListener};
use super::{ExecutorPlan, RunOutcome, run_with};
use crate::command::{ToolCommand, UniversalFlags};
use crate::metadata;
use crate::tool::{Tool, ToolError};

#[derive(Parser, Debug)]
#[command(name = "mock-tool")]
struct MockCommand {
    /// Work item key.
    #[arg(short = 'k', long = "key")]
    key: i32,
    #[command(flatten)]
    flags: UniversalFlags,
}

impl ToolCommand for MockCommand {
    fn universal_flags(&self) -> UniversalFlags {
        self.flags
    }
}

#[derive(Clone, Default)]
struct ToolProbe {
    constructions: Arc<AtomicUsize>,
    executions: Arc<AtomicUsize>,
    shutdowns: Arc<AtomicUsize>,
}

struct MockTool {
    probe: ToolProbe,
    fail_execute: bool,
    fail_shutdown: bool,
}

impl Tool for MockTool {
    fn execute(&self) -> Result<(), ToolError> {
        self.probe.executions.fetch_add(1, Ordering::SeqCst);
        if self.fail_execute {
            Err("deliberate execution failure".into())
        } else {
            Ok(())
        }
    }

    fn shutdown(&self) -> Result<(), ToolError> {
        self.probe.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            Err("deliberate shutdown failure".into())
        } else {
            Ok(())
        }
    }
}

/// Service-style tool whose `execute` blocks until `shutdown` releases it.
struct BlockingTool {
    probe: ToolProbe,
    gate: (Mutex<bool>, Condvar),
}

impl BlockingTool {
    fn new(probe: ToolProbe) -> Self {
        Self {
            probe,
            gate: (Mutex::new(false), Condvar::new()),
        }
    }
}

impl Tool for BlockingTool {
    fn execute(&self) -> Result<(), ToolError> {
        self.probe.executions.fetch_add(1, Ordering::SeqCst);
        let (released, condvar) = &self.gate;
        let mut released = released.lock().expect("gate lock");
        while !*released {
            released = condvar.wait(released).expect("gate wait");
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ToolError> {
        self.probe.shutdowns.fetch_add(1, Ordering::SeqCst);
        let (released, condvar) = &self.gate;
        *released.lock().expect("gate lock") = true;
        condvar.notify_all();
        Ok(())
    }
}

struct FakeHook {
    trigger: Receiver<i32>,
    done: Sender<()>,
}

struct FakeListener {
    trigger: Receiver<i32>,
    _done: Sender<()>,
}

impl TerminationHook for FakeHook {
    type Listener = FakeListener;

    fn install(self) -> Result<Self::Listener, ExecutorError> {
        Ok(FakeListener {
            trigger: self.trigger,
            _done: self.done,
        })
    }
}

impl TerminationListener for FakeListener {
    fn wait(&mut self) -> Option<i32> {
        self.trigger.recv().ok()
    }

    fn resume(self, _signal: i32) {}
}

/// Test-side handle for a [`FakeHook`].
struct HookHarness {
    trigger: Sender<i32>,
    finished: Receiver<()>,
}

impl HookHarness {
    /// Blocks until the listener thread has fully wound down. Only call
    /// after a trigger was sent or the trigger side was dropped.
    fn wait_for_listener(&self) {
        let _ignored = self.finished.recv();
    }
}

fn fake_hook() -> (FakeHook, HookHarness) {
    let (trigger_tx, trigger_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    (
        FakeHook {
            trigger: trigger_rx,
            done: done_tx,
        },
        HookHarness {
            trigger: trigger_tx,
            finished: done_rx,
        },
    )
}

#[derive(Clone, Default)]
struct ExitProbe {
    requested: Arc<Mutex<Vec<i32>>>,
}

impl ExitProbe {
    fn codes(&self) -> Vec<i32> {
        self.requested.lock().expect("exit probe lock").clone()
    }
}

impl ProcessExit for ExitProbe {
    fn exit(&self, code: i32) {
        self.requested.lock().expect("exit probe lock").push(code);
    }
}

fn plan<H, P>(hook: H, process: P) -> ExecutorPlan<H, P> {
    ExecutorPlan {
        hook,
        process,
        descriptor_path: PathBuf::from(metadata::DESCRIPTOR_PATH),
    }
}

fn argv(arguments: &[&str]) -> Vec<OsString> {
    std::iter::once("mock-tool")
        .chain(arguments.iter().copied())
        .map(OsString::from)
        .collect()
}

fn mock_factory(
    probe: &ToolProbe,
    fail_execute: bool,
    fail_shutdown: bool,
) -> impl FnOnce(MockCommand) -> Result<MockTool, ToolError> {
    let probe = probe.clone();
    move |_command: MockCommand| {
        probe.constructions.fetch_add(1, Ordering::SeqCst);
        Ok(MockTool {
            probe,
            fail_execute,
            fail_shutdown,
        })
    }
}

#[test]
fn well_formed_arguments_execute_the_tool_exactly_once() {
    let (hook, _harness) = fake_hook();
    let exit = ExitProbe::default();
    let probe = ToolProbe::default();

    let outcome = run_with(
        mock_factory(&probe, false, false),
        argv(&["-k", "7"]),
        plan(hook, exit.clone()),
    )
    .expect("run should succeed");

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(probe.executions.load(Ordering::SeqCst), 1);
    assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 0);
    assert!(exit.codes().is_empty());
}

#[rstest]
#[case::help(&["-h"])]
#[case::help_long(&["--help"])]
#[case::version(&["-v"])]
#[case::version_long(&["--version"])]
#[case::both(&["-h", "-v"])]
#[case::with_tool_arguments(&["-k", "7", "--help"])]
fn universal_flags_skip_construction_and_execution(#[case] arguments: &[&str]) {
    let (hook, _harness) = fake_hook();
    let probe = ToolProbe::default();

    let outcome = run_with(
        mock_factory(&probe, false, false),
        argv(arguments),
        plan(hook, ExitProbe::default()),
    )
    .expect("run should succeed");

    assert_eq!(outcome, RunOutcome::FlagsHandled);
    assert_eq!(probe.constructions.load(Ordering::SeqCst), 0);
    assert_eq!(probe.executions.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_required_argument_shows_usage_without_running_the_tool() {
    let (hook, _harness) = fake_hook();
    let probe = ToolProbe::default();

    let outcome = run_with(
        mock_factory(&probe, false, false),
        argv(&[]),
        plan(hook, ExitProbe::default()),
    )
    .expect("missing arguments must not surface as an error");

    assert_eq!(outcome, RunOutcome::UsageShown);
    assert_eq!(probe.constructions.load(Ordering::SeqCst), 0);
    assert_eq!(probe.executions.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_argument_surfaces_as_a_parse_error() {
    let (hook, _harness) = fake_hook();
    let probe = ToolProbe::default();

    let result = run_with(
        mock_factory(&probe, false, false),
        argv(&["-k", "7", "--frobnicate"]),
        plan(hook, ExitProbe::default()),
    );

    assert!(matches!(
        result,
        Err(ExecutorError::ParseArguments { .. })
    ));
    assert_eq!(probe.constructions.load(Ordering::SeqCst), 0);
}

#[test]
fn factory_failure_names_the_tool_type() {
    let (hook, _harness) = fake_hook();
    let probe = ToolProbe::default();
    let executions = Arc::clone(&probe.executions);

    let factory = |_command: MockCommand| -> Result<MockTool, ToolError> {
        Err("no tool for this command".into())
    };
    let result = run_with(factory, argv(&["-k", "7"]), plan(hook, ExitProbe::default()));

    let Err(ExecutorError::Construction { tool, source }) = result else {
        panic!("expected a construction error");
    };
    assert!(tool.contains("MockTool"), "tool type missing from '{tool}'");
    assert_eq!(source.to_string(), "no tool for this command");
    assert_eq!(executions.load(Ordering::SeqCst), 0);
}

#[test]
fn execution_failure_shuts_down_once_and_requests_exit_one() {
    let (hook, _harness) = fake_hook();
    let exit = ExitProbe::default();
    let probe = ToolProbe::default();

    let outcome = run_with(
        mock_factory(&probe, true, false),
        argv(&["-k", "7"]),
        plan(hook, exit.clone()),
    )
    .expect("execution failures are contained by the executor");

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(probe.executions.load(Ordering::SeqCst), 1);
    assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
    assert_eq!(exit.codes(), vec![1]);
}

#[test]
fn shutdown_failure_does_not_change_the_requested_exit_status() {
    let (hook, _harness) = fake_hook();
    let exit = ExitProbe::default();
    let probe = ToolProbe::default();

    let outcome = run_with(
        mock_factory(&probe, true, true),
        argv(&["-k", "7"]),
        plan(hook, exit.clone()),
    )
    .expect("shutdown failures are contained by the executor");

    assert_eq!(outcome, RunOutcome::Failed);
    assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
    assert_eq!(exit.codes(), vec![1]);
}

#[test]
fn termination_trigger_shuts_down_a_blocked_service() {
    let (hook, harness) = fake_hook();
    let probe = ToolProbe::default();
    let factory_probe = probe.clone();
    let factory = move |_command: MockCommand| -> Result<BlockingTool, ToolError> {
        Ok(BlockingTool::new(factory_probe))
    };

    // The trigger is queued before the listener starts; it is picked up as
    // soon as the hook is installed, while execute() is still blocked.
    harness
        .trigger
        .send(15)
        .expect("queue termination trigger");
    let outcome = run_with(factory, argv(&["-k", "7"]), plan(hook, ExitProbe::default()))
        .expect("run should succeed");
    harness.wait_for_listener();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(probe.executions.load(Ordering::SeqCst), 1);
    assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn racing_failure_and_termination_triggers_shut_down_exactly_once() {
    for _ in 0..100 {
        let (hook, harness) = fake_hook();
        let exit = ExitProbe::default();
        let probe = ToolProbe::default();

        let trigger = harness.trigger.clone();
        let racer = thread::spawn(move || {
            let _ignored = trigger.send(15);
        });

        let outcome = run_with(
            mock_factory(&probe, true, false),
            argv(&["-k", "7"]),
            plan(hook, exit.clone()),
        )
        .expect("execution failures are contained by the executor");
        racer.join().expect("trigger thread panicked");
        harness.wait_for_listener();

        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(exit.codes(), vec![1]);
    }
}
