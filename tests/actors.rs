//! End-to-end scenarios exercising the scheduling discipline described in
//! SPEC_FULL.md §8, using the same `riker-testkit` channel-probe pattern the
//! teacher's own integration tests use to observe actor state from outside
//! the system.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use riker_testkit::probe::channel::{probe, ChannelProbe};
use riker_testkit::probe::{Probe, ProbeReceive};

use dispatch_actors::{ActorId, ActorSystem, CreateError, Message, Payload, RoleBuilder, SendError, SystemConfig};

type CountProbe = ChannelProbe<(), u32>;
type UnitProbe = ChannelProbe<(), ()>;

fn quiet_config(pool_size: usize) -> SystemConfig {
    SystemConfig {
        pool_size,
        mailbox_capacity: SystemConfig::default().mailbox_capacity,
    }
}

fn discard_log() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

const PING: u32 = 3;

/// A single actor counts `PING`s it receives, and reports the final count
/// through a probe from its destructor once the system quiesces — the
/// destructor is the only place a test can observe state a dead actor held,
/// since by then the registry has nothing handler code can query.
#[test]
fn single_actor_counts_pings_and_reports_on_teardown() {
    let (probe, listen): (CountProbe, _) = probe();

    struct CounterState {
        count: u32,
        probe: CountProbe,
    }

    // `CountProbe` wraps an `mpsc::Sender`, which is `Send` but not `Sync`;
    // a `Mutex` is the standard way to make a `Send`-only capture safe to
    // store inside a handler closure, which must be `Send + Sync` because
    // its `Role` is shared (via `Arc`) with every worker thread.
    let probe_for_hello = Mutex::new(probe);
    let role = RoleBuilder::new()
        .on(dispatch_actors::HELLO, move |state, _ctx, _payload| {
            *state = Box::new(CounterState {
                count: 0,
                probe: probe_for_hello.lock().unwrap().clone(),
            });
        })
        .on(PING, |state, _ctx, _payload| {
            let counter = state.downcast_mut::<CounterState>().unwrap();
            counter.count += 1;
        })
        .with_destructor(|state| {
            if let Ok(counter) = state.downcast::<CounterState>() {
                counter.probe.event(counter.count);
            }
        })
        .build();

    let system = ActorSystem::create_with(role, quiet_config(2), discard_log())
        .expect("system creation with a valid config never fails");

    let root = system.root_id();
    for _ in 0..10 {
        system.send(root, Message::new(PING, Payload::Empty)).unwrap();
    }
    system.send(root, Message::terminate()).unwrap();

    system.join();

    assert_eq!(listen.recv(), 10);
}

/// Spawning a chain of 100 children from the root (each immediately
/// terminating itself on its `HELLO`) must leave `actor_count() == 101`
/// once the system quiesces: every spawned actor gets a permanent id, dead
/// or not (invariant 4, §3).
#[test]
fn spawn_chain_grows_actor_count_and_quiesces() {
    static SPAWNED: AtomicU64 = AtomicU64::new(0);
    const CHAIN_LEN: u64 = 100;

    fn leaf_role() -> Arc<dispatch_actors::Role> {
        RoleBuilder::new()
            .on(dispatch_actors::HELLO, |_state, ctx, _payload| {
                let n = SPAWNED.fetch_add(1, Ordering::SeqCst);
                if n + 1 < CHAIN_LEN {
                    let _ = ctx.send(ctx.self_id(), Message::spawn(leaf_role()));
                }
                let _ = ctx.send(ctx.self_id(), Message::terminate());
            })
            .build()
    }

    let root_role = RoleBuilder::new()
        .on(dispatch_actors::HELLO, |_state, ctx, _payload| {
            let _ = ctx.send(ctx.self_id(), Message::spawn(leaf_role()));
            let _ = ctx.send(ctx.self_id(), Message::terminate());
        })
        .build();

    let system = ActorSystem::create_with(root_role, quiet_config(4), discard_log()).unwrap();

    system.join();

    assert_eq!(system.actor_count(), CHAIN_LEN as usize + 1);
}

/// Once `join()` returns, the root has processed `TERMINATE` and is marked
/// dead; a subsequent send must be refused with `RecipientDead`, never
/// silently accepted or delivered.
#[test]
fn send_to_dead_actor_is_refused() {
    let role = RoleBuilder::new().build();
    let system = ActorSystem::create_with(role, quiet_config(1), discard_log()).unwrap();

    let root = system.root_id();
    system.send(root, Message::terminate()).unwrap();
    system.join();

    let result = system.send(root, Message::new(PING, Payload::Empty));
    assert_eq!(result, Err(SendError::RecipientDead));
}

/// An id nothing was ever assigned to (the registry never grew that far) is
/// refused with `NoSuchActor`, distinct from `RecipientDead`.
#[test]
fn send_to_unknown_actor_is_refused() {
    let role = RoleBuilder::new().build();
    let system = ActorSystem::create_with(role, quiet_config(1), discard_log()).unwrap();

    let bogus = ActorId::new(9999);
    let result = system.send(bogus, Message::new(PING, Payload::Empty));
    assert_eq!(result, Err(SendError::NoSuchActor));

    system.send(system.root_id(), Message::terminate()).unwrap();
    system.join();
}

/// `pool_size == 0` is refused at creation time rather than silently
/// producing a system that can never schedule anything.
#[test]
fn zero_pool_size_is_rejected() {
    let role = RoleBuilder::new().build();
    let result = ActorSystem::create_with(role, quiet_config(0), discard_log());
    assert!(matches!(result, Err(CreateError::InvalidPoolSize)));
}

struct WorkerState {
    remaining: u32,
    done: UnitProbe,
}

/// `ready` fires as the very last thing `HELLO` does, giving a test a safe
/// point to wait on before addressing this actor with anything else: SPAWN
/// only guarantees the child's id exists by the time a sender observes a
/// grown `actor_count()`, not that its `HELLO` has actually run yet, so
/// without this a racing `PING` could reach the mailbox first and find the
/// placeholder `()` state still in place.
fn worker_role(ready: UnitProbe, done: UnitProbe, messages: u32) -> Arc<dispatch_actors::Role> {
    // See the comment on the single-actor test: wrap the `Send`-only probes
    // in a `Mutex` so the closure as a whole is `Sync`.
    let ready = Mutex::new(ready);
    let done = Mutex::new(done);
    RoleBuilder::new()
        .on(dispatch_actors::HELLO, move |state, _ctx, _payload| {
            *state = Box::new(WorkerState {
                remaining: messages,
                done: done.lock().unwrap().clone(),
            });
            ready.lock().unwrap().event(());
        })
        .on(PING, |state, ctx, _payload| {
            std::thread::sleep(Duration::from_millis(5));
            let worker = state.downcast_mut::<WorkerState>().unwrap();
            worker.remaining -= 1;
            if worker.remaining == 0 {
                worker.done.event(());
                let _ = ctx.send(ctx.self_id(), Message::terminate());
            }
        })
        .build()
}

/// With enough workers, several independent actors processing many messages
/// each run in roughly parallel time, not actor-count*message-count
/// sequential time — a crude check that the pool fans work out across
/// threads rather than degenerating into one worker doing everything.
#[test]
fn independent_actors_process_in_parallel() {
    const ACTORS: u64 = 4;
    const MESSAGES_PER_ACTOR: u32 = 50;
    const WORK: Duration = Duration::from_millis(5);

    let ready_probes: Vec<(UnitProbe, _)> = (0..ACTORS).map(|_| probe()).collect();
    let done_probes: Vec<(UnitProbe, _)> = (0..ACTORS).map(|_| probe()).collect();

    let root_role = worker_role(ready_probes[0].0.clone(), done_probes[0].0.clone(), MESSAGES_PER_ACTOR);
    let system = ActorSystem::create_with(root_role, quiet_config(ACTORS as usize), discard_log()).unwrap();

    for i in 1..ACTORS as usize {
        system
            .send(
                system.root_id(),
                Message::spawn(worker_role(ready_probes[i].0.clone(), done_probes[i].0.clone(), MESSAGES_PER_ACTOR)),
            )
            .unwrap();
    }

    for (_, listen) in &ready_probes {
        assert_eq!(listen.recv(), ());
    }

    let started = Instant::now();
    for id in 0..ACTORS {
        for _ in 0..MESSAGES_PER_ACTOR {
            let _ = system.send(ActorId::new(id), Message::new(PING, Payload::Empty));
        }
    }

    for (_, listen) in &done_probes {
        assert_eq!(listen.recv(), ());
    }
    let elapsed = started.elapsed();

    system.join();

    let sequential = WORK * MESSAGES_PER_ACTOR * (ACTORS as u32);
    assert!(
        elapsed < sequential,
        "elapsed {:?} should be well under the fully-sequential bound {:?}",
        elapsed,
        sequential
    );
}

/// With `pool_size == 1`, two actors share a single worker. A long-running
/// handler in actor A cannot starve actor B forever: once A's handler call
/// returns, the worker is free to service B's outstanding ticket, so the
/// total wall-clock for interleaved work is bounded by the sum of the work,
/// not by A monopolizing the worker indefinitely.
#[test]
fn single_worker_does_not_starve_a_second_actor() {
    const WORK: Duration = Duration::from_millis(5);

    let (a_ready, a_ready_listen) = probe();
    let (a_done, a_listen) = probe();
    let (b_ready, b_ready_listen) = probe();
    let (b_done, b_listen) = probe();

    let root_role = worker_role(a_ready, a_done, 1);
    let system = ActorSystem::create_with(root_role, quiet_config(1), discard_log()).unwrap();

    system
        .send(system.root_id(), Message::spawn(worker_role(b_ready, b_done, 1)))
        .unwrap();

    let child = ActorId::new(1);
    assert_eq!(a_ready_listen.recv(), ());
    assert_eq!(b_ready_listen.recv(), ());

    system.send(system.root_id(), Message::new(PING, Payload::Empty)).unwrap();
    system.send(child, Message::new(PING, Payload::Empty)).unwrap();

    let started = Instant::now();
    assert_eq!(a_listen.recv(), ());
    assert_eq!(b_listen.recv(), ());
    let elapsed = started.elapsed();

    system.join();

    assert!(
        elapsed < WORK * 4,
        "both actors should finish within a small multiple of one unit of work, got {:?}",
        elapsed
    );
}

/// Two systems created back to back get distinct ids, and a single system's
/// id never changes across its lifetime.
#[test]
fn system_id_is_stable_and_unique() {
    let role = || RoleBuilder::new().build();
    let a = ActorSystem::create_with(role(), quiet_config(1), discard_log()).unwrap();
    let b = ActorSystem::create_with(role(), quiet_config(1), discard_log()).unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(a.id(), a.clone().id());

    a.send(a.root_id(), Message::terminate()).unwrap();
    b.send(b.root_id(), Message::terminate()).unwrap();
    a.join();
    b.join();
}

/// Dropping and recreating a state `Box<dyn Any>` by downcasting is the only
/// place the runtime's erased-state contract shows up in user code — keep a
/// focused unit test on that boundary independent of the full system.
#[test]
fn state_box_roundtrips_through_downcast() {
    let mut state: Box<dyn Any + Send> = Box::new(());
    state = Box::new(42_u32);
    assert_eq!(*state.downcast_ref::<u32>().unwrap(), 42);
}
