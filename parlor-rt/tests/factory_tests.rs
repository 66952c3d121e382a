//! Integration tests for the factory spawning style and spawning from
//! handlers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use parlor_rt::behavior::{Behavior, Pattern};
use parlor_rt::message::{Atom, Message, Value, ValueKind};
use parlor_rt::msg;
use parlor_rt::prelude::*;

const DONE: Atom = Atom::from_static("done");
const GET_INT: Atom = Atom::from_static("get_int");
const SET_INT: Atom = Atom::from_static("set_int");

fn system() -> ActorSystem {
    ActorSystem::new(SystemConfig::default()).unwrap()
}

// ============================================================================
// Per-instance state
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_factory_instances_have_independent_state() {
    let system = system();

    let cell_factory = ActorFactory::event_based(|_state: &mut i64, ctx| {
        ctx.become_(
            Behavior::new()
                .on(Pattern::new().atom(GET_INT), |value, ctx, _msg| {
                    ctx.reply(msg![*value]);
                    Ok(())
                })
                .on(
                    Pattern::new().atom(SET_INT).any(ValueKind::Int),
                    |value, _ctx, msg| {
                        *value = msg.get(1).and_then(Value::as_int).unwrap_or(0);
                        Ok(())
                    },
                )
                .on(Pattern::new().atom(DONE), |_value, ctx, _msg| {
                    ctx.quit(ExitReason::Normal);
                    Ok(())
                }),
        );
    });

    let foobaz = cell_factory.spawn(&system, 23).unwrap();
    let other = cell_factory.spawn(&system, 7).unwrap();

    assert_eq!(system.ask(&foobaz, msg![GET_INT]).await.unwrap(), msg![23]);
    system.send(&foobaz, msg![SET_INT, 42]);
    assert_eq!(system.ask(&foobaz, msg![GET_INT]).await.unwrap(), msg![42]);

    // The sibling instance kept its own value.
    assert_eq!(system.ask(&other, msg![GET_INT]).await.unwrap(), msg![7]);

    system.send(&foobaz, msg![DONE]);
    system.send(&other, msg![DONE]);
    system.await_all_actors_done().await;
}

// ============================================================================
// Init and exit hooks
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_hooks_run_even_without_behavior() {
    let system = system();
    let init_calls = Arc::new(AtomicUsize::new(0));
    let exit_calls = Arc::new(AtomicUsize::new(0));

    let init_counter = Arc::clone(&init_calls);
    let exit_counter = Arc::clone(&exit_calls);
    let zombie_factory = ActorFactory::event_based(move |_state: &mut (), _ctx| {
        init_counter.fetch_add(1, Ordering::SeqCst);
        // No behavior installed: the actor dies right after init.
    })
    .with_exit_hook(move |_state, _ctx, reason| {
        assert_eq!(reason, ExitReason::Normal);
        exit_counter.fetch_add(1, Ordering::SeqCst);
    });

    let zombie = zombie_factory.spawn(&system, ()).unwrap();
    system.await_all_actors_done().await;

    assert_eq!(init_calls.load(Ordering::SeqCst), 1);
    assert_eq!(exit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(zombie.exit_reason(), Some(ExitReason::Normal));
}

// ============================================================================
// Message inflation through a factory chain
// ============================================================================

struct Inflate {
    receiver: Address,
}

fn inflater() -> ActorFactory<Inflate> {
    ActorFactory::event_based(|_state: &mut Inflate, ctx| {
        ctx.become_(
            Behavior::new()
                .on(
                    Pattern::new().any(ValueKind::Int).any(ValueKind::Str),
                    |state: &mut Inflate, ctx, msg| {
                        let n = msg.get(0).and_then(Value::as_int).unwrap_or(0);
                        let s = msg.get(1).and_then(Value::as_str).unwrap_or("");
                        ctx.send(&state.receiver, msg![n * 2, s]);
                        Ok(())
                    },
                )
                .on(Pattern::new().atom(DONE), |_state, ctx, _msg| {
                    ctx.quit(ExitReason::Normal);
                    Ok(())
                }),
        );
    })
}

struct InflaterDriver {
    report: mpsc::UnboundedSender<Message>,
}

impl StateActor for InflaterDriver {
    fn init_behavior(&mut self, ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        let factory = inflater();
        let joe = factory
            .spawn(ctx.system(), Inflate {
                receiver: ctx.address().clone(),
            })
            .unwrap();
        let bob = factory
            .spawn(ctx.system(), Inflate {
                receiver: joe.clone(),
            })
            .unwrap();

        ctx.send(&bob, msg![1, "hello actor"]);
        Behavior::new().others(move |state: &mut InflaterDriver, ctx, msg| {
            let _ = state.report.send(msg.clone());
            ctx.send(&joe, msg![DONE]);
            ctx.send(&bob, msg![DONE]);
            ctx.quit(ExitReason::Normal);
            Ok(())
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_factory_chain_doubles_twice() {
    let system = system();
    let (report, mut results) = mpsc::unbounded_channel();
    system.spawn(InflaterDriver { report }).unwrap();

    let result = results.recv().await.unwrap();
    assert_eq!(result, msg![4, "hello actor"]);
    system.await_all_actors_done().await;
}

// ============================================================================
// Spawning from inside a handler
// ============================================================================

struct Forwarder {
    name: &'static str,
    pal: Option<Address>,
}

impl StateActor for Forwarder {
    fn init_behavior(&mut self, ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        if self.name == "Joe" && self.pal.is_none() {
            let bob = ctx
                .system()
                .spawn(Forwarder {
                    name: "Bob",
                    pal: Some(ctx.address().clone()),
                })
                .unwrap();
            self.pal = Some(bob);
        }
        Behavior::new().others(|state: &mut Forwarder, ctx, msg| {
            // Forward the message and die; the pal does the same, and its
            // forward to the already-dead partner is silently dropped.
            if let Some(pal) = &state.pal {
                ctx.send(pal, msg.clone());
            }
            ctx.quit(ExitReason::Normal);
            Ok(())
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_spawn_from_init_builds_a_chain() {
    let system = system();
    let joe = system
        .spawn(Forwarder {
            name: "Joe",
            pal: None,
        })
        .unwrap();
    assert_eq!(system.actor_count(), 2);

    system.send(&joe, msg![DONE]);
    system.await_all_actors_done().await;
    assert_eq!(system.actor_count(), 0);
}
