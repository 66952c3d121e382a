//! Integration tests for behavior dispatch and `become`.
//!
//! Covers the end-to-end behavior scenarios:
//! - the three-state testee cycling through int/float/string waits
//! - the capacity-bounded stack with empty/filled/full behaviors
//! - the mirror actor (`others` + reply of the last dequeued message)
//! - the chopstick state machine (`become` with a captured address)
//! - strict unmatched-message mode

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use tokio::sync::mpsc;

use parlor_rt::behavior::{Behavior, Pattern};
use parlor_rt::message::{Atom, Message, Value, ValueKind};
use parlor_rt::msg;
use parlor_rt::prelude::*;
use parlor_rt::supervision;

const GET_STATE: Atom = Atom::from_static("get_state");
const PUSH: Atom = Atom::from_static("push");
const POP: Atom = Atom::from_static("pop");
const OK: Atom = Atom::from_static("ok");
const FAILURE: Atom = Atom::from_static("failure");
const TAKE: Atom = Atom::from_static("take");
const TAKEN: Atom = Atom::from_static("taken");
const BUSY: Atom = Atom::from_static("busy");
const PUT: Atom = Atom::from_static("put");
const BREAK: Atom = Atom::from_static("break");

fn system() -> ActorSystem {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    ActorSystem::new(SystemConfig::default()).unwrap()
}

// ============================================================================
// Three-state testee
// ============================================================================

/// Cycles wait4int -> wait4float -> wait4string -> wait4int; answers
/// `get_state` with the name of the state it is waiting in.
struct EventTestee;

fn wait4int() -> Behavior<EventTestee> {
    Behavior::new()
        .on(Pattern::new().any(ValueKind::Int), |_, ctx, _msg| {
            ctx.become_(wait4float());
            Ok(())
        })
        .on(Pattern::new().atom(GET_STATE), |_, ctx, _msg| {
            ctx.reply(msg!["wait4int"]);
            Ok(())
        })
}

fn wait4float() -> Behavior<EventTestee> {
    Behavior::new()
        .on(Pattern::new().any(ValueKind::Float), |_, ctx, _msg| {
            ctx.become_(wait4string());
            Ok(())
        })
        .on(Pattern::new().atom(GET_STATE), |_, ctx, _msg| {
            ctx.reply(msg!["wait4float"]);
            Ok(())
        })
}

fn wait4string() -> Behavior<EventTestee> {
    Behavior::new()
        .on(Pattern::new().any(ValueKind::Str), |_, ctx, _msg| {
            ctx.become_(wait4int());
            Ok(())
        })
        .on(Pattern::new().atom(GET_STATE), |_, ctx, _msg| {
            ctx.reply(msg!["wait4string"]);
            Ok(())
        })
}

impl StateActor for EventTestee {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        wait4int()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_state_machine_testee_cycles_states() {
    let system = system();
    let testee = system.spawn(EventTestee).unwrap();

    // Ints are consumed one per state visit; the rest wait in the skip
    // cache until a state that wants them becomes active.
    system.send(&testee, msg![1]);
    system.send(&testee, msg![2]);
    system.send(&testee, msg![3]);
    system.send(&testee, msg![0.1]);
    system.send(&testee, msg!["a"]);
    system.send(&testee, msg![0.2]);
    system.send(&testee, msg![0.3]);
    system.send(&testee, msg!["b"]);
    system.send(&testee, msg!["c"]);

    let reply = system.ask(&testee, msg![GET_STATE]).await.unwrap();
    assert_eq!(reply, msg!["wait4int"]);

    system.send(&testee, supervision::exit_message(ExitReason::USER_DEFINED));
    system.await_all_actors_done().await;
}

// ============================================================================
// Fixed-capacity stack
// ============================================================================

struct FixedStack {
    max_size: usize,
    data: Vec<i64>,
}

impl FixedStack {
    fn new(max_size: usize) -> Self {
        Self {
            max_size,
            data: Vec::new(),
        }
    }

    fn empty() -> Behavior<Self> {
        Behavior::new()
            .on(
                Pattern::new().atom(PUSH).any(ValueKind::Int),
                |stack: &mut FixedStack, ctx, msg| {
                    let what = msg.get(1).and_then(Value::as_int).unwrap_or(0);
                    stack.data.push(what);
                    ctx.become_(Self::filled());
                    Ok(())
                },
            )
            .on(Pattern::new().atom(POP), |_stack, ctx, _msg| {
                ctx.reply(msg![FAILURE]);
                Ok(())
            })
    }

    fn filled() -> Behavior<Self> {
        Behavior::new()
            .on(
                Pattern::new().atom(PUSH).any(ValueKind::Int),
                |stack: &mut FixedStack, ctx, msg| {
                    let what = msg.get(1).and_then(Value::as_int).unwrap_or(0);
                    stack.data.push(what);
                    if stack.data.len() == stack.max_size {
                        ctx.become_(Self::full());
                    }
                    Ok(())
                },
            )
            .on(Pattern::new().atom(POP), |stack, ctx, _msg| {
                let top = stack.data.pop().unwrap_or(0);
                ctx.reply(msg![OK, top]);
                if stack.data.is_empty() {
                    ctx.become_(Self::empty());
                }
                Ok(())
            })
    }

    fn full() -> Behavior<Self> {
        Behavior::new()
            .on(
                Pattern::new().atom(PUSH).any(ValueKind::Int),
                |_stack: &mut FixedStack, _ctx, _msg| Ok(()),
            )
            .on(Pattern::new().atom(POP), |stack, ctx, _msg| {
                let top = stack.data.pop().unwrap_or(0);
                ctx.reply(msg![OK, top]);
                ctx.become_(Self::filled());
                Ok(())
            })
    }
}

impl StateActor for FixedStack {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        Self::empty()
    }
}

/// Drives the stack: 20 pushes, 20 pops, then receives the 10 failure
/// replies *first* (the ok replies wait in the skip cache meanwhile) and
/// the 10 ok replies afterwards, in their original arrival order.
struct StackDriver {
    stack: Address,
    replies: Vec<Message>,
    report: mpsc::UnboundedSender<Vec<Message>>,
}

impl StackDriver {
    fn collect_failures() -> Behavior<Self> {
        Behavior::new().on(Pattern::new().atom(FAILURE), |driver: &mut StackDriver, ctx, msg| {
            driver.replies.push(msg.clone());
            if driver.replies.len() == 10 {
                ctx.become_(Self::collect_oks());
            }
            Ok(())
        })
    }

    fn collect_oks() -> Behavior<Self> {
        Behavior::new().on(
            Pattern::new().atom(OK).any(ValueKind::Int),
            |driver: &mut StackDriver, ctx, msg| {
                driver.replies.push(msg.clone());
                if driver.replies.len() == 20 {
                    let _ = driver.report.send(std::mem::take(&mut driver.replies));
                    ctx.quit(ExitReason::Normal);
                }
                Ok(())
            },
        )
    }
}

impl StateActor for StackDriver {
    fn init_behavior(&mut self, ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        for i in 0..20 {
            ctx.send(&self.stack, msg![PUSH, i]);
        }
        for _ in 0..20 {
            ctx.send(&self.stack, msg![POP]);
        }
        Self::collect_failures()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fixed_stack_overflow_and_drain() {
    let system = system();
    let stack = system.spawn(FixedStack::new(10)).unwrap();

    let (report, mut results) = mpsc::unbounded_channel();
    system
        .spawn(StackDriver {
            stack: stack.clone(),
            replies: Vec::new(),
            report,
        })
        .unwrap();

    let replies = results.recv().await.unwrap();
    assert_eq!(replies.len(), 20);

    // Pushes 10..19 hit the full stack and are discarded. The 20 pops
    // drain 9..0 and then fail ten times; the driver receives the
    // failures first and the ok replies afterwards.
    for (i, reply) in replies.iter().take(10).enumerate() {
        assert_eq!(reply, &msg![FAILURE], "failed pop #{i}");
    }
    for (i, reply) in replies.iter().skip(10).enumerate() {
        assert_eq!(reply, &msg![OK, 9 - i as i64], "pop #{i}");
    }

    system.send(&stack, supervision::exit_message(ExitReason::USER_DEFINED));
    system.await_all_actors_done().await;
}

// ============================================================================
// Mirror actor
// ============================================================================

struct Mirror;

impl StateActor for Mirror {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        Behavior::new().others(|_state, ctx, _msg| {
            if let Some(last) = ctx.last_dequeued().cloned() {
                ctx.reply(last);
            }
            Ok(())
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mirror_replies_with_last_dequeued() {
    let system = system();
    let mirror = system.spawn(Mirror).unwrap();

    let reply = system.ask(&mirror, msg!["hello mirror"]).await.unwrap();
    assert_eq!(reply, msg!["hello mirror"]);

    system.send(&mirror, supervision::exit_message(ExitReason::USER_DEFINED));
    system.await_all_actors_done().await;
    assert_eq!(mirror.exit_reason(), Some(ExitReason::USER_DEFINED));
}

// ============================================================================
// Chopstick
// ============================================================================

struct Chopstick;

impl Chopstick {
    fn available() -> Behavior<Self> {
        Behavior::new()
            .on(
                Pattern::new().atom(TAKE).any(ValueKind::Addr),
                |_state, ctx, msg| {
                    if let Some(whom) = msg.get(1).and_then(Value::as_addr).cloned() {
                        ctx.become_(Self::taken_by(whom));
                    }
                    ctx.reply(msg![TAKEN]);
                    Ok(())
                },
            )
            .on(Pattern::new().atom(BREAK), |_state, ctx, _msg| {
                ctx.quit(ExitReason::Normal);
                Ok(())
            })
    }

    fn taken_by(whom: Address) -> Behavior<Self> {
        Behavior::new()
            .on(
                Pattern::new().atom(TAKE).any(ValueKind::Addr),
                |_state, ctx, _msg| {
                    ctx.reply(msg![BUSY]);
                    Ok(())
                },
            )
            .on(
                Pattern::new().atom(PUT).literal(whom),
                |_state, ctx, _msg| {
                    ctx.become_(Self::available());
                    Ok(())
                },
            )
            .on(Pattern::new().atom(BREAK), |_state, ctx, _msg| {
                ctx.quit(ExitReason::Normal);
                Ok(())
            })
    }
}

impl StateActor for Chopstick {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        Self::available()
    }
}

struct Philosopher {
    chopstick: Address,
    report: mpsc::UnboundedSender<Message>,
}

impl StateActor for Philosopher {
    fn init_behavior(&mut self, ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        let me = ctx.address().clone();
        ctx.send(&self.chopstick, msg![TAKE, me]);
        Behavior::new()
            .on(Pattern::new().atom(TAKEN), |state: &mut Philosopher, ctx, msg| {
                let _ = state.report.send(msg.clone());
                let me = ctx.address().clone();
                ctx.send(&state.chopstick, msg![PUT, me]);
                ctx.send(&state.chopstick, msg![BREAK]);
                ctx.quit(ExitReason::Normal);
                Ok(())
            })
            .on(Pattern::new().atom(BUSY), |state, ctx, msg| {
                let _ = state.report.send(msg.clone());
                ctx.quit(ExitReason::Normal);
                Ok(())
            })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_chopstick_take_put_break() {
    let system = system();
    let chopstick = system.spawn(Chopstick).unwrap();

    let (report, mut results) = mpsc::unbounded_channel();
    system
        .spawn(Philosopher {
            chopstick: chopstick.clone(),
            report,
        })
        .unwrap();

    assert_eq!(results.recv().await.unwrap(), msg![TAKEN]);
    system.await_all_actors_done().await;
    assert_eq!(chopstick.exit_reason(), Some(ExitReason::Normal));
}

// ============================================================================
// Unmatched messages
// ============================================================================

struct Deaf;

impl StateActor for Deaf {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        Behavior::new().on(Pattern::new().atom(GET_STATE), |_, _, _| Ok(()))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unmatched_messages_are_retained_by_default() {
    let system = system();
    let deaf = system.spawn(Deaf).unwrap();

    // Nothing matches; the actor keeps the messages aside and stays alive.
    system.send(&deaf, msg![1, 2, 3]);
    system.send(&deaf, msg!["noise"]);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(deaf.is_alive());

    system.send(&deaf, supervision::exit_message(ExitReason::USER_DEFINED));
    system.await_all_actors_done().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_strict_mode_terminates_on_unmatched() {
    let config = SystemConfig::builder()
        .with_strict_unmatched(true)
        .build()
        .unwrap();
    let system = ActorSystem::new(config).unwrap();
    let deaf = system.spawn(Deaf).unwrap();

    system.send(&deaf, msg!["noise"]);
    system.await_all_actors_done().await;
    assert_eq!(deaf.exit_reason(), Some(ExitReason::UnknownMessage));
}

// ============================================================================
// Behavior stack: become_keep / unbecome
// ============================================================================

const ENTER: Atom = Atom::from_static("enter");
const LEAVE: Atom = Atom::from_static("leave");
const PING: Atom = Atom::from_static("ping");

struct Moody;

impl Moody {
    fn base() -> Behavior<Self> {
        Behavior::new()
            .on(Pattern::new().atom(PING), |_state, ctx, _msg| {
                ctx.reply(msg!["base"]);
                Ok(())
            })
            .on(Pattern::new().atom(ENTER), |_state, ctx, _msg| {
                ctx.become_keep(Self::elevated());
                Ok(())
            })
            .on(Pattern::new().atom(BREAK), |_state, ctx, _msg| {
                ctx.quit(ExitReason::Normal);
                Ok(())
            })
    }

    fn elevated() -> Behavior<Self> {
        Behavior::new()
            .on(Pattern::new().atom(PING), |_state, ctx, _msg| {
                ctx.reply(msg!["elevated"]);
                Ok(())
            })
            .on(Pattern::new().atom(LEAVE), |_state, ctx, _msg| {
                ctx.unbecome();
                Ok(())
            })
    }
}

impl StateActor for Moody {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        Self::base()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_become_keep_and_unbecome() {
    let system = system();
    let moody = system.spawn(Moody).unwrap();

    assert_eq!(system.ask(&moody, msg![PING]).await.unwrap(), msg!["base"]);

    system.send(&moody, msg![ENTER]);
    assert_eq!(
        system.ask(&moody, msg![PING]).await.unwrap(),
        msg!["elevated"]
    );

    system.send(&moody, msg![LEAVE]);
    assert_eq!(system.ask(&moody, msg![PING]).await.unwrap(), msg!["base"]);

    system.send(&moody, msg![BREAK]);
    system.await_all_actors_done().await;
}

// ============================================================================
// Handler failure
// ============================================================================

struct Brittle;

impl StateActor for Brittle {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        Behavior::new().on(Pattern::new().literal("explode"), |_state, _ctx, _msg| {
            Err("boom".into())
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_handler_error_terminates_with_unhandled_exception() {
    let system = system();
    let brittle = system.spawn(Brittle).unwrap();

    system.send(&brittle, msg!["explode"]);
    system.await_all_actors_done().await;
    assert_eq!(brittle.exit_reason(), Some(ExitReason::UnhandledException));
}

// ============================================================================
// Ordering
// ============================================================================

struct Collector {
    seen: Vec<i64>,
    report: mpsc::UnboundedSender<Vec<i64>>,
    expect: usize,
}

impl StateActor for Collector {
    fn init_behavior(&mut self, _ctx: &mut ActorContext<Self>) -> Behavior<Self> {
        Behavior::new().on(Pattern::new().any(ValueKind::Int), |state: &mut Collector, ctx, msg| {
            state.seen.push(msg.get(0).and_then(Value::as_int).unwrap_or(-1));
            if state.seen.len() == state.expect {
                let _ = state.report.send(std::mem::take(&mut state.seen));
                ctx.quit(ExitReason::Normal);
            }
            Ok(())
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_per_sender_fifo_order() {
    let system = system();
    let (report, mut results) = mpsc::unbounded_channel();
    let collector = system
        .spawn(Collector {
            seen: Vec::new(),
            report,
            expect: 100,
        })
        .unwrap();

    // Anonymous sends through the address handle itself.
    for i in 0..100 {
        collector.send(msg![i]);
    }

    let seen = results.recv().await.unwrap();
    assert_eq!(seen, (0..100).collect::<Vec<i64>>());
    system.await_all_actors_done().await;
}
