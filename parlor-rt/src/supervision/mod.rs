//! Exit reasons and the system messages of the supervision protocol.

pub mod exit;

pub use exit::{
    down_message, exit_message, exit_reason_of, exited_message, ExitReason, DOWN, EXIT, EXITED,
    USER_REASON_BASE,
};
