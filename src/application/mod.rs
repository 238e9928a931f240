//! Application layer - the session engine and its collaborators.
//!
//! Orchestrates the domain aggregate against the content supplier and
//! history ports. Presentation code talks to `SessionEngine` only.

mod auto_continue;
mod engine;
mod pool_assembler;

pub use auto_continue::{arm_celebration_timer, schedule_auto_finish, SharedEngine};
pub use engine::{EngineSettings, SessionEngine};
pub use pool_assembler::PoolAssembler;
