//! Runs one scheduled job and turns everything it does into messages.
//!
//! Each run announces itself, captures stdout at info and stderr at error
//! severity through two independent [`LineReassembler`]s, classifies how the
//! process ended, and fires the matching ping in the background.
//!
//! [`LineReassembler`]: crate::reassembler::LineReassembler

mod job;
mod outcome;
mod runner;


pub use job::JobSpec;
pub use outcome::JobOutcome;
pub use runner::JobExecutor;

/// Prefix marking lines produced by the runner rather than the job itself.
pub const SYSTEM_PREFIX: &str = "[SYS]";
