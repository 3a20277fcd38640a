//! Command serialization core.
//!
//! Every slash command that talks to a generation provider is routed
//! through a single [`CommandQueue`]. The queue acknowledges the platform
//! request up front, then runs tasks one at a time in arrival order on a
//! lazily spawned drain loop. A failing task is reported back to its
//! requester and never stops the loop.

pub mod ack;
pub mod fifo;
pub mod invocation;
pub mod report;
pub mod task;

pub use self::ack::{acknowledge, AckState};
pub use self::fifo::CommandQueue;
pub use self::invocation::{CommandInput, Invocation, SharedInvocation};
pub use self::task::{handler, Handler, QueuedTask, TaskFuture};
