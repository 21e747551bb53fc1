//! Pipeline components: shared context, timeout timer, correction, sinks, orchestration.

pub mod context;
pub mod correction;
pub mod error_handler;
pub mod orchestrator;
pub mod sink;
pub mod timer;

pub use context::TraversalContext;
pub use correction::{
    Collaborator, CommandCollaborator, Correction, CorrectionPolicy, NullaryFn, PromptFn,
    TimeoutFallback, handle_timeout, parse_instruction,
};
pub use error_handler::report_skipped_paths;
pub use orchestrator::run;
pub use sink::{ChannelSink, CollectSink, FnSink, Sink, WriterSink};
pub use timer::{TimerHandle, start_timer};
