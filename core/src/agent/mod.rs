pub mod assembler;
pub mod loop_;
pub mod registry;
pub mod supervisor;
pub mod toolset;
pub mod worker;

pub use assembler::GraphAssembler;
pub use loop_::{Dispatch, ExecutionPolicy, LoopOutcome, ReactLoop};
pub use registry::ToolRegistry;
pub use supervisor::SupervisorAgent;
pub use toolset::ToolSet;
pub use worker::WorkerAgent;
