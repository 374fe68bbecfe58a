pub mod agent;
pub mod memory;
pub mod steps;

pub use agent::Agent;
pub use memory::AgentMemory;
pub use steps::AgentStep;
