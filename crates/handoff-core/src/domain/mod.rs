//! Domain model (ids, states, execution records).

pub mod ids;
pub mod record;
pub mod state;

pub use ids::TaskId;
pub use record::ExecutionRecord;
pub use state::TaskState;
