pub mod commands;
pub mod events;
pub mod reducer;
pub mod store;

pub use commands::FlowCommand;
pub use events::FlowEvent;
pub use reducer::reduce;
pub use store::FlowStore;
