

pub mod memory;
pub mod models;
pub mod store;

pub use memory::InMemoryStore;
pub use models::{Sprint, Task, TeamMember, UserStory};
pub use store::SprintStore;
