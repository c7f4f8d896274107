

pub mod server;

pub use server::{SprintPlannerMcpServer, run_server};
