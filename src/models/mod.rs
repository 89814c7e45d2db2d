mod project;
mod client;
mod stats;

pub use project::{MissingFields, NewProject, Project, ProjectFields};
pub use client::{ClientSummary, summarize as summarize_clients};
pub use stats::{ProjectStats, upcoming_deadlines};
