//! Process identity and introspection used by the info endpoints.

pub mod app_info;
pub mod process;

pub use app_info::AppInfo;
pub use process::{CpuUsage, MemoryUsage, ProcessSnapshot};
