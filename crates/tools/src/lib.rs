pub mod analytics;
pub mod errors;
pub mod registry;
pub mod render;
pub mod sideband;
pub mod traits;

pub use analytics::{analytics_tools, GetMetadataTool, RunRealtimeReportTool, RunReportTool};
pub use errors::{ErrorKind, ErrorPayload};
pub use registry::ToolRegistry;
pub use sideband::SidebandCredentials;
pub use traits::{Tool, ToolResult};
