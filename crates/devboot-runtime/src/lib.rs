pub mod activation;
pub mod bootstrap;
pub mod os_backend;
pub mod process;
pub mod venv;

pub use bootstrap::{BootstrapPlan, BootstrapReport, Bootstrapper, LaunchOutcome, StepOutcome};
pub use os_backend::{ConsoleMode, OsBackend};
pub use process::{CommandSpec, ProcessBackend};
