pub mod use_cases;

pub use use_cases::export::{ExportUseCase, ExportWorker};
pub use use_cases::scenario::ScenarioUseCase;
