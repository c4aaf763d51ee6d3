//! The upload script, its UI table, and the interpreter that runs it.

mod machine;
mod step;
mod table;

pub use machine::{RunReport, RunState, UploadRequest, UploadStateMachine};
pub use step::{Action, Settle, StepId, TextSource, UPLOAD_SCRIPT, UploadStep};
pub use table::{ScrollGesture, UI_TABLE_VERSION, UiTable};
