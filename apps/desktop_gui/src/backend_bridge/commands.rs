//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

pub enum BackendCommand {
    SelectFile { path: PathBuf },
    ClearSelection,
    SetQuery { text: String },
    SubmitUpload,
    SubmitAsk,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectFile { .. } => "select_file",
            Self::ClearSelection => "clear_selection",
            Self::SetQuery { .. } => "set_query",
            Self::SubmitUpload => "submit_upload",
            Self::SubmitAsk => "submit_ask",
        }
    }
}
