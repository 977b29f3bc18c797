//! Upload selection state machine
//!
//! Tracks the four selection fields and derives whether a transfer may start.
//! Completeness is recomputed from the current field values on every change,
//! never accumulated incrementally.

use std::path::PathBuf;

use crate::client::DataType;
use crate::error::{Error, Result};

/// Current selection of upload parameters
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub project: Option<String>,
    pub run: Option<String>,
    pub data_type: Option<DataType>,
    pub folder: Option<PathBuf>,
}

impl Selection {
    /// True when every field needed to start a transfer is set
    pub fn is_complete(&self) -> bool {
        self.project.is_some()
            && self.run.is_some()
            && self.data_type.is_some()
            && self.folder.is_some()
    }
}

/// Lifecycle of one upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// At least one selection field is missing
    Incomplete,
    /// All fields set, transfer may start
    Ready,
    /// Transfer in flight, start is disabled
    Running,
    /// Transfer finished with exit code 0
    Completed,
    /// Transfer or a preparation step failed; restartable
    Failed,
}

/// Controller wiring selection changes to the start/stop lifecycle
#[derive(Debug)]
pub struct UploadController {
    selection: Selection,
    phase: UploadPhase,
}

impl UploadController {
    pub fn new() -> Self {
        Self {
            selection: Selection::default(),
            phase: UploadPhase::Incomplete,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Selecting a project resets the run, which belongs to the old project
    pub fn set_project(&mut self, project: Option<String>) {
        self.selection.project = project;
        self.selection.run = None;
        self.revalidate();
    }

    pub fn set_run(&mut self, run: Option<String>) {
        self.selection.run = run;
        self.revalidate();
    }

    pub fn set_data_type(&mut self, data_type: Option<DataType>) {
        self.selection.data_type = data_type;
        self.revalidate();
    }

    pub fn set_folder(&mut self, folder: Option<PathBuf>) {
        self.selection.folder = folder;
        self.revalidate();
    }

    /// Move to `Running`. Refused while incomplete or already running.
    pub fn begin(&mut self) -> Result<()> {
        if self.phase == UploadPhase::Running {
            return Err(Error::Other("A transfer is already running.".to_string()));
        }
        if !self.selection.is_complete() {
            return Err(Error::Other(
                "Select a project, run, data type and folder before starting.".to_string(),
            ));
        }
        self.phase = UploadPhase::Running;
        Ok(())
    }

    /// Record the supervisor's terminal event
    pub fn complete(&mut self, exit_code: i32) {
        self.phase = if exit_code == 0 {
            UploadPhase::Completed
        } else {
            UploadPhase::Failed
        };
    }

    /// Record a failure from a preparation step (folder init, credential)
    pub fn fail(&mut self) {
        self.phase = UploadPhase::Failed;
    }

    fn revalidate(&mut self) {
        // A running transfer is never preempted by selection edits
        if self.phase == UploadPhase::Running {
            return;
        }
        self.phase = if self.selection.is_complete() {
            UploadPhase::Ready
        } else {
            UploadPhase::Incomplete
        };
    }
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}
