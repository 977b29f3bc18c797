//! AzCopy invocation building
//!
//! Locates the external copy tool and builds the `copy` argument vector. The
//! SAS token travels only inside the destination argument; anything that gets
//! logged goes through [`TransferRequest::masked_destination`].

use std::path::{Path, PathBuf};

use crate::error::TransferError;

/// One upload, fixed once the transfer starts
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Local folder whose contents are uploaded
    pub source_folder: PathBuf,

    /// Destination container URL
    pub destination_url: String,

    /// SAS query token granting write access. Secret.
    pub sas_token: String,
}

impl TransferRequest {
    /// Destination argument as azcopy expects it: `<url>?<sas>`
    pub fn destination_arg(&self) -> String {
        format!("{}?{}", self.destination_url, self.sas_token)
    }

    /// Destination with the SAS token elided, safe for logs
    pub fn masked_destination(&self) -> String {
        format!("{}?<sas>", self.destination_url)
    }
}

/// Handle to a located azcopy binary
#[derive(Debug, Clone)]
pub struct AzCopy {
    path: PathBuf,
}

impl AzCopy {
    /// Wrap an explicit binary path without checking it
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Locate azcopy: configured path, then `AZCOPY_PATH`, then `PATH`.
    ///
    /// Installation is handled earlier in the session by the installer; this
    /// layer only checks presence.
    pub fn locate(configured: Option<&Path>) -> Result<Self, TransferError> {
        if let Some(path) = configured {
            return if path.is_file() {
                Ok(Self::at(path.to_path_buf()))
            } else {
                Err(TransferError::ToolNotInstalled)
            };
        }

        if let Some(path) = std::env::var_os("AZCOPY_PATH") {
            let path = PathBuf::from(path);
            return if path.is_file() {
                Ok(Self::at(path))
            } else {
                Err(TransferError::ToolNotInstalled)
            };
        }

        find_on_path().ok_or(TransferError::ToolNotInstalled)
    }

    /// Path of the binary
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Argument vector for uploading a folder's contents recursively
    pub fn copy_args(&self, request: &TransferRequest) -> Vec<String> {
        vec![
            "copy".to_string(),
            format!("{}/*", request.source_folder.display()),
            request.destination_arg(),
            "--recursive".to_string(),
        ]
    }
}

fn find_on_path() -> Option<AzCopy> {
    let binary = if cfg!(windows) { "azcopy.exe" } else { "azcopy" };
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
        .map(AzCopy::at)
}
