//! Euphrosyne API data models

use serde::{Deserialize, Serialize};

/// Project resource from the lab catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name, used as the remote folder name
    pub name: String,

    /// URL slug
    pub slug: String,

    /// Runs recorded for this project
    #[serde(default)]
    pub runs: Vec<Run>,
}

/// A measurement run within a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Run label, used as the remote folder name
    pub label: String,

    /// Beam particle type
    pub particle_type: String,

    /// Beam energy in keV
    #[serde(rename = "energy_in_keV")]
    pub energy_in_kev: i64,

    /// Objects analysed during the run
    #[serde(default)]
    pub objects: Vec<ObjectSummary>,

    /// URL of the run's methods resource
    pub methods_url: String,
}

/// Short reference to an analysed object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object ID
    pub id: i64,

    /// Object label
    pub label: String,
}

/// Short-lived, scoped credential for uploading run data.
///
/// The token is a secret: it is passed to the copy tool verbatim and must
/// never be logged or persisted. `Debug` redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct UploadCredential {
    /// Destination URL of the storage container
    pub url: String,

    /// SAS-style query token granting write access
    pub token: String,
}

impl std::fmt::Debug for UploadCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCredential")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Kind of run data being uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    RawData,
    ProcessedData,
}

impl DataType {
    /// All selectable data types
    pub const ALL: [DataType; 2] = [DataType::RawData, DataType::ProcessedData];

    /// Wire value used in the upload-credential query string
    pub fn as_query(&self) -> &'static str {
        match self {
            DataType::RawData => "raw_data",
            DataType::ProcessedData => "processed_data",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::RawData => write!(f, "raw data"),
            DataType::ProcessedData => write!(f, "processed data"),
        }
    }
}
