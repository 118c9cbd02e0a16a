//! Identifiers for the synchronized record collections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the four record collections mirrored from the backend.
///
/// The push channel names a module in its "data updated" signal; the REST
/// API exposes each module under its own resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncModule {
    Contacts,
    Bookings,
    ManualMatches,
    Repositories,
}

impl SyncModule {
    pub const ALL: [SyncModule; 4] = [
        SyncModule::Contacts,
        SyncModule::Bookings,
        SyncModule::ManualMatches,
        SyncModule::Repositories,
    ];

    /// Name carried by push signals.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncModule::Contacts => "contacts",
            SyncModule::Bookings => "bookings",
            SyncModule::ManualMatches => "manual-matches",
            SyncModule::Repositories => "repositories",
        }
    }

    /// REST resource path below the API root.
    pub fn resource_path(&self) -> &'static str {
        match self {
            SyncModule::Contacts => "contact",
            SyncModule::Bookings => "consultation",
            SyncModule::ManualMatches => "manual-match",
            SyncModule::Repositories => "repository",
        }
    }
}

impl fmt::Display for SyncModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A push signal named a module this client does not track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sync module: {0}")]
pub struct UnknownModule(pub String);

impl FromStr for SyncModule {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyncModule::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}
