use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Category of a citizen-reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum IssueType {
    Sanitation,
    Roads,
    Water,
    Safety,
    Other,
}

/// Workflow state of an issue. Any status may move to any other status;
/// there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    /// Fixed reporting order for the dashboard status breakdown.
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
    ];

    /// Statuses that stamp `resolved_at` the first time they are reached.
    pub fn marks_resolution(self) -> bool {
        matches!(self, Status::Resolved | Status::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Role of a caller as established by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum Role {
    Citizen,
    Admin,
    Staff,
}

macro_rules! enum_strings {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!(
                        concat!("unknown ", stringify!($ty), " '{}'"),
                        other
                    )),
                }
            }
        }
    };
}

enum_strings!(IssueType {
    Sanitation => "sanitation",
    Roads => "roads",
    Water => "water",
    Safety => "safety",
    Other => "other",
});

enum_strings!(Status {
    Pending => "pending",
    InProgress => "in-progress",
    Resolved => "resolved",
    Closed => "closed",
});

enum_strings!(Priority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

enum_strings!(Role {
    Citizen => "citizen",
    Admin => "admin",
    Staff => "staff",
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub coordinates: Coordinates,
}

/// One citizen-reported civic problem record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub reporter_id: i64,
    pub issue_type: IssueType,
    pub description: String,
    pub location: Location,
    /// References into the blob store, in upload order. At most 5.
    pub photos: Vec<String>,
    pub status: Status,
    pub priority: Priority,
    pub department: Option<String>,
    pub assigned_to: Option<i64>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stamped the first time status reaches resolved or closed, then kept.
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
