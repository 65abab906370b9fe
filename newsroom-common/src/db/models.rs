//! Shared domain types stored in the database

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    NewsReporter,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::NewsReporter, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::NewsReporter => "news_reporter",
            Role::User => "user",
        }
    }

    /// Landing page after login
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::NewsReporter => "/reporter/dashboard",
            Role::User => "/user/dashboard/breakingnews",
        }
    }

    /// Roles allowed on the reporter surface
    pub fn can_report(&self) -> bool {
        matches!(self, Role::Admin | Role::NewsReporter)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "news_reporter" => Ok(Role::NewsReporter),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Moderation status of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsStatus {
    Monitoring,
    Verified,
    Flagged,
}

impl NewsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Monitoring => "monitoring",
            NewsStatus::Verified => "verified",
            NewsStatus::Flagged => "flagged",
        }
    }
}

impl fmt::Display for NewsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "monitoring" => Ok(NewsStatus::Monitoring),
            "verified" => Ok(NewsStatus::Verified),
            "flagged" => Ok(NewsStatus::Flagged),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::NewsReporter.to_string(), "news_reporter");
    }

    #[test]
    fn test_role_serde_snake_case() {
        let json = serde_json::to_string(&Role::NewsReporter).unwrap();
        assert_eq!(json, "\"news_reporter\"");
    }

    #[test]
    fn test_home_paths() {
        assert_eq!(Role::Admin.home_path(), "/admin/dashboard");
        assert_eq!(Role::User.home_path(), "/user/dashboard/breakingnews");
        assert!(Role::Admin.can_report());
        assert!(!Role::User.can_report());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("flagged".parse::<NewsStatus>().unwrap(), NewsStatus::Flagged);
        assert!("deleted".parse::<NewsStatus>().is_err());
    }
}
