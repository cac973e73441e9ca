//! User roles issued by the authentication subsystem

use serde::{Deserialize, Serialize};

/// Role carried alongside the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Parent,
    Admin,
}

impl Role {
    /// Evaluation endpoints (feedback listings, comparison feedback) are
    /// reserved for teachers and admins.
    pub fn can_review_feedback(self) -> bool {
        matches!(self, Self::Teacher | Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_permission() {
        assert!(Role::Teacher.can_review_feedback());
        assert!(Role::Admin.can_review_feedback());
        assert!(!Role::Student.can_review_feedback());
        assert!(!Role::Parent.can_review_feedback());
    }

    #[test]
    fn test_parse() {
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert!("guest".parse::<Role>().is_err());
    }
}
