use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a registered identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityRole {
    Human,
    Agent,
}

impl IdentityRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityRole::Human => "human",
            IdentityRole::Agent => "agent",
        }
    }
}

impl fmt::Display for IdentityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role '{0}': must be 'human' or 'agent'")]
pub struct UnknownRole(pub String);

impl FromStr for IdentityRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(IdentityRole::Human),
            "agent" => Ok(IdentityRole::Agent),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("agent".parse::<IdentityRole>().unwrap(), IdentityRole::Agent);
        assert_eq!(IdentityRole::Human.to_string(), "human");
        assert!("robot".parse::<IdentityRole>().is_err());
    }

    #[test]
    fn yaml_form_is_lowercase() {
        let yaml = serde_yaml::to_string(&IdentityRole::Agent).unwrap();
        assert_eq!(yaml.trim(), "agent");
    }
}
