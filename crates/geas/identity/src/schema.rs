use crate::error::{IdentityError, IdentityResult};
use chrono::{DateTime, Utc};
use geas_types::IdentityRole;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A registered signer. `active_key` and `revoked_keys` hold OpenSSH
/// public key text; private material never appears here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub role: IdentityRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub active_key: String,
    #[serde(default)]
    pub revoked_keys: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn human(name: impl Into<String>, active_key: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            role: IdentityRole::Human,
            persona: None,
            model: None,
            active_key: active_key.into(),
            revoked_keys: Vec::new(),
            created_at,
        }
    }

    /// An agent identity; `persona` and `model` are required for agents.
    pub fn agent(
        name: impl Into<String>,
        persona: impl Into<String>,
        model: impl Into<String>,
        active_key: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            role: IdentityRole::Agent,
            persona: Some(persona.into()),
            model: Some(model.into()),
            active_key: active_key.into(),
            revoked_keys: Vec::new(),
            created_at,
        }
    }

    /// Whether `public_key` was retired by a rotation.
    pub fn is_revoked(&self, public_key: &str) -> bool {
        self.revoked_keys.iter().any(|k| k.trim() == public_key.trim())
    }

    pub fn is_active(&self, public_key: &str) -> bool {
        self.active_key.trim() == public_key.trim()
    }

    /// Check the slug, the agent fields and that the active key is not revoked.
    pub fn validate(&self) -> IdentityResult<()> {
        validate_identity_name(&self.name)?;
        if self.role == IdentityRole::Agent {
            let present = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.trim().is_empty());
            if !present(&self.persona) || !present(&self.model) {
                return Err(IdentityError::Validation(format!(
                    "agent '{}' requires persona and model",
                    self.name
                )));
            }
        }
        if self.active_key.trim().is_empty() {
            return Err(IdentityError::Validation(format!("'{}' has no active key", self.name)));
        }
        if self.is_revoked(&self.active_key) {
            return Err(IdentityError::Validation(format!(
                "'{}' active key is listed as revoked",
                self.name
            )));
        }
        Ok(())
    }
}

/// Identity names are lowercase slugs: `[a-z0-9-]+`.
pub fn validate_identity_name(name: &str) -> IdentityResult<()> {
    let ok = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(IdentityError::Validation(format!(
            "name '{name}' must match [a-z0-9-]+"
        )))
    }
}

/// The persisted registry document: `{identities: [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityStore {
    #[serde(default)]
    pub identities: Vec<Identity>,
}

impl IdentityStore {
    pub fn get_by_name(&self, name: &str) -> Option<&Identity> {
        self.identities.iter().find(|i| i.name == name)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut Identity> {
        self.identities.iter_mut().find(|i| i.name == name)
    }

    /// Every entry valid and every name unique.
    pub fn validate(&self) -> IdentityResult<()> {
        let mut seen = HashSet::new();
        for identity in &self.identities {
            identity.validate()?;
            if !seen.insert(identity.name.as_str()) {
                return Err(IdentityError::DuplicateIdentity(identity.name.clone()));
            }
        }
        Ok(())
    }
}
