// SPDX-License-Identifier: AGPL-3.0-or-later

//! Verified identities and the record shape returned by the user store.

/// A verified identity.
///
/// Produced only by successful credential verification and consumed by the
/// claims builder within the same authenticate call. Never persisted by
/// the core.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Opaque unique id, the token `sub` claim.
    pub id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Contact attribute, omitted from tokens when absent.
    pub email: Option<String>,
    /// Role attributes, copied verbatim into the token. The core attaches
    /// no meaning to them; interpretation belongs to the authorization
    /// layer consuming the verified claims.
    pub roles: Vec<String>,
}

impl Principal {
    /// Human-readable display name, `None` when both name parts are blank.
    pub fn display_name(&self) -> Option<String> {
        let name = format!("{} {}", self.given_name.trim(), self.family_name.trim());
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// What the external user-lookup collaborator returns for an identifier.
///
/// The core never inspects `password_hash` beyond handing it to the
/// secret-verification collaborator.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Canonical user id.
    pub id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Contact attribute.
    pub email: Option<String>,
    /// Role attributes.
    pub roles: Vec<String>,
    /// Stored credential hash, opaque bytes owned by the external store.
    pub password_hash: Vec<u8>,
}

impl UserRecord {
    /// Convert into a verified [`Principal`] after the secret check passed.
    pub(crate) fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            given_name: self.given_name,
            family_name: self.family_name,
            email: self.email,
            roles: self.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> UserRecord {
        UserRecord {
            id: "user_alice".to_string(),
            given_name: "Alice".to_string(),
            family_name: "Liddell".to_string(),
            email: Some("alice@example.com".to_string()),
            roles: vec!["client".to_string()],
            password_hash: b"stored-hash".to_vec(),
        }
    }

    #[test]
    fn into_principal_carries_attributes() {
        let principal = sample_record().into_principal();
        assert_eq!(principal.id, "user_alice");
        assert_eq!(principal.email.as_deref(), Some("alice@example.com"));
        assert_eq!(principal.roles, vec!["client".to_string()]);
    }

    #[test]
    fn display_name_joins_parts() {
        let principal = sample_record().into_principal();
        assert_eq!(principal.display_name().as_deref(), Some("Alice Liddell"));
    }

    #[test]
    fn display_name_is_none_when_blank() {
        let mut record = sample_record();
        record.given_name = String::new();
        record.family_name = "  ".to_string();
        assert!(record.into_principal().display_name().is_none());
    }
}
