//! Key and translation editing on a single branch.

use glossa_store::{StoreError, StoreTx};
use glossa_types::{validate_language, BranchId, KeyId, KeyIdentity, KeyRecord, LanguageValues, UserId};
use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::error::{GlossaError, GlossaResult};
use crate::events::BranchEvent;
use crate::glossa::Glossa;

/// A key with its translations, as listed for a branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntry {
    pub id: KeyId,
    #[serde(flatten)]
    pub identity: KeyIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub values: LanguageValues,
}

impl Glossa {
    /// All keys of a branch, sorted by identity.
    pub fn keys(&self, user: &UserId, branch: BranchId) -> GlossaResult<Vec<KeyEntry>> {
        self.require_for_branch(user, branch, Role::ANY)?;
        let content = self.store.read_tx(|tx| tx.load_content(branch))?;
        Ok(content
            .keys
            .into_iter()
            .map(|(identity, key)| KeyEntry {
                id: key.key_id,
                identity,
                description: key.description,
                values: key.values,
            })
            .collect())
    }

    /// Create a key, or update its description if it already exists.
    pub fn upsert_key(
        &self,
        user: &UserId,
        branch: BranchId,
        identity: &KeyIdentity,
        description: Option<&str>,
    ) -> GlossaResult<KeyRecord> {
        self.require_for_branch(user, branch, Role::EDITORS)?;
        let key = self.store.write_tx(|tx| {
            let mut key = find_or_insert_key(tx, branch, identity)?;
            tx.update_key_description(key.id, description)?;
            key.description = description.map(str::to_string);
            Ok::<_, GlossaError>(key)
        })?;
        self.key_changed(branch, identity);
        Ok(key)
    }

    /// Set one translation, creating the key if needed.
    pub fn set_translation(
        &self,
        user: &UserId,
        branch: BranchId,
        identity: &KeyIdentity,
        language: &str,
        value: &str,
    ) -> GlossaResult<KeyRecord> {
        validate_language(language)?;
        self.require_for_branch(user, branch, Role::EDITORS)?;
        let key = self.store.write_tx(|tx| {
            let key = find_or_insert_key(tx, branch, identity)?;
            let values = LanguageValues::from([(language.to_string(), value.to_string())]);
            tx.upsert_translations(key.id, &values)?;
            Ok::<_, GlossaError>(key)
        })?;
        tracing::debug!(%branch, key = %identity, language, "translation set");
        self.key_changed(branch, identity);
        Ok(key)
    }

    /// Remove one translation. Returns `false` if it did not exist.
    pub fn remove_translation(
        &self,
        user: &UserId,
        branch: BranchId,
        identity: &KeyIdentity,
        language: &str,
    ) -> GlossaResult<bool> {
        self.require_for_branch(user, branch, Role::EDITORS)?;
        let removed = self.store.write_tx(|tx| {
            let key = tx
                .find_key(branch, identity)?
                .ok_or_else(|| GlossaError::NotFound(format!("key not found: {identity}")))?;
            Ok::<_, GlossaError>(tx.delete_translations(key.id, [language])? > 0)
        })?;
        if removed {
            self.key_changed(branch, identity);
        }
        Ok(removed)
    }

    pub fn delete_key(
        &self,
        user: &UserId,
        branch: BranchId,
        identity: &KeyIdentity,
    ) -> GlossaResult<()> {
        self.require_for_branch(user, branch, Role::EDITORS)?;
        self.store.write_tx(|tx| {
            let key = tx
                .find_key(branch, identity)?
                .ok_or_else(|| GlossaError::NotFound(format!("key not found: {identity}")))?;
            tx.delete_key(key.id)?;
            Ok::<_, GlossaError>(())
        })?;
        self.events.publish(&BranchEvent::KeyDeleted {
            branch_id: branch,
            key: identity.clone(),
        });
        Ok(())
    }

    fn key_changed(&self, branch: BranchId, identity: &KeyIdentity) {
        self.events.publish(&BranchEvent::KeyChanged {
            branch_id: branch,
            key: identity.clone(),
        });
    }
}

fn find_or_insert_key(
    tx: &StoreTx<'_>,
    branch: BranchId,
    identity: &KeyIdentity,
) -> Result<KeyRecord, StoreError> {
    if let Some(key) = tx.find_key(branch, identity)? {
        return Ok(key);
    }
    let key = KeyRecord {
        id: KeyId::new(),
        branch_id: branch,
        identity: identity.clone(),
        description: None,
    };
    tx.insert_key(&key)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glossa_store::SqliteStore;
    use glossa_types::ProjectId;

    use super::*;
    use crate::error::ErrorClass;

    fn setup() -> (Glossa, UserId, BranchId) {
        let glossa = Glossa::builder(Arc::new(SqliteStore::open_in_memory().unwrap())).build();
        let user = UserId::new("olivia");
        let (_, main) = glossa
            .create_space(&user, &ProjectId::new("acme"), "Web", None)
            .unwrap();
        (glossa, user, main.id)
    }

    #[test]
    fn set_translation_creates_key_once() {
        let (glossa, user, main) = setup();
        let key = KeyIdentity::new(Some("nav"), "home").unwrap();

        let first = glossa.set_translation(&user, main, &key, "en", "Home").unwrap();
        let second = glossa.set_translation(&user, main, &key, "fr", "Accueil").unwrap();
        assert_eq!(first.id, second.id);

        let keys = glossa.keys(&user, main).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].values.len(), 2);
    }

    #[test]
    fn upsert_key_sets_description() {
        let (glossa, user, main) = setup();
        let key = KeyIdentity::new(None, "cta").unwrap();

        glossa.upsert_key(&user, main, &key, Some("Button")).unwrap();
        let updated = glossa.upsert_key(&user, main, &key, Some("Checkout button")).unwrap();
        assert_eq!(updated.description.as_deref(), Some("Checkout button"));

        let keys = glossa.keys(&user, main).unwrap();
        assert_eq!(keys[0].description.as_deref(), Some("Checkout button"));
        assert!(keys[0].values.is_empty());
    }

    #[test]
    fn remove_and_delete() {
        let (glossa, user, main) = setup();
        let key = KeyIdentity::new(None, "title").unwrap();
        glossa.set_translation(&user, main, &key, "en", "Title").unwrap();

        assert!(glossa.remove_translation(&user, main, &key, "en").unwrap());
        assert!(!glossa.remove_translation(&user, main, &key, "en").unwrap());

        glossa.delete_key(&user, main, &key).unwrap();
        assert!(glossa.keys(&user, main).unwrap().is_empty());
        assert_eq!(
            glossa.delete_key(&user, main, &key).unwrap_err().class(),
            ErrorClass::NotFound
        );
    }

    #[test]
    fn bad_language_is_validation() {
        let (glossa, user, main) = setup();
        let key = KeyIdentity::new(None, "title").unwrap();
        let err = glossa
            .set_translation(&user, main, &key, "", "x")
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Validation);
    }

    #[test]
    fn key_entry_json_shape() {
        let (glossa, user, main) = setup();
        let key = KeyIdentity::new(Some("nav"), "home").unwrap();
        glossa.set_translation(&user, main, &key, "en", "Home").unwrap();

        let json = serde_json::to_value(glossa.keys(&user, main).unwrap()).unwrap();
        assert_eq!(json[0]["namespace"], "nav");
        assert_eq!(json[0]["values"]["en"], "Home");
        assert!(json[0].get("description").is_none());
    }
}
