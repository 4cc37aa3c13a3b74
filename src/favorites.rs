//! Favorites gallery workflow

use chrono::Utc;
use log::info;

use crate::error::StorageError;
use crate::ids::new_record_id;
use crate::models::{DesignFields, DesignParameters, FavoriteRecord, GeneratedArtifact};
use crate::store::CollectionStore;

/// Result of saving an artifact to favorites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new record was prepended to the gallery.
    Saved {
        record: FavoriteRecord,
        favorites: Vec<FavoriteRecord>,
    },
    /// The same image is already in the gallery; nothing was written.
    AlreadySaved { favorites: Vec<FavoriteRecord> },
}

impl SaveOutcome {
    pub fn favorites(&self) -> &[FavoriteRecord] {
        match self {
            SaveOutcome::Saved { favorites, .. } | SaveOutcome::AlreadySaved { favorites } => {
                favorites
            }
        }
    }
}

/// True iff `favorites` holds a record with the artifact's image data.
pub fn is_favorited(artifact: &GeneratedArtifact, favorites: &[FavoriteRecord]) -> bool {
    favorites
        .iter()
        .any(|record| record.design.image_data == artifact.image_data)
}

/// Adds, lists and removes favorites.
#[derive(Clone)]
pub struct FavoritesWorkflow {
    store: CollectionStore<FavoriteRecord>,
}

impl FavoritesWorkflow {
    pub fn new(store: CollectionStore<FavoriteRecord>) -> Self {
        Self { store }
    }

    /// Favorites, newest first
    pub fn list(&self) -> Vec<FavoriteRecord> {
        self.store.read()
    }

    pub fn find(&self, id: &str) -> Option<FavoriteRecord> {
        self.store.read().into_iter().find(|record| record.id == id)
    }

    pub fn contains(&self, artifact: &GeneratedArtifact) -> bool {
        is_favorited(artifact, &self.store.read())
    }

    /// Saves `artifact` with the parameters that produced it, unless its image is already saved.
    pub fn save(
        &self,
        artifact: &GeneratedArtifact,
        params: &DesignParameters,
    ) -> Result<SaveOutcome, StorageError> {
        let favorites = self.store.read();
        if is_favorited(artifact, &favorites) {
            info!("[save_favorite] Image already in favorites");
            return Ok(SaveOutcome::AlreadySaved { favorites });
        }

        let record = FavoriteRecord {
            id: new_record_id(),
            design: DesignFields::from_artifact(artifact, params),
            created_at: Utc::now(),
        };

        let favorites = self.store.append(record.clone())?;
        info!("[save_favorite] Saved favorite {}", record.id);

        Ok(SaveOutcome::Saved { record, favorites })
    }

    /// Removes the favorite with `id`; returns the remaining favorites.
    pub fn remove(&self, id: &str) -> Result<Vec<FavoriteRecord>, StorageError> {
        let favorites = self.store.remove_where(|record| record.id == id)?;
        info!("[remove_favorite] Removed {} ({} left)", id, favorites.len());
        Ok(favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryKeyValueStore;
    use crate::store::favorites_store;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn workflow() -> FavoritesWorkflow {
        FavoritesWorkflow::new(favorites_store(Arc::new(MemoryKeyValueStore::new())))
    }

    fn artifact(payload: &str) -> GeneratedArtifact {
        GeneratedArtifact {
            image_data: format!("data:image/png;base64,{}", payload),
            prompt: "A stunning piece of jewelry".to_string(),
        }
    }

    #[test]
    fn save_then_query() {
        let favorites = workflow();
        let art = artifact("AAAA");
        assert!(!favorites.contains(&art));

        let outcome = favorites.save(&art, &DesignParameters::default()).unwrap();
        assert_matches!(outcome, SaveOutcome::Saved { .. });
        assert!(favorites.contains(&art));
    }

    #[test]
    fn save_is_deduplicated_by_image() {
        let favorites = workflow();
        let art = artifact("AAAA");
        favorites.save(&artifact("BBBB"), &DesignParameters::default()).unwrap();

        favorites.save(&art, &DesignParameters::default()).unwrap();
        let second = favorites.save(&art, &DesignParameters::default()).unwrap();

        assert_matches!(second, SaveOutcome::AlreadySaved { .. });
        assert_eq!(second.favorites().len(), 2);
        assert_eq!(favorites.list().len(), 2);
    }

    #[test]
    fn saved_record_carries_design_fields() {
        let favorites = workflow();
        let params = DesignParameters::default();

        let record = match favorites.save(&artifact("CCCC"), &params).unwrap() {
            SaveOutcome::Saved { record, .. } => record,
            other => panic!("expected Saved, got {:?}", other),
        };

        assert_eq!(record.design.details, "elegant engraved design");
        assert_eq!(record.design.weight_grams, 10);
        assert_eq!(record.design.prompt, "A stunning piece of jewelry");
        assert_eq!(favorites.find(&record.id), Some(record));
    }

    #[test]
    fn newest_first() {
        let favorites = workflow();
        favorites.save(&artifact("AAAA"), &DesignParameters::default()).unwrap();
        favorites.save(&artifact("BBBB"), &DesignParameters::default()).unwrap();

        let list = favorites.list();
        assert_eq!(list[0].design.image_data, "data:image/png;base64,BBBB");
        assert_eq!(list[1].design.image_data, "data:image/png;base64,AAAA");
    }

    #[test]
    fn remove_clears_favorited_state() {
        let favorites = workflow();
        let art = artifact("AAAA");
        let id = match favorites.save(&art, &DesignParameters::default()).unwrap() {
            SaveOutcome::Saved { record, .. } => record.id,
            other => panic!("expected Saved, got {:?}", other),
        };

        let remaining = favorites.remove(&id).unwrap();
        assert!(remaining.is_empty());
        assert!(!favorites.contains(&art));
    }

    #[test]
    fn remove_unknown_id_keeps_collection() {
        let favorites = workflow();
        favorites.save(&artifact("AAAA"), &DesignParameters::default()).unwrap();
        assert_eq!(favorites.remove("missing").unwrap().len(), 1);
    }
}
