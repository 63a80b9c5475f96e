use gauntlet_core::{AssetCatalog, GameError};
use thiserror::Error;

const DEFAULT_CATALOG: &str = include_str!("../assets.toml");

#[derive(Error, Debug)]
pub(crate) enum CatalogError {
    #[error("could not parse asset catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] GameError),
}

pub(crate) fn parse_catalog(source: &str) -> Result<AssetCatalog, CatalogError> {
    let catalog: AssetCatalog = toml::from_str(source)?;
    catalog.validate()?;
    Ok(catalog)
}

/// The catalog bundled with the app.
pub(crate) fn default_catalog() -> Result<AssetCatalog, CatalogError> {
    let catalog = parse_catalog(DEFAULT_CATALOG)?;
    log::debug!(
        "asset catalog: {} card faces, {} distractions, {} mine art",
        catalog.card_faces.len(),
        catalog.distraction_videos.len(),
        catalog.mine_art.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_is_valid() {
        let catalog = default_catalog().unwrap();
        assert_eq!(catalog.card_faces.len(), 6);
        assert_eq!(catalog.mine_art_count(), 7);
        assert!(catalog.explosion_video.is_some());
    }

    #[test]
    fn bundled_catalog_deals_a_memory_board() {
        use gauntlet_core::{MemoryEngine, MemoryRules};
        use rand::SeedableRng;
        use rand::rngs::SmallRng;

        let catalog = default_catalog().unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let engine = MemoryEngine::new(&catalog, 3, MemoryRules::default(), &mut rng).unwrap();

        assert_eq!(engine.pair_count(), 6);
        assert_eq!(engine.cards().len(), 12);
    }

    #[test]
    fn missing_lists_are_reported() {
        let err = parse_catalog("mismatch_videos = [\"/a.mp4\"]").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Invalid(GameError::EmptyCatalog("card faces"))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            parse_catalog("card_faces = 3"),
            Err(CatalogError::Parse(_))
        ));
    }
}
