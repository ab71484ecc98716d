use std::path::PathBuf;

use geoquiz_core::model::MapCatalog;
use services::RegionAssetLoader;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

#[tokio::test]
async fn builtin_maps_have_playable_assets() {
    let loader = RegionAssetLoader::new(workspace_root());
    for entry in MapCatalog::builtin().iter() {
        let regions = loader.load(entry).await.unwrap();
        assert!(
            regions.len() >= 6,
            "{} has only {} regions",
            entry.id(),
            regions.len()
        );
    }
}
