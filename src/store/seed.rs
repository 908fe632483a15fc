//! Demo catalog loaded into the in-memory store at startup.

use log::info;

use crate::api::error;
use crate::modules::{
    asset::{model::CreateAssetModel, schema::AssetMetadata, service::AssetService},
    folder::service::FolderService,
    taxonomy::service::TaxonomyService,
};

struct DemoAsset {
    name: &'static str,
    mime_type: &'static str,
    size: i64,
    folder: usize,
    tags: &'static [&'static str],
    description: &'static str,
    values: &'static [usize],
}

const DEMO_ASSETS: &[DemoAsset] = &[
    DemoAsset {
        name: "Logo Blue.png",
        mime_type: "image/png",
        size: 48_213,
        folder: 1,
        tags: &["logo", "brand"],
        description: "Primary logo on blue",
        values: &[0],
    },
    DemoAsset {
        name: "Summer Campaign Hero.jpg",
        mime_type: "image/jpeg",
        size: 1_204_551,
        folder: 2,
        tags: &["campaign", "summer"],
        description: "Hero banner for the summer social push",
        values: &[0, 2],
    },
    DemoAsset {
        name: "Q3 Report.pdf",
        mime_type: "application/pdf",
        size: 392_004,
        folder: 3,
        tags: &["report"],
        description: "Quarterly sales figures",
        values: &[1],
    },
    DemoAsset {
        name: "Product Teaser.mp4",
        mime_type: "video/mp4",
        size: 18_772_310,
        folder: 2,
        tags: &["campaign", "video"],
        description: "30 second teaser",
        values: &[2],
    },
    DemoAsset {
        name: "Jingle.mp3",
        mime_type: "audio/mpeg",
        size: 2_140_882,
        folder: 0,
        tags: &["brand", "audio"],
        description: "Brand jingle",
        values: &[],
    },
];

pub async fn populate(
    folders: &FolderService,
    taxonomy: &TaxonomyService,
    assets: &AssetService,
) -> Result<(), error::SystemError> {
    let marketing = folders.create("marketing".into(), None).await?;
    let brand = folders.create("brand".into(), Some(marketing.id)).await?;
    let social = folders.create("social".into(), Some(marketing.id)).await?;
    let sales = folders.create("sales".into(), None).await?;
    let folder_ids = [marketing.id, brand.id, social.id, sales.id];

    let region = taxonomy.create_filter_category("Region".into()).await?;
    let channel = taxonomy.create_filter_category("Channel".into()).await?;
    let values = [
        taxonomy.create_filter_value(region.id, "EMEA".into()).await?,
        taxonomy.create_filter_value(region.id, "APAC".into()).await?,
        taxonomy.create_filter_value(channel.id, "Social".into()).await?,
    ];

    for name in ["logo", "brand", "campaign", "summer", "report", "video", "audio"] {
        let category_ids = match name {
            "campaign" | "summer" => vec![channel.id],
            _ => vec![region.id],
        };
        taxonomy.create_tag(name.into(), category_ids).await?;
    }

    for demo in DEMO_ASSETS {
        let asset = assets
            .create(
                CreateAssetModel {
                    name: demo.name.to_string(),
                    file_url: format!("/uploads/demo/{}", demo.name.replace(' ', "-").to_lowercase()),
                    file_size: demo.size,
                    mime_type: demo.mime_type.to_string(),
                    thumbnail_url: None,
                    folder_id: Some(folder_ids[demo.folder]),
                    tags: demo.tags.iter().map(|t| t.to_string()).collect(),
                    metadata: AssetMetadata {
                        description: Some(demo.description.to_string()),
                        author: Some("Demo Studio".to_string()),
                        ..AssetMetadata::default()
                    },
                },
                "seed",
            )
            .await?;
        if !demo.values.is_empty() {
            let value_ids = demo.values.iter().map(|i| values[*i].id).collect();
            assets.assign_filter_values(asset.id, value_ids).await?;
        }
    }

    info!("Demo catalog seeded with {} assets", DEMO_ASSETS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test::{asset_service, folder_service, taxonomy_service};

    #[tokio::test]
    async fn seed_builds_consistent_catalog() {
        let store = MemoryStore::new();
        let (folders, taxonomy, assets) =
            (folder_service(&store), taxonomy_service(&store), asset_service(&store));

        populate(&folders, &taxonomy, &assets).await.unwrap();

        let all = assets.all().await.unwrap();
        assert_eq!(all.len(), DEMO_ASSETS.len());
        let hero = all.iter().find(|a| a.name.starts_with("Summer")).unwrap();
        assert_eq!(hero.folder, "/marketing/social");
        assert_eq!(hero.filter_assignments.len(), 2);
        assert_eq!(taxonomy.list_tags().await.unwrap().len(), 7);
    }
}
