use super::*;
use crate::mapping::viewport::PlacementRect;
use crate::foundation::core::Size;

fn composite() -> CompositeImage {
    CompositeImage::from_image(image::RgbaImage::from_pixel(
        16,
        12,
        image::Rgba([1, 2, 3, 255]),
    ))
}

fn placement() -> Placement {
    Placement {
        rect: PlacementRect::new(1.0, 2.0, 10.0, 10.0),
        natural: Size::new(16, 12).unwrap(),
    }
}

fn stores() -> (MemoryAssetStore, MemoryCampaignStore) {
    let campaigns = MemoryCampaignStore::new();
    let mut c = Campaign::new("c1", "Launch");
    c.video_url = Some("https://cdn.example/launch.mp4".to_string());
    campaigns.insert(c);
    (MemoryAssetStore::new(), campaigns)
}

#[test]
fn publish_uploads_both_assets_and_patches_campaign() {
    let (assets, campaigns) = stores();
    let composite = composite();
    let target = CompiledTarget::new(vec![9u8; 5], composite.fingerprint());

    let c = publish_design(
        &assets,
        &campaigns,
        "c1",
        &composite,
        &target,
        &FrameSpec::default(),
        &placement(),
    )
    .unwrap();

    let png_url = c.composite_url.clone().unwrap();
    let target_url = c.target_url.clone().unwrap();
    assert_eq!(assets.mime_of(&png_url).as_deref(), Some(PNG_MIME));
    assert_eq!(assets.mime_of(&target_url).as_deref(), Some(TARGET_MIME));
    assert_eq!(assets.fetch_asset(&target_url).unwrap(), vec![9u8; 5]);
    assert_eq!(c.target_fingerprint, Some(composite.fingerprint()));
    assert_eq!(c.placement, Some(placement()));
    assert_eq!(campaigns.get_campaign("c1").unwrap(), c);
}

#[test]
fn publish_rejects_mismatched_target() {
    let (assets, campaigns) = stores();
    let target = CompiledTarget::new(vec![1u8], 42);
    let err = publish_design(
        &assets,
        &campaigns,
        "c1",
        &composite(),
        &target,
        &FrameSpec::default(),
        &placement(),
    )
    .unwrap_err();
    assert!(matches!(err, PopError::Validation(_)));
    assert!(assets.is_empty());
}

#[test]
fn scan_target_round_trips_through_stores() {
    let (assets, campaigns) = stores();
    let composite = composite();
    let target = CompiledTarget::new(vec![7u8; 3], composite.fingerprint());
    publish_design(
        &assets,
        &campaigns,
        "c1",
        &composite,
        &target,
        &FrameSpec::default(),
        &placement(),
    )
    .unwrap();

    let scan = load_scan_target(&assets, &campaigns, "c1").unwrap();
    assert_eq!(scan.target, target);
    assert_eq!(scan.video.url, "https://cdn.example/launch.mp4");
}

#[test]
fn missing_pieces_are_asset_load_failures() {
    let (assets, campaigns) = stores();
    assert!(matches!(
        load_scan_target(&assets, &campaigns, "c1"),
        Err(PopError::AssetLoadFailure(_))
    ));
    assert!(matches!(
        load_scan_target(&assets, &campaigns, "nope"),
        Err(PopError::AssetLoadFailure(_))
    ));
    assert!(matches!(
        assets.fetch_asset("mem://asset/99"),
        Err(PopError::AssetLoadFailure(_))
    ));
}

#[test]
fn patch_only_overwrites_present_fields() {
    let mut c = Campaign::new("c2", "Two");
    c.video_url = Some("v".to_string());
    c.apply(&CampaignPatch {
        target_url: Some("t".to_string()),
        ..CampaignPatch::default()
    });
    assert_eq!(c.video_url.as_deref(), Some("v"));
    assert_eq!(c.target_url.as_deref(), Some("t"));
}
