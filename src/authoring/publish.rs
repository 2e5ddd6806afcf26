use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::composite::compositor::CompositeImage;
use crate::foundation::error::{PopError, PopResult};
use crate::frame::spec::FrameSpec;
use crate::mapping::viewport::Placement;
use crate::session::platform::VideoAsset;
use crate::target::compiler::CompiledTarget;

pub const PNG_MIME: &str = "image/png";
pub const TARGET_MIME: &str = "application/octet-stream";

/// Blob storage capability.
pub trait AssetStore {
    fn upload_asset(&self, bytes: &[u8], mime: &str) -> PopResult<String>;
    fn fetch_asset(&self, url: &str) -> PopResult<Vec<u8>>;
}

/// Campaign record storage capability.
pub trait CampaignStore {
    fn get_campaign(&self, id: &str) -> PopResult<Campaign>;
    fn update_campaign(&self, id: &str, patch: &CampaignPatch) -> PopResult<Campaign>;
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub video_url: Option<String>,
    pub composite_url: Option<String>,
    pub target_url: Option<String>,
    /// Fingerprint of the composite the stored target was compiled from.
    pub target_fingerprint: Option<u64>,
    pub frame: Option<FrameSpec>,
    pub placement: Option<Placement>,
}

/// Fields to overwrite; `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CampaignPatch {
    pub video_url: Option<String>,
    pub composite_url: Option<String>,
    pub target_url: Option<String>,
    pub target_fingerprint: Option<u64>,
    pub frame: Option<FrameSpec>,
    pub placement: Option<Placement>,
}

impl Campaign {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, patch: &CampaignPatch) {
        fn set<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }
        set(&mut self.video_url, &patch.video_url);
        set(&mut self.composite_url, &patch.composite_url);
        set(&mut self.target_url, &patch.target_url);
        set(&mut self.target_fingerprint, &patch.target_fingerprint);
        set(&mut self.frame, &patch.frame);
        set(&mut self.placement, &patch.placement);
    }
}

#[derive(Clone, Debug)]
struct StoredAsset {
    mime: String,
    bytes: Arc<[u8]>,
}

/// Process-local asset store handing out `mem://` URLs.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: Mutex<BTreeMap<String, StoredAsset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mime_of(&self, url: &str) -> Option<String> {
        self.assets.lock().get(url).map(|a| a.mime.clone())
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetStore for MemoryAssetStore {
    fn upload_asset(&self, bytes: &[u8], mime: &str) -> PopResult<String> {
        let mut assets = self.assets.lock();
        let url = format!("mem://asset/{}", assets.len());
        assets.insert(
            url.clone(),
            StoredAsset {
                mime: mime.to_string(),
                bytes: Arc::from(bytes),
            },
        );
        Ok(url)
    }

    fn fetch_asset(&self, url: &str) -> PopResult<Vec<u8>> {
        self.assets
            .lock()
            .get(url)
            .map(|a| a.bytes.to_vec())
            .ok_or_else(|| PopError::asset_load(format!("no asset at {url}")))
    }
}

#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    campaigns: Mutex<BTreeMap<String, Campaign>>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, campaign: Campaign) {
        self.campaigns.lock().insert(campaign.id.clone(), campaign);
    }
}

impl CampaignStore for MemoryCampaignStore {
    fn get_campaign(&self, id: &str) -> PopResult<Campaign> {
        self.campaigns
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| PopError::asset_load(format!("campaign '{id}' not found")))
    }

    fn update_campaign(&self, id: &str, patch: &CampaignPatch) -> PopResult<Campaign> {
        let mut campaigns = self.campaigns.lock();
        let campaign = campaigns
            .get_mut(id)
            .ok_or_else(|| PopError::asset_load(format!("campaign '{id}' not found")))?;
        campaign.apply(patch);
        Ok(campaign.clone())
    }
}

/// Upload the composite and its target and record them on the campaign.
#[tracing::instrument(skip(assets, campaigns, composite, target, frame, placement))]
pub fn publish_design(
    assets: &dyn AssetStore,
    campaigns: &dyn CampaignStore,
    campaign_id: &str,
    composite: &CompositeImage,
    target: &CompiledTarget,
    frame: &FrameSpec,
    placement: &Placement,
) -> PopResult<Campaign> {
    if !target.matches(composite) {
        return Err(PopError::validation(
            "compiled target does not belong to this composite",
        ));
    }
    campaigns.get_campaign(campaign_id)?;

    let png = composite.encode_png()?;
    let composite_url = assets.upload_asset(&png, PNG_MIME)?;
    let target_url = assets.upload_asset(target.bytes(), TARGET_MIME)?;
    tracing::info!(%composite_url, %target_url, "design uploaded");

    campaigns.update_campaign(
        campaign_id,
        &CampaignPatch {
            composite_url: Some(composite_url),
            target_url: Some(target_url),
            target_fingerprint: Some(target.source_fingerprint()),
            frame: Some(frame.clone()),
            placement: Some(*placement),
            ..CampaignPatch::default()
        },
    )
}

/// What a scanning client needs to start an overlay session.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanTarget {
    pub target: CompiledTarget,
    pub video: VideoAsset,
}

/// Fetch the published target and video for a campaign.
pub fn load_scan_target(
    assets: &dyn AssetStore,
    campaigns: &dyn CampaignStore,
    campaign_id: &str,
) -> PopResult<ScanTarget> {
    let campaign = campaigns.get_campaign(campaign_id)?;
    let target_url = campaign.target_url.as_deref().ok_or_else(|| {
        PopError::asset_load(format!("campaign '{campaign_id}' has no published target"))
    })?;
    let video_url = campaign.video_url.clone().ok_or_else(|| {
        PopError::asset_load(format!("campaign '{campaign_id}' has no video"))
    })?;

    let bytes = assets.fetch_asset(target_url)?;
    if bytes.is_empty() {
        return Err(PopError::asset_load(format!("target at {target_url} is empty")));
    }
    Ok(ScanTarget {
        target: CompiledTarget::new(bytes, campaign.target_fingerprint.unwrap_or_default()),
        video: VideoAsset::new(video_url),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/authoring/publish.rs"]
mod tests;
