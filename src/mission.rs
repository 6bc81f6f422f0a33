//! Finishing a mission: the seam between the collage engine and the backend.
//!
//! The engine itself never touches storage. A [`MissionBackend`] supplies the
//! submitted photos and stores the result; [`finalize_mission`] wires the two
//! together and guarantees the mission is marked complete even when no
//! collage could be produced.

use crate::compositor::Compositor;
use crate::error::CollageResult;
use crate::request::{CompositionRequest, Photo};

/// Caption data for one mission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionInfo {
    pub mission_id: String,
    pub keyword: String,
    pub emoji: String,
    /// Pre-formatted display date.
    pub date: String,
    pub group_name: String,
}

impl MissionInfo {
    /// Builds the composition request for these captions and photos.
    pub fn request(&self, photos: Vec<Photo>) -> CompositionRequest {
        CompositionRequest::new(&*self.keyword, &*self.emoji, &*self.date, &*self.group_name)
            .with_photos(photos)
    }
}

/// Storage operations the surrounding application provides.
pub trait MissionBackend {
    /// Loads every submitted photo for the mission, in display order.
    fn fetch_photos(&self, mission_id: &str) -> CollageResult<Vec<Photo>>;

    /// Persists the encoded collage and returns where it can be fetched.
    fn store_result(&self, mission_id: &str, collage: &[u8]) -> CollageResult<String>;

    /// Marks the mission complete, with the collage location if there is one.
    fn mark_completed(&self, mission_id: &str, collage_url: Option<&str>) -> CollageResult<()>;
}

/// Composes and stores the collage for a mission whose members all submitted.
///
/// Failures while fetching, composing or storing are logged and the mission
/// is still marked complete without a collage. Only a failure of
/// [`MissionBackend::mark_completed`] itself is returned.
#[tracing::instrument(skip_all, fields(mission = %mission.mission_id))]
pub fn finalize_mission<B>(
    backend: &B,
    compositor: &Compositor,
    mission: &MissionInfo,
) -> CollageResult<Option<String>>
where
    B: MissionBackend + ?Sized,
{
    let collage_url = match build_collage(backend, compositor, mission) {
        Ok(url) => Some(url),
        Err(error) => {
            tracing::error!(%error, "collage generation failed; completing mission without it");
            None
        }
    };

    backend.mark_completed(&mission.mission_id, collage_url.as_deref())?;
    Ok(collage_url)
}

fn build_collage<B>(backend: &B, compositor: &Compositor, mission: &MissionInfo) -> CollageResult<String>
where
    B: MissionBackend + ?Sized,
{
    let photos = backend.fetch_photos(&mission.mission_id)?;
    let collage = compositor.compose(&mission.request(photos))?;
    backend.store_result(&mission.mission_id, &collage)
}

// ============================================================================
// Tests
// ============================================================================
