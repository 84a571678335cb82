//! Already-built [`VideoSet`] / [`Video`] values.

use crate::{
    adapters::ProgrammaticSource,
    foundation::error::ReelResult,
    scene::model::{DEFAULT_MAX_DURATION, DEFAULT_MIN_DURATION, VideoSet},
};

/// Normalize a programmatic value into a validated [`VideoSet`].
///
/// Set-level duration defaults replace a scene's durations only where the scene still carries
/// the built-in defaults.
pub fn from_value(source: ProgrammaticSource) -> ReelResult<VideoSet> {
    let mut set = match source {
        ProgrammaticSource::Set(set) => set,
        ProgrammaticSource::Video(video) => VideoSet::single(video),
    };

    let defaults = set.defaults.clone();
    for scene in set.videos.iter_mut().flat_map(|v| v.scenes.iter_mut()) {
        if let Some(min) = defaults.min_duration
            && scene.min_duration == DEFAULT_MIN_DURATION
        {
            scene.min_duration = min;
        }
        if let Some(max) = defaults.max_duration
            && scene.max_duration == DEFAULT_MAX_DURATION
        {
            scene.max_duration = max;
        }
    }
    set.validate()?;
    tracing::debug!(set = %set.set_id, videos = set.videos.len(), "programmatic input");
    Ok(set)
}
