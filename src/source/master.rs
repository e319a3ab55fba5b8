use crate::catalog::id::sanitize_component;
use crate::foundation::core::Raster;
use crate::foundation::error::{AdsmithError, AdsmithResult};

/// Parameters handed to a master-image synthesis backend.
///
/// `seed` is the only controlled randomness crossing this boundary: the same request must
/// reproduce the same master.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MasterRequest {
    /// Positive prompt.
    pub prompt: String,
    /// Negative prompt.
    #[serde(default)]
    pub negative_prompt: String,
    /// Generation seed.
    pub seed: u64,
    /// Inference steps.
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Classifier-free guidance scale.
    #[serde(default = "default_guidance")]
    pub guidance: f32,
    /// Edge length of the square master.
    #[serde(default = "default_resolution")]
    pub resolution: u32,
}

fn default_steps() -> u32 {
    75
}

fn default_guidance() -> f32 {
    7.5
}

fn default_resolution() -> u32 {
    1024
}

impl MasterRequest {
    /// Request with default steps, guidance and resolution.
    pub fn new(prompt: impl Into<String>, seed: u64) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            seed,
            steps: default_steps(),
            guidance: default_guidance(),
            resolution: default_resolution(),
        }
    }

    /// Stable source id: sanitized prompt prefix plus seed.
    pub fn source_id(&self) -> String {
        let prefix: String = self.prompt.chars().take(50).collect();
        let slug = sanitize_component(&prefix);
        if slug.is_empty() {
            format!("seed{}", self.seed)
        } else {
            format!("{slug}_seed{}", self.seed)
        }
    }

    pub(crate) fn validate(&self) -> AdsmithResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(AdsmithError::validation("master prompt must be non-empty"));
        }
        if self.steps == 0 {
            return Err(AdsmithError::validation("master steps must be > 0"));
        }
        if !self.guidance.is_finite() || self.guidance < 0.0 {
            return Err(AdsmithError::validation(
                "master guidance must be finite and >= 0",
            ));
        }
        if self.resolution == 0 {
            return Err(AdsmithError::validation("master resolution must be > 0"));
        }
        Ok(())
    }
}

/// Backend that turns a [`MasterRequest`] into a square raster.
pub trait MasterImageProvider: Send + Sync {
    /// Produce the master raster for `req`.
    fn synthesize(&self, req: &MasterRequest) -> AdsmithResult<Raster>;
}

/// Provider that returns an already-rendered master.
#[derive(Clone, Debug)]
pub struct StaticMasterProvider {
    raster: Raster,
}

impl StaticMasterProvider {
    /// Wrap a pre-rendered raster.
    pub fn new(raster: Raster) -> Self {
        Self { raster }
    }
}

impl MasterImageProvider for StaticMasterProvider {
    fn synthesize(&self, req: &MasterRequest) -> AdsmithResult<Raster> {
        req.validate()?;
        let (w, h) = self.raster.dimensions();
        if w != h || w != req.resolution {
            return Err(AdsmithError::invalid_image(format!(
                "static master is {w}x{h}, request expects {r}x{r}",
                r = req.resolution
            )));
        }
        Ok(self.raster.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/master.rs"]
mod tests;
