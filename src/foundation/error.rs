pub type AdsmithResult<T> = Result<T, AdsmithError>;

#[derive(thiserror::Error, Debug)]
pub enum AdsmithError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error(
        "insufficient master size: target {target_w}x{target_h} needs more extent than master {master_w}x{master_h}"
    )]
    InsufficientMasterSize {
        target_w: u32,
        target_h: u32,
        master_w: u32,
        master_h: u32,
    },

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdsmithError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn insufficient_master(target: (u32, u32), master: (u32, u32)) -> Self {
        Self::InsufficientMasterSize {
            target_w: target.0,
            target_h: target.1,
            master_w: master.0,
            master_h: master.1,
        }
    }
}
