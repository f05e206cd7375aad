/// Configuration errors raised while building the controllers.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("camera has no follow target")]
    MissingFollowTarget,

    #[error("camera has no head anchor for first-person mode")]
    MissingHeadAnchor,

    #[error("movement controller has no motion indicator")]
    MissingMotionIndicator,

    #[error("invalid attribute profile: {0}")]
    InvalidProfile(String),

    #[error("failed to parse attribute profile: {0}")]
    Parse(#[from] serde_json::Error),
}
