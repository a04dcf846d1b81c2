use thiserror::Error;

/// Failure taxonomy of the renderer and device layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("failed to initialize renderer: {0}")]
    InitFailed(String),

    #[error("device lost; re-initialize to continue")]
    DeviceLost,

    #[error("GPU memory exhausted")]
    OutOfMemory,

    #[error("surface error: {0}")]
    SurfaceError(String),

    #[error("pipeline setup failed: {0}")]
    PipelineSetup(String),

    #[error("device is not ready")]
    DeviceNotReady,

    #[error("invalid frame: {0}")]
    InvalidFrame(&'static str),
}

/// How the frame loop should react to an error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorClass {
    /// Stop: the renderer cannot continue on this surface.
    Unrecoverable,
    /// Skip the frame and retry (re-initializing after device loss).
    Transient,
    /// Keep going with reduced output.
    Degraded,
}

impl RenderError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RenderError::InitFailed(_) | RenderError::PipelineSetup(_) => ErrorClass::Unrecoverable,
            RenderError::DeviceLost | RenderError::OutOfMemory | RenderError::SurfaceError(_) => {
                ErrorClass::Transient
            }
            RenderError::DeviceNotReady | RenderError::InvalidFrame(_) => ErrorClass::Degraded,
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Unrecoverable
    }
}
