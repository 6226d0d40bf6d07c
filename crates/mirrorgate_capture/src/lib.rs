pub mod backend;
pub mod camera;
pub mod model;
pub mod render_target;
pub mod resolution;
pub mod settings;

pub use backend::{CaptureBackend, CaptureRecord, CaptureRequest, CaptureUniform, RecordingBackend};
pub use camera::{CameraType, FrameOutcome, PortalCamera};
pub use model::{CaptureContext, CaptureModel, SnellModel, ViewSolution};
pub use render_target::{RenderTarget, RenderTargetSlot};
pub use resolution::{calculate_render_size, FrameContext};
pub use settings::{CaptureSettings, SettingsError};
