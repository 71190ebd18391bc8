mod stub;
#[cfg(feature = "backend-tract")]
mod tract;

pub use stub::{FrameScript, ScriptedDetector};
#[cfg(feature = "backend-tract")]
pub use tract::OnnxDetector;
