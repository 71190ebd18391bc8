mod backends;
mod detector;

#[cfg(feature = "backend-tract")]
pub use backends::OnnxDetector;
pub use backends::{FrameScript, ScriptedDetector};
pub use detector::{Detection, Detector};
