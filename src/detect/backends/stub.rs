use anyhow::{bail, Result};

use crate::detect::detector::{Detection, Detector};

/// What a scripted detector does on one call.
#[derive(Clone, Debug)]
pub enum FrameScript {
    /// Return these detections.
    Detections(Vec<Detection>),
    /// Fail the call with this message.
    Fail(String),
}

/// Scripted detector for tests and the demo binary.
///
/// Plays back a fixed per-call script in order; calls past the end of the
/// script return no detections. The script is the whole behavior: there is no
/// pixel inspection, so any frame content drives deterministic output.
pub struct ScriptedDetector {
    name: &'static str,
    script: Vec<FrameScript>,
    cursor: usize,
}

impl ScriptedDetector {
    pub fn new(name: &'static str, script: Vec<FrameScript>) -> Self {
        Self {
            name,
            script,
            cursor: 0,
        }
    }

    /// Detector that never detects anything.
    pub fn empty(name: &'static str) -> Self {
        Self::new(name, Vec::new())
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.cursor
    }
}

impl Detector for ScriptedDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>> {
        let step = self.script.get(self.cursor).cloned();
        self.cursor += 1;
        match step {
            Some(FrameScript::Detections(dets)) => Ok(dets),
            Some(FrameScript::Fail(msg)) => bail!("{}", msg),
            None => Ok(Vec::new()),
        }
    }
}
