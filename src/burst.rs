//! Short render burst after mount.
//!
//! Shadow maps and the multisampled frame settle over the first few renders,
//! so the view renders a fixed number of frames, one per host frame callback,
//! and then goes idle.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StabilizationBurst {
    target: u32,
    frames: u32,
    running: bool,
}

impl StabilizationBurst {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            frames: 0,
            running: false,
        }
    }

    /// Reset the counter and start counting frames.
    pub fn start(&mut self) {
        self.frames = 0;
        self.running = true;
    }

    /// Record one rendered frame. Returns true while another frame should be
    /// scheduled.
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.frames += 1;
        if self.frames >= self.target {
            self.running = false;
            log::debug!("stabilisation burst finished after {} frames", self.frames);
        }
        self.running
    }

    /// Stop without rendering the remaining frames.
    pub fn cancel(&mut self) {
        if self.running {
            log::debug!("stabilisation burst cancelled after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for StabilizationBurst {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_after_target() {
        let mut burst = StabilizationBurst::new(4);
        burst.start();
        assert!(burst.advance());
        assert!(burst.advance());
        assert!(burst.advance());
        assert!(!burst.advance());
        assert!(!burst.advance());
        assert_eq!(burst.frames(), 4);
    }

    #[test]
    fn idle_until_started() {
        let mut burst = StabilizationBurst::default();
        assert!(!burst.advance());
        assert_eq!(burst.frames(), 0);
    }
}
