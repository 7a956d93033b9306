/// Detects released -> pressed transitions of a button.
///
/// Feed it the raw button state once per frame; it answers `true` only on
/// the frame the button goes down.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    pressed: bool,
}

impl EdgeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state. Returns `true` on a rising edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.pressed;
        self.pressed = pressed;
        if rising {
            tracing::trace!("rising edge");
        }
        rising
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_press() {
        let mut t = EdgeTrigger::new();
        let frames = [false, true, true, true, false, false, true, false];
        let edges: Vec<bool> = frames.iter().map(|&p| t.update(p)).collect();
        assert_eq!(
            edges,
            vec![false, true, false, false, false, false, true, false]
        );
    }

    #[test]
    fn starts_released() {
        let mut t = EdgeTrigger::new();
        assert!(!t.is_pressed());
        assert!(t.update(true));
        assert!(t.is_pressed());
    }
}
