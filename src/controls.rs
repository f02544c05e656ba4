//! The two action buttons drawn over the view.
//!
//! Layout and hit-testing work in logical pixels with the origin at the
//! top-left of the window. Both buttons start disabled and only respond once
//! the view reports it is ready.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Rerender,
    Download,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

#[derive(Clone, Debug)]
pub struct Button {
    pub action: Action,
    pub label: &'static str,
    pub rect: Rect,
    pub primary: bool,
}

/// Button caption, centred in `rect`. Colour is straight RGBA.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label {
    pub text: &'static str,
    pub rect: Rect,
    pub color: [u8; 4],
}

/// A filled rectangle in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub rect: Rect,
    pub color: [f32; 4],
}

const BUTTON_WIDTH: f32 = 132.0;
const BUTTON_HEIGHT: f32 = 36.0;
const MARGIN: f32 = 16.0;
const GAP: f32 = 8.0;
const BORDER: f32 = 1.0;

const PRIMARY: [f32; 4] = [0.92, 0.92, 0.92, 0.95];
const SECONDARY: [f32; 4] = [0.12, 0.12, 0.12, 0.9];
const OUTLINE: [f32; 4] = [0.35, 0.35, 0.35, 0.9];
const PRIMARY_TEXT: [u8; 4] = [17, 17, 17, 255];
const SECONDARY_TEXT: [u8; 4] = [235, 235, 235, 255];
const HOVER_TINT: f32 = 0.08;
const DISABLED_ALPHA: f32 = 0.35;

#[derive(Clone, Debug)]
pub struct Controls {
    buttons: Vec<Button>,
    enabled: bool,
    hovered: Option<Action>,
}

impl Controls {
    pub fn new() -> Self {
        let mut controls = Self {
            buttons: vec![
                Button {
                    action: Action::Rerender,
                    label: "Re-render",
                    rect: Rect { x: 0.0, y: 0.0, w: 0.0, h: 0.0 },
                    primary: false,
                },
                Button {
                    action: Action::Download,
                    label: "Download PNG",
                    rect: Rect { x: 0.0, y: 0.0, w: 0.0, h: 0.0 },
                    primary: true,
                },
            ],
            enabled: false,
            hovered: None,
        };
        controls.layout();
        controls
    }

    /// Lay the buttons out in a row along the top-left edge.
    fn layout(&mut self) {
        let mut x = MARGIN;
        for button in &mut self.buttons {
            button.rect = Rect {
                x,
                y: MARGIN,
                w: BUTTON_WIDTH,
                h: BUTTON_HEIGHT,
            };
            x += BUTTON_WIDTH + GAP;
        }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.hovered = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enabled button under the cursor.
    pub fn hit(&self, x: f32, y: f32) -> Option<Action> {
        if !self.enabled {
            return None;
        }
        self.buttons
            .iter()
            .find(|button| button.rect.contains(x, y))
            .map(|button| button.action)
    }

    /// Track hover state. Returns true when it changed and the overlay needs
    /// a redraw.
    pub fn hover(&mut self, x: f32, y: f32) -> bool {
        let hovered = self.hit(x, y);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    /// Keyboard accelerators: `R` re-renders, `S` downloads.
    pub fn accelerator(&self, key: &str) -> Option<Action> {
        if !self.enabled {
            return None;
        }
        match key {
            "r" | "R" => Some(Action::Rerender),
            "s" | "S" => Some(Action::Download),
            _ => None,
        }
    }

    /// Filled rectangles to draw, back to front.
    pub fn quads(&self) -> Vec<Quad> {
        let mut quads = Vec::with_capacity(self.buttons.len() * 2);
        for button in &self.buttons {
            let mut fill = if button.primary { PRIMARY } else { SECONDARY };
            if self.hovered == Some(button.action) {
                let tint = if button.primary { -HOVER_TINT } else { HOVER_TINT };
                for channel in &mut fill[..3] {
                    *channel = (*channel + tint).clamp(0.0, 1.0);
                }
            }
            let mut outline = OUTLINE;
            if !self.enabled {
                fill[3] *= DISABLED_ALPHA;
                outline[3] *= DISABLED_ALPHA;
            }
            let r = button.rect;
            quads.push(Quad {
                rect: r,
                color: outline,
            });
            quads.push(Quad {
                rect: Rect {
                    x: r.x + BORDER,
                    y: r.y + BORDER,
                    w: r.w - 2.0 * BORDER,
                    h: r.h - 2.0 * BORDER,
                },
                color: fill,
            });
        }
        quads
    }

    /// Captions to draw over [`Controls::quads`].
    pub fn labels(&self) -> Vec<Label> {
        self.buttons
            .iter()
            .map(|button| {
                let mut color = if button.primary {
                    PRIMARY_TEXT
                } else {
                    SECONDARY_TEXT
                };
                if !self.enabled {
                    color[3] = (color[3] as f32 * DISABLED_ALPHA).round() as u8;
                }
                Label {
                    text: button.label,
                    rect: button.rect,
                    color,
                }
            })
            .collect()
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_button_has_its_caption() {
        let controls = Controls::new();
        let labels = controls.labels();
        let texts: Vec<_> = labels.iter().map(|label| label.text).collect();
        assert_eq!(texts, ["Re-render", "Download PNG"]);
        for (label, button) in labels.iter().zip(controls.buttons()) {
            assert_eq!(label.rect, button.rect);
        }
    }

    #[test]
    fn captions_contrast_with_their_fill() {
        let mut controls = Controls::new();
        controls.set_enabled(true);
        let labels = controls.labels();
        // Re-render sits on a dark fill, Download PNG on a light one.
        assert!(labels[0].color[0] > 200);
        assert!(labels[1].color[0] < 50);
        assert!(labels.iter().all(|label| label.color[3] == 255));
    }

    #[test]
    fn disabled_captions_are_dimmed() {
        let labels = Controls::new().labels();
        assert!(labels.iter().all(|label| label.color[3] == 89));
    }

    #[test]
    fn accelerators_follow_enabled_state() {
        let mut controls = Controls::new();
        assert_eq!(controls.accelerator("r"), None);
        controls.set_enabled(true);
        assert_eq!(controls.accelerator("R"), Some(Action::Rerender));
        assert_eq!(controls.accelerator("s"), Some(Action::Download));
        assert_eq!(controls.accelerator("x"), None);
    }
}
