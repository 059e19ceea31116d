/// Panel width when expanded.
pub const PANEL_EXPANDED_WIDTH: f32 = 256.0;
/// Icon rail width when collapsed.
pub const PANEL_COLLAPSED_WIDTH: f32 = 80.0;
const _: () = {
    assert!(PANEL_COLLAPSED_WIDTH > 0.0);
    assert!(PANEL_COLLAPSED_WIDTH < PANEL_EXPANDED_WIDTH);
};

/// Expanded/collapsed flag for the navigation panel. Independent of all other state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    expanded: bool,
}

impl PanelState {
    pub const fn new(expanded: bool) -> Self {
        Self { expanded }
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub const fn width(&self) -> f32 {
        if self.expanded {
            PANEL_EXPANDED_WIDTH
        } else {
            PANEL_COLLAPSED_WIDTH
        }
    }
}
