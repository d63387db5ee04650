/// Focusable areas of the chat view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusArea {
    #[default]
    Input,
    Models,
    Conversation,
}

impl FocusArea {
    pub const RING: &'static [FocusArea] = &[
        FocusArea::Input,
        FocusArea::Models,
        FocusArea::Conversation,
    ];

    pub fn next(&self) -> FocusArea {
        let idx = Self::RING.iter().position(|f| f == self).unwrap_or(0);
        Self::RING[(idx + 1) % Self::RING.len()]
    }

    pub fn prev(&self) -> FocusArea {
        let idx = Self::RING.iter().position(|f| f == self).unwrap_or(0);
        if idx == 0 {
            Self::RING[Self::RING.len() - 1]
        } else {
            Self::RING[idx - 1]
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct FocusManager {
    current: FocusArea,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> FocusArea {
        self.current
    }

    pub fn focus(&mut self, area: FocusArea) {
        self.current = area;
    }

    pub fn next(&mut self) {
        self.current = self.current.next();
    }

    pub fn prev(&mut self) {
        self.current = self.current.prev();
    }

    pub fn is_focused(&self, area: FocusArea) -> bool {
        self.current == area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_wraps_both_ways() {
        let mut focus = FocusManager::new();
        assert!(focus.is_focused(FocusArea::Input));

        focus.next();
        focus.next();
        assert_eq!(focus.current(), FocusArea::Conversation);
        focus.next();
        assert_eq!(focus.current(), FocusArea::Input);

        focus.prev();
        assert_eq!(focus.current(), FocusArea::Conversation);
    }
}
