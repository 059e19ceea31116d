use sidechat_storage::SessionId;

/// Which list item, if any, has its context menu open.
///
/// A single scalar, so two items can never both claim to be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open_item: Option<SessionId>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes `item` if it is open, otherwise opens it and implicitly closes any other.
    pub fn toggle(&mut self, item: SessionId) -> Option<SessionId> {
        self.open_item = if self.open_item == Some(item) {
            None
        } else {
            Some(item)
        };
        self.open_item
    }

    /// The open item, treating one that no longer `exists` as closed.
    pub fn open_item<F>(&self, exists: F) -> Option<SessionId>
    where
        F: FnOnce(SessionId) -> bool,
    {
        self.open_item.filter(|item| exists(*item))
    }

    /// Closes the menu when it belongs to `item`. Returns whether it was open.
    pub fn close_if_open(&mut self, item: SessionId) -> bool {
        if self.open_item == Some(item) {
            self.open_item = None;
            return true;
        }
        false
    }

    pub fn close(&mut self) {
        self.open_item = None;
    }
}
