//! Cursor over the active view.

use rand::Rng;

use crate::catalog::{ActiveView, Catalog, ItemId};
use crate::error::NavError;
use crate::progress::StudiedSet;
use crate::sample;

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    view: ActiveView,
    cursor: usize,
    studied: StudiedSet,
}

impl Navigator {
    pub fn new(view: ActiveView, studied: StudiedSet) -> Self {
        Self {
            view,
            cursor: 0,
            studied,
        }
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn studied(&self) -> &StudiedSet {
        &self.studied
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Catalog index under the cursor; `None` when the view is empty.
    pub fn current(&self) -> Option<usize> {
        self.view.get(self.cursor).copied()
    }

    /// 1-based position and view length.
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.view.is_empty() {
            None
        } else {
            Some((self.cursor + 1, self.view.len()))
        }
    }

    pub fn advance(&mut self) -> Result<usize, NavError> {
        if self.view.is_empty() {
            return Err(NavError::EmptyView);
        }
        self.cursor = (self.cursor + 1) % self.view.len();
        Ok(self.cursor)
    }

    pub fn retreat(&mut self) -> Result<usize, NavError> {
        if self.view.is_empty() {
            return Err(NavError::EmptyView);
        }
        self.cursor = if self.cursor == 0 {
            self.view.len() - 1
        } else {
            self.cursor - 1
        };
        Ok(self.cursor)
    }

    /// Swaps in a new view and rewinds to its first item.
    pub fn replace_view(&mut self, view: ActiveView) {
        self.view = view;
        self.cursor = 0;
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        sample::shuffle(&mut self.view, rng);
        self.cursor = 0;
    }

    /// Flips the current item's studied flag. Returns the id and whether it
    /// is now studied.
    pub fn toggle_studied(&mut self, catalog: &Catalog) -> Result<(ItemId, bool), NavError> {
        let item = self
            .current()
            .and_then(|idx| catalog.get(idx))
            .ok_or(NavError::EmptyView)?;
        let now = self.studied.toggle(&item.id);
        Ok((item.id.clone(), now))
    }

    pub fn is_current_studied(&self, catalog: &Catalog) -> bool {
        self.current()
            .and_then(|idx| catalog.get(idx))
            .map_or(false, |item| self.studied.contains(&item.id))
    }

    pub fn reset_progress(&mut self) {
        self.studied.clear();
    }
}
