//! Page model
//!
//! An ordered, immutable list of pages plus the scroll state of the one
//! page currently on screen.

use heapless::{String, Vec};

use crate::config::{ContentSource, PageConfig, MAX_PAGES, MAX_TITLE_LEN};
use crate::scheduler::StartError;

/// One page of the rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    index: usize,
    title: String<MAX_TITLE_LEN>,
    title_len: usize,
    source: ContentSource,
}

impl Page {
    /// Position in the rotation
    pub fn index(&self) -> usize {
        self.index
    }

    /// Scrolling title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title length in characters
    pub fn title_len(&self) -> usize {
        self.title_len
    }

    /// Value row source
    pub fn source(&self) -> ContentSource {
        self.source
    }
}

/// Scroll progress of the active title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    /// Offset into the space-padded title
    pub stage: usize,
    /// Completed passes of the title across the row
    pub scroll_count: u8,
}

impl ScrollState {
    /// Back to the first frame of the first pass
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Step one column; returns true if this step wrapped
    ///
    /// `limit` is `columns + title_len`. The stage never exceeds it: past
    /// the limit it wraps to 0, the blank frame every pass starts from.
    pub fn advance(&mut self, limit: usize) -> bool {
        self.stage += 1;
        if self.stage > limit {
            self.stage = 0;
            self.scroll_count = self.scroll_count.saturating_add(1);
            true
        } else {
            false
        }
    }
}

/// Ordered pages and the active page's scroll state
#[derive(Debug, Clone)]
pub struct PageModel {
    pages: Vec<Page, MAX_PAGES>,
    active: usize,
    scroll: ScrollState,
}

impl PageModel {
    /// Build the model from configuration
    pub fn new(configs: &[PageConfig]) -> Result<Self, StartError> {
        if configs.is_empty() {
            return Err(StartError::EmptyPages);
        }
        if configs.len() > MAX_PAGES {
            return Err(StartError::TooManyPages);
        }

        let mut pages = Vec::new();
        for (index, config) in configs.iter().enumerate() {
            let page = Page {
                index,
                title: config.title.clone(),
                title_len: config.title.chars().count(),
                source: config.source,
            };
            pages.push(page).map_err(|_| StartError::TooManyPages)?;
        }

        Ok(Self {
            pages,
            active: 0,
            scroll: ScrollState::default(),
        })
    }

    /// Page currently on screen
    pub fn active(&self) -> &Page {
        // `new` guarantees at least one page and `active` stays in range
        &self.pages[self.active]
    }

    /// Index of the page on screen
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Number of pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false; a model cannot be built without pages
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages in rotation order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Scroll state of the active page
    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    /// Advance the active title by one column
    ///
    /// Returns the new stage.
    pub fn advance_scroll(&mut self, columns: usize) -> usize {
        let limit = columns + self.active().title_len;
        self.scroll.advance(limit);
        self.scroll.stage
    }

    /// Move to the next page, wrapping, and restart its scroll
    pub fn rotate(&mut self) -> &Page {
        self.active = (self.active + 1) % self.pages.len();
        self.scroll.reset();
        self.active()
    }
}
