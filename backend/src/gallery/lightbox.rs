use super::{find_photo, Photo};

/// CSS `overflow` of the page body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// No inline style set
    #[default]
    Unset,
    /// `visible`
    Visible,
    /// `auto`
    Auto,
    /// `scroll`
    Scroll,
    /// `hidden`, scrolling suppressed
    Hidden,
}

/// Page level state the lightbox touches while open
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    /// Body overflow style
    pub overflow: Overflow,
    /// Whether the window keydown listener is attached
    pub key_listener_attached: bool,
}

impl Page {
    /// Page with the given starting overflow
    #[must_use]
    pub fn with_overflow(overflow: Overflow) -> Self {
        Self {
            overflow,
            key_listener_attached: false,
        }
    }

    /// Whether the page can scroll
    #[must_use]
    pub fn scroll_enabled(&self) -> bool {
        self.overflow != Overflow::Hidden
    }
}

/// Keys the gallery reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Escape
    Escape,
    /// Enter
    Enter,
    /// Space bar
    Space,
    /// Anything else
    Other,
}

/// User interactions with the grid and overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryEvent<'a> {
    /// Card clicked
    CardClicked(&'a str),
    /// Key pressed while a card has focus
    CardKey(&'a str, Key),
    /// Key pressed anywhere in the window
    WindowKey(Key),
    /// Click on the dimmed backdrop
    BackdropClicked,
    /// Click inside the overlay content
    ContentClicked,
    /// Close control pressed
    CloseClicked,
}

/// Full-size overlay state
///
/// While a photo is selected the page overflow is `Hidden` and the key listener
/// is attached. Closing restores the overflow captured at open time.
#[derive(Debug, Default)]
pub struct Lightbox {
    selected: Option<&'static Photo>,
    saved_overflow: Option<Overflow>,
}

impl Lightbox {
    /// Closed lightbox
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Photo currently shown full-size
    #[must_use]
    pub const fn selected(&self) -> Option<&'static Photo> {
        self.selected
    }

    /// Whether the overlay is open
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Applies one interaction, updating `page` accordingly
    pub fn handle(&mut self, event: GalleryEvent<'_>, page: &mut Page) {
        match event {
            GalleryEvent::CardClicked(id)
            | GalleryEvent::CardKey(id, Key::Enter | Key::Space) => self.select(id, page),
            GalleryEvent::WindowKey(Key::Escape) if page.key_listener_attached => {
                self.close(page);
            }
            GalleryEvent::BackdropClicked | GalleryEvent::CloseClicked => self.close(page),
            GalleryEvent::CardKey(..) | GalleryEvent::WindowKey(_) | GalleryEvent::ContentClicked => {}
        }
    }

    fn select(&mut self, id: &str, page: &mut Page) {
        let Some(photo) = find_photo(id) else {
            return;
        };

        if self.saved_overflow.is_none() {
            self.saved_overflow = Some(page.overflow);
            page.overflow = Overflow::Hidden;
            page.key_listener_attached = true;
        }
        self.selected = Some(photo);
    }

    fn close(&mut self, page: &mut Page) {
        self.selected = None;
        if let Some(previous) = self.saved_overflow.take() {
            page.overflow = previous;
            page.key_listener_attached = false;
        }
    }
}
