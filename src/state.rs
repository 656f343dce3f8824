use chrono::Utc;

use crate::pipeline::Portrait;

pub const MERITH_QUOTES: [&str; 9] = [
    "Hold still... no, not like that...",
    "A little more to the left... YOUR left...",
    "I said I wanted fireball, not portrait! ...oh well.",
    "The brush is doing that thing again...",
    "Almost... almost... don't sneeze...",
    "This might be my best work yet. Don't tell the Council.",
    "Do you smell burning? ...Never mind, that's normal.",
    "The last person who fidgeted got turned into a still life.",
    "Purple is NOT a creative choice, it's the only color I have left!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Creator,
    Painting,
    Portrait,
    Gallery,
}

/// Cycles through Merith's quotes while a portrait is being painted.
#[derive(Debug, Clone)]
pub struct QuoteRotation {
    index: usize,
}

impl QuoteRotation {
    pub fn starting_at(index: usize) -> Self {
        Self {
            index: index % MERITH_QUOTES.len(),
        }
    }

    pub fn from_clock() -> Self {
        let nanos = Utc::now().timestamp_subsec_nanos() as usize;
        Self::starting_at(nanos)
    }

    pub fn current(&self) -> &'static str {
        MERITH_QUOTES[self.index]
    }

    pub fn advance(&mut self) -> &'static str {
        self.index = (self.index + 1) % MERITH_QUOTES.len();
        self.current()
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    screen: Screen,
    current_portrait: Option<Portrait>,
    quotes: Option<QuoteRotation>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            screen: Screen::Creator,
            current_portrait: None,
            quotes: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn current_portrait(&self) -> Option<&Portrait> {
        self.current_portrait.as_ref()
    }

    pub fn quotes_mut(&mut self) -> Option<&mut QuoteRotation> {
        self.quotes.as_mut()
    }

    /// Enters the painting screen and starts the quote rotation.
    pub fn start_painting(&mut self, quotes: QuoteRotation) -> &'static str {
        self.screen = Screen::Painting;
        let first = quotes.current();
        self.quotes = Some(quotes);
        first
    }

    pub fn show_portrait(&mut self, portrait: Portrait) {
        self.quotes = None;
        self.current_portrait = Some(portrait);
        self.screen = Screen::Portrait;
    }

    /// A failed paint drops back to the creator with nothing half-shown.
    pub fn painting_failed(&mut self) {
        self.quotes = None;
        self.screen = Screen::Creator;
    }

    pub fn open_gallery(&mut self) {
        self.screen = Screen::Gallery;
    }

    pub fn back_to_creator(&mut self) {
        self.quotes = None;
        self.screen = Screen::Creator;
    }
}
