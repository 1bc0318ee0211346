//! Capture-name to terminal color mapping
//!
//! Highlight queries name their captures (`keyword`, `type`, `function.special`,
//! ...). A theme maps those names to display colors. Names it doesn't know fall
//! back on their dotted parent (`keyword.return` -> `keyword`) and finally on
//! the unstyled default.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Display color for a highlight span
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorId {
    /// Terminal default foreground
    #[default]
    Default,
    Gray,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    /// 256-color palette entry
    Indexed(u8),
}

/// A theme mapping capture names to colors
#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,
    colors: HashMap<String, ColorId>,
    fallback: ColorId,
}

lazy_static! {
    static ref C_THEME: Theme = Theme::from_pairs(
        "c",
        &[
            ("comment", ColorId::Gray),
            ("string", ColorId::Green),
            ("system_lib_string", ColorId::Green),
            ("number", ColorId::Red),
            ("number_literal", ColorId::Red),
            ("char_literal", ColorId::Red),
            ("type", ColorId::Cyan),
            ("type_identifier", ColorId::Cyan),
            ("primitive_type", ColorId::Cyan),
            ("sized_type_specifier", ColorId::Cyan),
            ("keyword.typedef", ColorId::Indexed(54)),
            ("keyword.return", ColorId::Red),
            ("keyword", ColorId::Yellow),
            ("preproc_directive", ColorId::Yellow),
            ("function", ColorId::Blue),
            ("function.special", ColorId::Blue),
            // The bundled query captures every identifier as @variable first,
            // so only `NULL` lands here; all-caps names need a query with the
            // @constant pattern ahead of @variable (`--highlights`).
            ("constant", ColorId::Magenta),
            ("property", ColorId::Cyan),
            ("field_identifier", ColorId::Cyan),
            ("label", ColorId::Magenta),
            ("statement_identifier", ColorId::Magenta),
            ("operator", ColorId::White),
            ("delimiter", ColorId::White),
            ("variable", ColorId::Default),
        ],
    );
}

impl Theme {
    /// Empty theme: everything resolves to the default color
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colors: HashMap::new(),
            fallback: ColorId::Default,
        }
    }

    pub fn from_pairs(name: impl Into<String>, pairs: &[(&str, ColorId)]) -> Self {
        let mut theme = Self::new(name);
        for &(capture, color) in pairs {
            theme.set_color(capture, color);
        }
        theme
    }

    /// Built-in theme for the C highlight query
    pub fn c() -> Self {
        C_THEME.clone()
    }

    pub fn set_color(&mut self, capture: impl Into<String>, color: ColorId) {
        self.colors.insert(capture.into(), color);
    }

    /// Resolve a capture name, walking up dotted parents. Never fails
    pub fn resolve(&self, capture: &str) -> ColorId {
        let mut name = capture;
        loop {
            if let Some(&color) = self.colors.get(name) {
                return color;
            }
            match name.rfind('.') {
                Some(dot) => name = &name[..dot],
                None => return self.fallback,
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::c()
    }
}
