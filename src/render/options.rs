//! Rendering options.

use std::fmt;
use std::str::FromStr;

/// Paper layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    A4,
    Letter,
}

impl Layout {
    /// Stylesheet carrying the `@page` rules for this layout.
    pub fn stylesheet(self) -> &'static str {
        match self {
            Layout::A4 => "a4.css",
            Layout::Letter => "letter.css",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::A4 => "a4",
            Layout::Letter => "letter",
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(Layout::A4),
            "letter" => Ok(Layout::Letter),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language used for labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

/// Options controlling the shape of the generated HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Inline stylesheets instead of linking to `/styles`.
    pub embed_stylesheets: bool,
    pub layout: Layout,
    /// Label language; English when unset.
    pub locale: Option<Locale>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embedded_stylesheets(mut self) -> Self {
        self.embed_stylesheets = true;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Options used for every PDF generated over HTTP.
    pub fn for_pdf() -> Self {
        Self::new()
            .with_embedded_stylesheets()
            .with_layout(Layout::A4)
    }

    pub fn locale(&self) -> Locale {
        self.locale.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_defaults() {
        let opts = RenderOptions::for_pdf();
        assert!(opts.embed_stylesheets);
        assert_eq!(opts.layout, Layout::A4);
        assert_eq!(opts.locale, None);
        assert_eq!(opts.locale(), Locale::En);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Letter".parse::<Layout>().unwrap(), Layout::Letter);
        assert!("a5".parse::<Layout>().is_err());
        assert_eq!("ES".parse::<Locale>().unwrap(), Locale::Es);
        assert!("xx".parse::<Locale>().is_err());
    }
}
