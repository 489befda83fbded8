//! Stylesheets compiled into the binary.
//!
//! The same bundle is inlined into rendered documents and served over HTTP
//! under `/styles`.

/// Base stylesheet shared by every layout.
pub const MAIN_STYLESHEET: &str = "main.css";

const STYLESHEETS: &[(&str, &str)] = &[
    (MAIN_STYLESHEET, include_str!("../../assets/styles/main.css")),
    ("a4.css", include_str!("../../assets/styles/a4.css")),
    ("letter.css", include_str!("../../assets/styles/letter.css")),
];

/// Look up an embedded stylesheet by file name.
pub fn stylesheet(name: &str) -> Option<&'static str> {
    STYLESHEETS
        .iter()
        .find(|(file, _)| *file == name)
        .map(|(_, css)| *css)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(stylesheet("main.css").unwrap().contains("table.lines"));
        assert!(stylesheet("a4.css").unwrap().contains("size: A4"));
        assert!(stylesheet("../Cargo.toml").is_none());
        assert_eq!(STYLESHEETS.len(), 3);
    }
}
