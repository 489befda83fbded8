//! Convertor backend selection.

use std::sync::Arc;

use url::Url;

use crate::config::PdfConfig;
use crate::pdf::{Convertor, GotenbergConvertor, LocalConvertor, LocalTool, PdfError};

/// A configured PDF backend, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// No convertor: PDF requests fail with a static error.
    None,
    Prince { executable: Option<String> },
    WeasyPrint { executable: Option<String> },
    Gotenberg { url: Url },
}

impl Backend {
    /// Resolve a backend from its name and optional URL.
    pub fn from_name(name: &str, url: Option<&str>) -> Result<Self, PdfError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Backend::None),
            "prince" => Ok(Backend::Prince { executable: None }),
            "weasyprint" => Ok(Backend::WeasyPrint { executable: None }),
            "gotenberg" => {
                let raw = url.ok_or(PdfError::MissingUrl("gotenberg"))?;
                let url = Url::parse(raw).map_err(|source| PdfError::InvalidUrl {
                    url: raw.to_string(),
                    source,
                })?;
                Ok(Backend::Gotenberg { url })
            }
            other => Err(PdfError::UnknownBackend(other.to_string())),
        }
    }

    /// Resolve a backend from configuration.
    pub fn from_config(config: &PdfConfig) -> Result<Self, PdfError> {
        let backend = Self::from_name(&config.backend, config.url.as_deref())?;
        Ok(match backend {
            Backend::Prince { .. } => Backend::Prince {
                executable: config.executable.clone(),
            },
            Backend::WeasyPrint { .. } => Backend::WeasyPrint {
                executable: config.executable.clone(),
            },
            other => other,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::None => "none",
            Backend::Prince { .. } => "prince",
            Backend::WeasyPrint { .. } => "weasyprint",
            Backend::Gotenberg { .. } => "gotenberg",
        }
    }

    /// Build the convertor. `Backend::None` yields no convertor at all.
    pub fn into_convertor(self) -> Option<Arc<dyn Convertor>> {
        match self {
            Backend::None => None,
            Backend::Prince { executable } => {
                Some(Arc::new(LocalConvertor::new(LocalTool::Prince, executable)))
            }
            Backend::WeasyPrint { executable } => {
                Some(Arc::new(LocalConvertor::new(LocalTool::WeasyPrint, executable)))
            }
            Backend::Gotenberg { url } => Some(Arc::new(GotenbergConvertor::new(url))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_means_no_convertor() {
        assert_eq!(Backend::from_name("", None).unwrap(), Backend::None);
        assert_eq!(Backend::from_name("none", None).unwrap(), Backend::None);
        assert!(Backend::None.into_convertor().is_none());
    }

    #[test]
    fn test_local_backends() {
        let prince = Backend::from_name("Prince", None).unwrap();
        assert_eq!(prince.name(), "prince");
        assert_eq!(prince.into_convertor().unwrap().name(), "prince");

        let weasy = Backend::from_name("weasyprint", Some("http://ignored")).unwrap();
        assert_eq!(weasy.into_convertor().unwrap().name(), "weasyprint");
    }

    #[test]
    fn test_gotenberg_requires_url() {
        assert!(matches!(
            Backend::from_name("gotenberg", None),
            Err(PdfError::MissingUrl("gotenberg"))
        ));
        assert!(matches!(
            Backend::from_name("gotenberg", Some("::nope")),
            Err(PdfError::InvalidUrl { .. })
        ));

        let backend = Backend::from_name("gotenberg", Some("http://localhost:3001")).unwrap();
        assert_eq!(backend.into_convertor().unwrap().name(), "gotenberg");
    }

    #[test]
    fn test_unknown_backend() {
        let err = Backend::from_name("wkhtmltopdf", None).unwrap_err();
        assert_eq!(err.to_string(), "unknown PDF convertor 'wkhtmltopdf'");
    }

    #[test]
    fn test_executable_override() {
        let config = PdfConfig {
            backend: "prince".into(),
            url: None,
            executable: Some("/opt/prince/bin/prince".into()),
        };
        assert_eq!(
            Backend::from_config(&config).unwrap(),
            Backend::Prince {
                executable: Some("/opt/prince/bin/prince".into())
            }
        );
    }
}
