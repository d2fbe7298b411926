use super::error::OcrError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered set of recognition languages, e.g. `ind+eng`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OcrLanguages(Vec<String>);

impl OcrLanguages {
    /// Parse a `+`-separated language spec, dropping blanks and duplicates.
    pub fn parse(spec: &str) -> Self {
        let mut langs: Vec<String> = Vec::new();
        for lang in spec.split('+').map(str::trim).filter(|l| !l.is_empty()) {
            if !langs.iter().any(|l| l == lang) {
                langs.push(lang.to_string());
            }
        }
        Self(langs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for OcrLanguages {
    fn default() -> Self {
        Self::parse("ind+eng")
    }
}

impl fmt::Display for OcrLanguages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("+"))
    }
}

/// A recognition engine instance.
///
/// An engine belongs to a single job and is driven from that job's worker
/// thread only. It is never shared.
pub trait OcrEngine {
    fn name(&self) -> &str;

    /// Recognize the text in `image`.
    ///
    /// `progress` receives completion percentages in `0..=100`, non-decreasing.
    fn recognize(&mut self, image: &DynamicImage, progress: &mut dyn FnMut(u8)) -> Result<String, OcrError>;

    /// Release the engine's native resources. Called exactly once by the owning session.
    fn terminate(&mut self);
}

/// Creates engines for jobs.
pub trait OcrEngineFactory: Send + Sync {
    fn create(&self, languages: &OcrLanguages) -> Result<Box<dyn OcrEngine>, OcrError>;
}

/// Factory used when no OCR backend was compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableEngineFactory;

impl OcrEngineFactory for UnavailableEngineFactory {
    fn create(&self, _languages: &OcrLanguages) -> Result<Box<dyn OcrEngine>, OcrError> {
        Err(OcrError::Unavailable(
            "flashdoc was built without the `ocr` feature".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_languages() {
        let langs = OcrLanguages::parse(" ind + eng +eng+ ");
        assert_eq!(langs.iter().collect::<Vec<_>>(), vec!["ind", "eng"]);
        assert_eq!(langs.to_string(), "ind+eng");
    }

    #[test]
    fn test_empty_languages() {
        assert!(OcrLanguages::parse("").is_empty());
        assert!(OcrLanguages::parse("++").is_empty());
    }

    #[test]
    fn test_default_languages() {
        assert_eq!(OcrLanguages::default().to_string(), "ind+eng");
    }

    #[test]
    fn test_unavailable_factory() {
        let result = UnavailableEngineFactory.create(&OcrLanguages::default());
        assert!(matches!(result, Err(OcrError::Unavailable(_))));
    }
}
