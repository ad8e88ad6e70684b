//! # Resolver Settings
//!
//! How resource parameters are derived from routes:
//!
//! - `url_parameter_pattern` - regex applied to a route's pattern text; its
//!   first capture group is the uninflected resource name.
//!   Default: `\^([^/?]+)/\$` (matches the literal text `^people/$`).
//! - `inflectors` - ordered transforms applied to derived names.
//!   Default: `pluralize`, `parameterize`.
//!
//! Settings come from code ([`ResolverSettings::default`]), from JSON
//! ([`ResolverSettings::from_json`]) or from the environment
//! ([`ResolverSettings::from_env`]):
//!
//! ```bash
//! PARAMETERIZED_URL_PATTERN='\^api/([^/?]+)/\$'
//! PARAMETERIZED_INFLECTORS=pluralize,dasherize,lowercase
//! ```
//!
//! An empty `PARAMETERIZED_INFLECTORS` disables inflection entirely.

use std::env;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::resolver::{dasherize, parameterize, pluralize, Inflectors};

pub const DEFAULT_URL_PARAMETER_PATTERN: &str = r"\^([^/?]+)/\$";

pub const URL_PATTERN_ENV: &str = "PARAMETERIZED_URL_PATTERN";
pub const INFLECTORS_ENV: &str = "PARAMETERIZED_INFLECTORS";

/// Settings loaded once from the environment, falling back to defaults.
static GLOBAL: Lazy<ResolverSettings> = Lazy::new(|| {
    ResolverSettings::from_env().unwrap_or_else(|err| {
        warn!(%err, "Invalid resolver settings in environment, using defaults");
        ResolverSettings::default()
    })
});

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid URL parameter pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown inflector `{0}`")]
    UnknownInflector(String),
    #[error("invalid settings document: {0}")]
    Json(#[from] serde_json::Error),
}

/// The built-in inflectors selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflectorKind {
    Pluralize,
    Parameterize,
    Dasherize,
    Lowercase,
}

impl InflectorKind {
    pub fn apply(self, word: &str) -> String {
        match self {
            InflectorKind::Pluralize => pluralize(word),
            InflectorKind::Parameterize => parameterize(word),
            InflectorKind::Dasherize => dasherize(word),
            InflectorKind::Lowercase => word.to_lowercase(),
        }
    }
}

impl FromStr for InflectorKind {
    type Err = SettingsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "pluralize" => Ok(InflectorKind::Pluralize),
            "parameterize" => Ok(InflectorKind::Parameterize),
            "dasherize" => Ok(InflectorKind::Dasherize),
            "lowercase" => Ok(InflectorKind::Lowercase),
            _ => Err(SettingsError::UnknownInflector(name.to_string())),
        }
    }
}

fn chain(kinds: &[InflectorKind]) -> Inflectors {
    kinds
        .iter()
        .fold(Inflectors::none(), |chain, kind| {
            let kind = *kind;
            chain.then(move |word| kind.apply(word))
        })
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SettingsDocument {
    url_parameter_pattern: String,
    inflectors: Vec<InflectorKind>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            url_parameter_pattern: DEFAULT_URL_PARAMETER_PATTERN.to_string(),
            inflectors: vec![InflectorKind::Pluralize, InflectorKind::Parameterize],
        }
    }
}

/// Configuration of resource parameter discovery.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    url_pattern: Option<Regex>,
    inflectors: Inflectors,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            url_pattern: Regex::new(DEFAULT_URL_PARAMETER_PATTERN).ok(),
            inflectors: Inflectors::default(),
        }
    }
}

impl ResolverSettings {
    pub fn new(url_parameter_pattern: &str, inflectors: Inflectors) -> Result<Self, SettingsError> {
        let url_pattern =
            Regex::new(url_parameter_pattern).map_err(|source| SettingsError::InvalidPattern {
                pattern: url_parameter_pattern.to_string(),
                source,
            })?;
        Ok(Self {
            url_pattern: Some(url_pattern),
            inflectors,
        })
    }

    /// Reads settings from a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let document: SettingsDocument = serde_json::from_str(json)?;
        Self::new(&document.url_parameter_pattern, chain(&document.inflectors))
    }

    /// Reads settings from `PARAMETERIZED_URL_PATTERN` and
    /// `PARAMETERIZED_INFLECTORS`.
    pub fn from_env() -> Result<Self, SettingsError> {
        let pattern =
            env::var(URL_PATTERN_ENV).unwrap_or_else(|_| DEFAULT_URL_PARAMETER_PATTERN.to_string());
        let inflectors = match env::var(INFLECTORS_ENV) {
            Ok(names) => {
                let kinds = names
                    .split(',')
                    .filter(|name| !name.trim().is_empty())
                    .map(InflectorKind::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                chain(&kinds)
            }
            Err(_) => Inflectors::default(),
        };
        Self::new(&pattern, inflectors)
    }

    /// Process-wide settings, loaded from the environment on first use.
    pub fn global() -> &'static ResolverSettings {
        &GLOBAL
    }

    pub fn with_inflectors(mut self, inflectors: Inflectors) -> Self {
        self.inflectors = inflectors;
        self
    }

    pub fn inflectors(&self) -> &Inflectors {
        &self.inflectors
    }

    /// The uninflected resource name captured from a route pattern.
    pub fn url_parameter(&self, pattern: &str) -> Option<String> {
        self.url_pattern
            .as_ref()?
            .captures(pattern)
            .filter(|captures| captures.get(0).is_some_and(|m| m.start() == 0))
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn inflect(&self, name: &str) -> String {
        self.inflectors.apply(name)
    }
}
