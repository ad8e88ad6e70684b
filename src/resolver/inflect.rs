//! # Inflection
//!
//! Resource parameters are derived from singular names ("person", "people/")
//! by running them through a chain of string transforms. The default chain is
//! [`pluralize`] then [`parameterize`], which turns `"Example Person"` into
//! `"example-people"`.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

/// A pure string transform.
pub type Inflector = Arc<dyn Fn(&str) -> String + Send + Sync>;

const UNCOUNTABLES: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "jeans",
    "money",
    "rice",
    "series",
    "sheep",
    "species",
];

// Matched as word suffixes, so a word precedes any of its own suffixes.
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("human", "humans"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("cow", "kine"),
    ("zombie", "zombies"),
];

// Highest priority first.
const PLURALS: &[(&str, &str)] = &[
    (r"(?i)(quiz)$", "${1}zes"),
    (r"(?i)^(oxen)$", "${1}"),
    (r"(?i)^(ox)$", "${1}en"),
    (r"(?i)(m|l)ice$", "${1}ice"),
    (r"(?i)(m|l)ouse$", "${1}ice"),
    (r"(?i)(passer)s?by$", "${1}sby"),
    (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    (r"(?i)(x|ch|ss|sh)$", "${1}es"),
    (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
    (r"(?i)(hive)$", "${1}s"),
    (r"(?i)([lr])f$", "${1}ves"),
    (r"(?i)([^f])fe$", "${1}ves"),
    (r"(?i)sis$", "ses"),
    (r"(?i)([ti])a$", "${1}a"),
    (r"(?i)([ti])um$", "${1}a"),
    (r"(?i)(buffal|potat|tomat)o$", "${1}oes"),
    (r"(?i)(bu)s$", "${1}ses"),
    (r"(?i)(alias|status)$", "${1}es"),
    (r"(?i)(octop|vir)i$", "${1}i"),
    (r"(?i)(octop|vir)us$", "${1}i"),
    (r"(?i)^(ax|test)is$", "${1}es"),
    (r"(?i)s$", "s"),
    (r"$", "s"),
];

static PLURAL_RULES: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    // Both forms of an irregular word pluralize to the plural form.
    let irregulars = IRREGULARS
        .iter()
        .flat_map(|(singular, plural)| [(*singular, *plural), (*plural, *plural)])
        .filter_map(|(word, plural)| {
            let (first, rest) = word.split_at(1);
            let pattern = format!(r"(?i)({first}){}$", regex::escape(rest));
            let replacement = format!("${{1}}{}", &plural[1..]);
            Regex::new(&pattern).ok().map(|re| (re, replacement))
        });
    let defaults = PLURALS.iter().filter_map(|(pattern, replacement)| {
        Regex::new(pattern)
            .ok()
            .map(|re| (re, replacement.to_string()))
    });
    irregulars.chain(defaults).collect()
});

static NON_PARAMETER_CHARS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)[^a-z0-9\-_]+").ok());

/// The plural form of an English word.
///
/// ```
/// use parameterized_serializers::resolver::pluralize;
///
/// assert_eq!(pluralize("person"), "people");
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("sheep"), "sheep");
/// ```
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLES.contains(&word.to_lowercase().as_str()) {
        return word.to_string();
    }
    PLURAL_RULES
        .iter()
        .find(|(rule, _)| rule.is_match(word))
        .map(|(rule, replacement)| rule.replace(word, replacement.as_str()).into_owned())
        .unwrap_or_else(|| word.to_string())
}

/// Replaces special characters so the result can be used as a URL parameter.
///
/// ```
/// use parameterized_serializers::resolver::parameterize;
///
/// assert_eq!(parameterize("Donald E. Knuth"), "donald-e-knuth");
/// ```
pub fn parameterize(text: &str) -> String {
    let replaced = match NON_PARAMETER_CHARS.as_ref() {
        Some(re) => re.replace_all(text, "-").into_owned(),
        None => text.to_string(),
    };
    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed.trim_matches('-').to_lowercase()
}

/// Replaces underscores with dashes.
pub fn dasherize(word: &str) -> String {
    word.replace('_', "-")
}

/// An ordered chain of inflectors.
#[derive(Clone)]
pub struct Inflectors(Vec<Inflector>);

impl Inflectors {
    /// The empty chain, leaving names verbatim.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn new(chain: Vec<Inflector>) -> Self {
        Self(chain)
    }

    pub fn then(mut self, inflector: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.0.push(Arc::new(inflector));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Runs `word` through every inflector in order.
    pub fn apply(&self, word: &str) -> String {
        self.0
            .iter()
            .fold(word.to_string(), |word, inflector| inflector(&word))
    }
}

impl Default for Inflectors {
    fn default() -> Self {
        Self::none().then(pluralize).then(parameterize)
    }
}

impl fmt::Debug for Inflectors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Inflectors({} steps)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralize_handles_irregulars_and_suffix_rules() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("people"), "people");
        assert_eq!(pluralize("salesperson"), "salespeople");
        assert_eq!(pluralize("salespeople"), "salespeople");
        assert_eq!(pluralize("human"), "humans");
        assert_eq!(pluralize("woman"), "women");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("wife"), "wives");
        assert_eq!(pluralize("matrix"), "matrices");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("types"), "types");
        assert_eq!(pluralize("wo-model"), "wo-models");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn parameterize_collapses_separators() {
        assert_eq!(parameterize("Example  Person!"), "example-person");
        assert_eq!(parameterize("--foo__bar--"), "foo__bar");
        assert_eq!(parameterize("types-unhandled"), "types-unhandled");
    }

    #[test]
    fn default_chain_pluralizes_then_parameterizes() {
        let inflectors = Inflectors::default();
        assert_eq!(inflectors.len(), 2);
        assert_eq!(inflectors.apply("person"), "people");
        assert_eq!(inflectors.apply("Example Type"), "example-types");
        assert_eq!(Inflectors::none().apply("Person"), "Person");
    }
}
