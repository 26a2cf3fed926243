//! Validated primitive types shared across the masthead crates.
//!
//! Each type guarantees its invariant once constructed, so downstream code never needs to
//! re-check for empty titles, malformed identifiers or unsafe slugs.

use std::fmt;

/// Maximum length of an entity identifier, in bytes.
pub const MAX_ENTITY_ID_LEN: usize = 128;

/// Maximum length of a derived slug, in bytes.
pub const MAX_SLUG_LEN: usize = 96;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    #[error("identifier must not contain whitespace")]
    ContainsWhitespace,
    #[error("text must not contain control characters")]
    ControlCharacter,
    #[error("text exceeds maximum length of {max} characters")]
    TooLong { max: usize },
    #[error("invalid slug: {0}")]
    InvalidSlug(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of an author, category or tag as issued by the storage layer.
///
/// Identifiers are opaque strings. Construction trims surrounding whitespace and rejects
/// anything that could not round-trip through a form field or a URL path segment unchanged:
/// interior whitespace, control characters, and values longer than [`MAX_ENTITY_ID_LEN`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.len() > MAX_ENTITY_ID_LEN {
            return Err(TextError::TooLong {
                max: MAX_ENTITY_ID_LEN,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(TextError::ControlCharacter);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(TextError::ContainsWhitespace);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for EntityId {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntityId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// URL path segment for an article, category or tag page.
///
/// A slug consists of lowercase ASCII letters and digits separated by single hyphens, with no
/// leading or trailing hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Validates an already-slugified string.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let s = input.as_ref().trim();
        if s.is_empty() {
            return Err(TextError::Empty);
        }
        if s.len() > MAX_SLUG_LEN {
            return Err(TextError::TooLong { max: MAX_SLUG_LEN });
        }

        let well_formed = s
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-'))
            && !s.starts_with('-')
            && !s.ends_with('-')
            && !s.contains("--");

        if !well_formed {
            return Err(TextError::InvalidSlug(s.to_owned()));
        }

        Ok(Self(s.to_owned()))
    }

    /// Derives a slug from free text such as an article title.
    ///
    /// Common Latin accented letters are folded to ASCII, everything else that is not
    /// alphanumeric collapses into a single hyphen. Long results are cut back to the last
    /// hyphen that keeps them within [`MAX_SLUG_LEN`].
    pub fn from_title(title: impl AsRef<str>) -> Result<Self, TextError> {
        let mut out = String::with_capacity(title.as_ref().len());
        let mut pending_separator = false;

        for c in title.as_ref().chars().flat_map(fold_to_ascii) {
            if c.is_ascii_alphanumeric() {
                if pending_separator && !out.is_empty() {
                    out.push('-');
                }
                pending_separator = false;
                out.push(c.to_ascii_lowercase());
            } else if c != '\'' {
                pending_separator = true;
            }
        }

        if out.is_empty() {
            return Err(TextError::InvalidSlug(title.as_ref().to_owned()));
        }

        if out.len() > MAX_SLUG_LEN {
            let cut = out[..=MAX_SLUG_LEN]
                .rfind('-')
                .filter(|&i| i > 0)
                .unwrap_or(MAX_SLUG_LEN);
            out.truncate(cut);
            while out.ends_with('-') {
                out.pop();
            }
        }

        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for Slug {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Slug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Slug::new(&s).map_err(serde::de::Error::custom)
    }
}

fn fold_to_ascii(c: char) -> impl Iterator<Item = char> {
    let folded: &'static str = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'œ' | 'Œ' => "oe",
        'ß' => "ss",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        '&' => " and ",
        _ => "",
    };

    let single = if folded.is_empty() { Some(c) } else { None };
    folded.chars().chain(single)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  hi ").expect("valid").as_str(), "hi");
        assert_eq!(NonEmptyText::new(" \t ").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn entity_id_rejects_interior_whitespace() {
        assert_eq!(
            EntityId::new("a b").unwrap_err(),
            TextError::ContainsWhitespace
        );
        assert_eq!(EntityId::new(" cat-1 ").expect("valid").as_str(), "cat-1");
    }

    #[test]
    fn entity_id_rejects_control_characters_and_long_values() {
        assert_eq!(
            EntityId::new("a\u{0007}b").unwrap_err(),
            TextError::ControlCharacter
        );
        let long = "x".repeat(MAX_ENTITY_ID_LEN + 1);
        assert!(matches!(
            EntityId::new(long),
            Err(TextError::TooLong { .. })
        ));
    }

    #[test]
    fn entity_id_deserialize_validates() {
        let ok: EntityId = serde_json::from_str("\"author-7\"").expect("valid id");
        assert_eq!(ok.as_str(), "author-7");
        assert!(serde_json::from_str::<EntityId>("\"\"").is_err());
    }

    #[test]
    fn slug_from_title_folds_and_collapses() {
        let slug = Slug::from_title("Crème Brûlée: A  History!").expect("slug");
        assert_eq!(slug.as_str(), "creme-brulee-a-history");

        let slug = Slug::from_title("Rock & Roll's Legacy").expect("slug");
        assert_eq!(slug.as_str(), "rock-and-rolls-legacy");
    }

    #[test]
    fn slug_from_title_truncates_on_separator() {
        let title = "word ".repeat(40);
        let slug = Slug::from_title(&title).expect("slug");
        assert!(slug.as_str().len() <= MAX_SLUG_LEN);
        assert!(slug.as_str().ends_with("word"));
        assert!(Slug::new(slug.as_str()).is_ok());
    }

    #[test]
    fn slug_from_title_without_alphanumerics_fails() {
        assert!(matches!(
            Slug::from_title("!!! ???"),
            Err(TextError::InvalidSlug(_))
        ));
    }

    #[test]
    fn slug_new_rejects_malformed() {
        assert!(Slug::new("hello-world").is_ok());
        assert!(Slug::new("Hello").is_err());
        assert!(Slug::new("-hello").is_err());
        assert!(Slug::new("a--b").is_err());
    }
}
