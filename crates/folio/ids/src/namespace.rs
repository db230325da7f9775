use crate::{CodecSettings, IdError, IdResult, OpaqueIdCodec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Public id namespaces. A key encoded in one namespace does not decode in
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdNamespace {
    Author,
    Article,
}

impl IdNamespace {
    pub const ALL: [IdNamespace; 2] = [IdNamespace::Author, IdNamespace::Article];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Article => "article",
        }
    }
}

impl fmt::Display for IdNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdNamespace {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author" => Ok(Self::Author),
            "article" => Ok(Self::Article),
            other => Err(IdError::Configuration(format!(
                "unknown id namespace '{other}'"
            ))),
        }
    }
}

/// The process-wide set of namespace codecs.
///
/// Built once from configuration and shared read-only; encoding and decoding
/// take `&self` and hold no interior state.
#[derive(Debug, Clone)]
pub struct IdCodecs {
    author: OpaqueIdCodec,
    article: OpaqueIdCodec,
}

impl IdCodecs {
    pub fn new(author: &CodecSettings, article: &CodecSettings) -> IdResult<Self> {
        let codecs = Self {
            author: OpaqueIdCodec::new(IdNamespace::Author.as_str(), author)?,
            article: OpaqueIdCodec::new(IdNamespace::Article.as_str(), article)?,
        };

        if author.salt == article.salt {
            return Err(IdError::Configuration(
                "author and article namespaces must use different salts".to_string(),
            ));
        }

        Ok(codecs)
    }

    /// Codecs with the salts and minimum length the published site uses.
    pub fn published_defaults() -> IdResult<Self> {
        Self::new(
            &CodecSettings::new("author", crate::DEFAULT_MIN_LENGTH),
            &CodecSettings::new("article", crate::DEFAULT_MIN_LENGTH),
        )
    }

    pub fn codec(&self, namespace: IdNamespace) -> &OpaqueIdCodec {
        match namespace {
            IdNamespace::Author => &self.author,
            IdNamespace::Article => &self.article,
        }
    }

    pub fn encode(&self, namespace: IdNamespace, value: u64) -> String {
        self.codec(namespace).encode(value)
    }

    pub fn decode(&self, namespace: IdNamespace, id: &str) -> IdResult<u64> {
        self.codec(namespace).decode(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_parse_roundtrip() {
        for namespace in IdNamespace::ALL {
            assert_eq!(namespace.as_str().parse::<IdNamespace>().unwrap(), namespace);
        }
        assert!("editor".parse::<IdNamespace>().is_err());
    }

    #[test]
    fn shared_salt_is_rejected() {
        let settings = CodecSettings::new("shared", 10);
        assert!(matches!(
            IdCodecs::new(&settings, &settings),
            Err(IdError::Configuration(_))
        ));
    }

    #[test]
    fn decode_error_names_namespace() {
        let codecs = IdCodecs::published_defaults().unwrap();
        let err = codecs.decode(IdNamespace::Article, "nope").unwrap_err();
        assert_eq!(
            err,
            IdError::InvalidIdentifier {
                namespace: "article".to_string(),
                value: "nope".to_string(),
            }
        );
    }
}
