//! Supported website types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of website the model is asked to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteType {
    Portfolio,
    Business,
    Blog,
    Event,
    News,
    Article,
}

/// Catalogue entry returned by `GET /api/prompts/types`.
#[derive(Debug, Clone, Serialize)]
pub struct WebsiteTypeInfo {
    pub id: WebsiteType,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

impl WebsiteType {
    pub const ALL: [Self; 6] = [
        Self::Portfolio,
        Self::Business,
        Self::Blog,
        Self::Event,
        Self::News,
        Self::Article,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Business => "business",
            Self::Blog => "blog",
            Self::Event => "event",
            Self::News => "news",
            Self::Article => "article",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Portfolio => "Portfolio",
            Self::Business => "Business",
            Self::Blog => "Blog",
            Self::Event => "Event",
            Self::News => "News",
            Self::Article => "Article",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Portfolio => "Professional portfolio to showcase your work and skills",
            Self::Business => "Corporate website for your business or startup",
            Self::Blog => "Personal or professional blog with articles",
            Self::Event => "Website for events, conferences, or weddings",
            Self::News => "News portal or magazine website",
            Self::Article => "Long-form editorial or magazine feature",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Portfolio => "💼",
            Self::Business => "🏢",
            Self::Blog => "📝",
            Self::Event => "🎉",
            Self::News => "📰",
            Self::Article => "📖",
        }
    }

    pub const fn info(self) -> WebsiteTypeInfo {
        WebsiteTypeInfo {
            id: self,
            name: self.display_name(),
            description: self.description(),
            icon: self.icon(),
        }
    }

    pub fn catalogue() -> Vec<WebsiteTypeInfo> {
        Self::ALL.iter().map(|t| t.info()).collect()
    }
}

impl fmt::Display for WebsiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebsiteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown website type `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for ty in WebsiteType::ALL {
            assert_eq!(ty.as_str().parse::<WebsiteType>().unwrap(), ty);
        }
        assert!("Portfolio".parse::<WebsiteType>().is_err());
        assert!("shop".parse::<WebsiteType>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&WebsiteType::News).unwrap();
        assert_eq!(json, "\"news\"");
        let ty: WebsiteType = serde_json::from_str("\"article\"").unwrap();
        assert_eq!(ty, WebsiteType::Article);
    }

    #[test]
    fn test_catalogue() {
        let types = WebsiteType::catalogue();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0].name, "Portfolio");
    }
}
