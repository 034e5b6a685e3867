use serde::Deserialize;

/// How the host site is set up.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Home URL every generated link starts with.
    #[serde(default = "default_home")]
    pub home: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Locale of the acting user, when it differs from the site's.
    #[serde(default)]
    pub user_locale: Option<String>,
    /// Empty for plain (non-pretty) permalinks.
    #[serde(default = "default_permalink_structure")]
    pub permalink_structure: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            locale: default_locale(),
            user_locale: None,
            permalink_structure: default_permalink_structure(),
        }
    }
}

fn default_home() -> String {
    "http://localhost".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_permalink_structure() -> String {
    "/%postname%/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_site_config() {
        let config = SiteConfig::default();
        assert_eq!(config.home, "http://localhost");
        assert_eq!(config.locale, "en_US");
        assert_eq!(config.user_locale, None);
        assert_eq!(config.permalink_structure, "/%postname%/");
    }

    #[test]
    fn test_site_config_deserialization() {
        let yaml = r#"
home: "https://example.org/calendar"
locale: de_DE
user_locale: en_GB
permalink_structure: ""
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.home, "https://example.org/calendar");
        assert_eq!(config.locale, "de_DE");
        assert_eq!(config.user_locale.as_deref(), Some("en_GB"));
        assert!(config.permalink_structure.is_empty());
    }
}
