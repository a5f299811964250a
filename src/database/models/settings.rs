use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    #[serde(default)]
    pub tagline: String,
    pub default_locale: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub custom: serde_json::Map<String, Value>,
}

impl SiteSettings {
    pub fn for_site(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            tagline: String::new(),
            default_locale: "en".to_string(),
            timezone: "UTC".to_string(),
            logo_url: None,
            contact_email: None,
            maintenance_mode: false,
            custom: serde_json::Map::new(),
        }
    }

    /// Apply a patch, returning field errors without touching `self` when any
    /// field is invalid. An empty `logo_url` or `contact_email` clears it.
    pub fn apply(&mut self, patch: SettingsPatch) -> Result<(), HashMap<String, String>> {
        let mut next = self.clone();

        if let Some(site_name) = patch.site_name {
            next.site_name = site_name.trim().to_string();
        }
        if let Some(tagline) = patch.tagline {
            next.tagline = tagline;
        }
        if let Some(locale) = patch.default_locale {
            next.default_locale = locale;
        }
        if let Some(timezone) = patch.timezone {
            next.timezone = timezone.trim().to_string();
        }
        if let Some(logo_url) = patch.logo_url {
            next.logo_url = Some(logo_url).filter(|s| !s.is_empty());
        }
        if let Some(email) = patch.contact_email {
            next.contact_email = Some(email.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Some(maintenance) = patch.maintenance_mode {
            next.maintenance_mode = maintenance;
        }
        if let Some(custom) = patch.custom {
            // Null values remove custom keys.
            for (key, value) in custom {
                if value.is_null() {
                    next.custom.remove(&key);
                } else {
                    next.custom.insert(key, value);
                }
            }
        }

        let errors = next.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();

        let name_len = self.site_name.chars().count();
        if name_len == 0 || name_len > 100 {
            errors.insert("site_name".to_string(), "Site name must be 1 to 100 characters".to_string());
        }
        if !is_valid_locale(&self.default_locale) {
            errors.insert(
                "default_locale".to_string(),
                "Locale must look like 'en' or 'en-US'".to_string(),
            );
        }
        if self.timezone.is_empty() {
            errors.insert("timezone".to_string(), "Timezone is required".to_string());
        }
        if let Some(logo_url) = &self.logo_url {
            let ok = url::Url::parse(logo_url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !ok {
                errors.insert("logo_url".to_string(), "Logo URL must be an http(s) URL".to_string());
            }
        }
        if let Some(email) = &self.contact_email {
            if !is_valid_email(email) {
                errors.insert("contact_email".to_string(), "Invalid email address".to_string());
            }
        }

        errors
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SettingsPatch {
    pub site_name: Option<String>,
    pub tagline: Option<String>,
    pub default_locale: Option<String>,
    pub timezone: Option<String>,
    pub logo_url: Option<String>,
    pub contact_email: Option<String>,
    pub maintenance_mode: Option<bool>,
    pub custom: Option<serde_json::Map<String, Value>>,
}

fn is_valid_locale(locale: &str) -> bool {
    let lower = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_lowercase());
    let upper = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_uppercase());
    match locale.split_once('-') {
        None => lower(locale),
        Some((language, region)) => lower(language) && upper(region),
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_applies_and_clears() {
        let mut settings = SiteSettings::for_site("Acme");
        settings
            .apply(SettingsPatch {
                tagline: Some("News".to_string()),
                logo_url: Some("https://cdn.example.com/logo.png".to_string()),
                default_locale: Some("de-AT".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(settings.tagline, "News");
        assert_eq!(settings.default_locale, "de-AT");
        assert!(settings.logo_url.is_some());

        settings
            .apply(SettingsPatch {
                logo_url: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(settings.logo_url, None);
    }

    #[test]
    fn invalid_patch_reports_every_field_and_changes_nothing() {
        let mut settings = SiteSettings::for_site("Acme");
        let before = settings.clone();
        let errors = settings
            .apply(SettingsPatch {
                site_name: Some("  ".to_string()),
                default_locale: Some("english".to_string()),
                contact_email: Some("nobody".to_string()),
                logo_url: Some("ftp://x.org/logo".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        for field in ["site_name", "default_locale", "contact_email", "logo_url"] {
            assert!(errors.contains_key(field), "missing {}", field);
        }
        assert_eq!(settings, before);
    }

    #[test]
    fn custom_keys_merge_and_null_removes() {
        let mut settings = SiteSettings::for_site("Acme");
        let custom = json!({ "theme": "dark", "analytics": "UA-1" });
        settings
            .apply(SettingsPatch {
                custom: custom.as_object().cloned(),
                ..Default::default()
            })
            .unwrap();
        let custom = json!({ "analytics": null });
        settings
            .apply(SettingsPatch {
                custom: custom.as_object().cloned(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(settings.custom.get("theme"), Some(&json!("dark")));
        assert!(!settings.custom.contains_key("analytics"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("editor@example.com"));
        assert!(!is_valid_email("editor@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a b@example.com"));
    }
}
