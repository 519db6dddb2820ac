use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SETTING_SPREAD: &str = "spread";
pub const SETTING_SUPPORT_WHATSAPP: &str = "support_whatsapp";
pub const SETTING_SUPPORT_TELEGRAM: &str = "support_telegram";

// Row of the `settings` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: Value,
}

impl Setting {
    pub fn new(key: &str, value: Value) -> Self {
        Self {
            key: key.to_string(),
            value,
        }
    }

    /// Text value with any JSON-encoded surrounding quotes removed.
    pub fn text(&self) -> String {
        let raw = match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        raw.trim_matches('"').to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportLinks {
    pub whatsapp: String,
    pub telegram: String,
}

impl SupportLinks {
    pub fn from_settings(settings: &[Setting]) -> Self {
        let mut links = Self::default();
        for setting in settings {
            match setting.key.as_str() {
                SETTING_SUPPORT_WHATSAPP => links.whatsapp = setting.text(),
                SETTING_SUPPORT_TELEGRAM => links.telegram = setting.text(),
                _ => {}
            }
        }
        links
    }

    pub fn is_empty(&self) -> bool {
        self.whatsapp.is_empty() && self.telegram.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_double_encoded_quotes() {
        let setting = Setting::new(SETTING_SUPPORT_WHATSAPP, json!("\"https://wa.me/5511\""));
        assert_eq!(setting.text(), "https://wa.me/5511");
    }

    #[test]
    fn support_links_ignore_other_keys() {
        let settings = vec![
            Setting::new(SETTING_SPREAD, json!(0.05)),
            Setting::new(SETTING_SUPPORT_TELEGRAM, json!("https://t.me/atlas")),
        ];
        let links = SupportLinks::from_settings(&settings);
        assert_eq!(links.telegram, "https://t.me/atlas");
        assert!(links.whatsapp.is_empty());
        assert!(!links.is_empty());
    }
}
