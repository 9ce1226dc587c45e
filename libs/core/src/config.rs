use serde::{Deserialize, Serialize};
use std::env;

/// Platform cardinality limits applied during validation.
///
/// ```
/// use kskill_core::SkillLimits;
///
/// let limits = SkillLimits::default();
/// assert_eq!(limits.list_card_max_items, 5);
/// assert_eq!(limits.carousel_list_card_max_items, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillLimits {
    pub max_outputs: usize,
    pub max_quick_replies: usize,
    pub list_card_max_items: usize,
    pub list_card_max_buttons: usize,
    pub carousel_list_card_max_items: usize,
    pub event_max_users: usize,
}

impl Default for SkillLimits {
    fn default() -> Self {
        Self {
            max_outputs: 3,
            max_quick_replies: 10,
            list_card_max_items: 5,
            list_card_max_buttons: 2,
            carousel_list_card_max_items: 4,
            event_max_users: 100,
        }
    }
}

impl SkillLimits {
    /// Reads `KAKAO_SKILL_*` overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SkillLimits::from_env`] with an explicit variable source.
    /// Unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, fallback: usize| {
            lookup(key)
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .unwrap_or(fallback)
        };
        Self {
            max_outputs: read("KAKAO_SKILL_MAX_OUTPUTS", defaults.max_outputs),
            max_quick_replies: read("KAKAO_SKILL_MAX_QUICK_REPLIES", defaults.max_quick_replies),
            list_card_max_items: read(
                "KAKAO_SKILL_LIST_CARD_MAX_ITEMS",
                defaults.list_card_max_items,
            ),
            list_card_max_buttons: read(
                "KAKAO_SKILL_LIST_CARD_MAX_BUTTONS",
                defaults.list_card_max_buttons,
            ),
            carousel_list_card_max_items: read(
                "KAKAO_SKILL_CAROUSEL_LIST_CARD_MAX_ITEMS",
                defaults.carousel_list_card_max_items,
            ),
            event_max_users: read("KAKAO_SKILL_EVENT_MAX_USERS", defaults.event_max_users),
        }
    }
}

/// Hosts used to build event API URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventApiConfig {
    pub host: String,
    pub dev_host: String,
}

impl Default for EventApiConfig {
    fn default() -> Self {
        Self {
            host: "bot-api.kakao.com".into(),
            dev_host: "dev-bot-api.kakao.com".into(),
        }
    }
}

impl EventApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, fallback: String| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .unwrap_or(fallback)
        };
        Self {
            host: read("KAKAO_EVENT_API_HOST", defaults.host),
            dev_host: read("KAKAO_EVENT_API_DEV_HOST", defaults.dev_host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn limits_read_overrides_and_ignore_garbage() {
        let limits = SkillLimits::from_lookup(lookup_from(&[
            ("KAKAO_SKILL_LIST_CARD_MAX_ITEMS", "4"),
            ("KAKAO_SKILL_MAX_OUTPUTS", "lots"),
        ]));
        assert_eq!(limits.list_card_max_items, 4);
        assert_eq!(limits.max_outputs, 3);
        assert_eq!(limits.event_max_users, 100);
    }

    #[test]
    fn limits_deserialize_with_defaults() {
        let limits: SkillLimits =
            serde_json::from_str(r#"{"event_max_users": 10}"#).expect("limits");
        assert_eq!(limits.event_max_users, 10);
        assert_eq!(limits.list_card_max_buttons, 2);
    }

    #[test]
    fn event_hosts_fall_back_on_blank_values() {
        let config = EventApiConfig::from_lookup(lookup_from(&[
            ("KAKAO_EVENT_API_HOST", "  "),
            ("KAKAO_EVENT_API_DEV_HOST", "dev.example.test"),
        ]));
        assert_eq!(config.host, "bot-api.kakao.com");
        assert_eq!(config.dev_host, "dev.example.test");
    }
}
