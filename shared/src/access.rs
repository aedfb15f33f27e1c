//! Dashboard access sequence
//!
//! The storefront has no visible dashboard link. Typing a secret key sequence
//! anywhere outside a text field routes to the dashboard (or its login page).

use serde::{Deserialize, Serialize};

pub const DEFAULT_SEQUENCE: &str = "cderf";
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

pub const DASHBOARD_ROUTE: &str = "/dashboard";
pub const LOGIN_ROUTE: &str = "/dashboard/login";

/// Where the key event originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTarget {
    /// Page body or any non-editable element
    Page,
    Input,
    TextArea,
    ContentEditable,
}

impl KeyTarget {
    pub fn is_editable(&self) -> bool {
        !matches!(self, Self::Page)
    }
}

/// Route the detector navigates to when it fires
pub fn access_route(authenticated: bool) -> &'static str {
    if authenticated {
        DASHBOARD_ROUTE
    } else {
        LOGIN_ROUTE
    }
}

/// Detector settings published to the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub sequence: String,
    pub timeout_ms: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            sequence: DEFAULT_SEQUENCE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Rolling keystroke buffer
#[derive(Debug, Clone)]
pub struct SequenceDetector {
    sequence: String,
    timeout_ms: u64,
    buffer: String,
    last_key_at: Option<u64>,
}

impl SequenceDetector {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            sequence: config.sequence.to_lowercase(),
            timeout_ms: config.timeout_ms,
            buffer: String::new(),
            last_key_at: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Feed one key event at `now_ms`. Returns true when the sequence
    /// completes; the buffer is reset in that case.
    pub fn press(&mut self, key: &str, target: KeyTarget, now_ms: u64) -> bool {
        if target.is_editable() {
            return false;
        }

        if let Some(last) = self.last_key_at
            && now_ms.saturating_sub(last) >= self.timeout_ms
        {
            self.buffer.clear();
        }
        self.last_key_at = Some(now_ms);

        self.buffer.push_str(&key.to_lowercase());
        let keep = self.sequence.chars().count();
        let len = self.buffer.chars().count();
        if len > keep {
            self.buffer = self.buffer.chars().skip(len - keep).collect();
        }

        if !self.sequence.is_empty() && self.buffer == self.sequence {
            self.buffer.clear();
            return true;
        }
        false
    }

    /// Inactivity check without a key event
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(last) = self.last_key_at
            && now_ms.saturating_sub(last) >= self.timeout_ms
        {
            self.buffer.clear();
            self.last_key_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_keys(d: &mut SequenceDetector, keys: &str, start: u64) -> Vec<bool> {
        keys.chars()
            .enumerate()
            .map(|(i, c)| d.press(&c.to_string(), KeyTarget::Page, start + i as u64 * 100))
            .collect()
    }

    #[test]
    fn fires_on_sequence_and_resets() {
        let mut d = SequenceDetector::new(&AccessConfig::default());
        let fired = type_keys(&mut d, "cderf", 0);
        assert_eq!(fired, vec![false, false, false, false, true]);
        assert_eq!(d.buffer(), "");
    }

    #[test]
    fn keeps_only_last_characters() {
        let mut d = SequenceDetector::new(&AccessConfig::default());
        let fired = type_keys(&mut d, "xxxcderf", 0);
        assert_eq!(fired.last(), Some(&true));

        type_keys(&mut d, "abcdefg", 10_000);
        assert_eq!(d.buffer(), "cdefg");
    }

    #[test]
    fn uppercase_keys_count() {
        let mut d = SequenceDetector::new(&AccessConfig::default());
        let fired = type_keys(&mut d, "CDERF", 0);
        assert_eq!(fired.last(), Some(&true));
    }

    #[test]
    fn editable_targets_ignored() {
        let mut d = SequenceDetector::new(&AccessConfig::default());
        type_keys(&mut d, "cde", 0);
        assert!(!d.press("r", KeyTarget::Input, 300));
        assert!(!d.press("r", KeyTarget::TextArea, 350));
        assert!(!d.press("r", KeyTarget::ContentEditable, 360));
        assert_eq!(d.buffer(), "cde");
        assert!(!d.press("r", KeyTarget::Page, 400));
        assert!(d.press("f", KeyTarget::Page, 500));
    }

    #[test]
    fn inactivity_resets_buffer() {
        let mut d = SequenceDetector::new(&AccessConfig::default());
        type_keys(&mut d, "cde", 0);
        assert!(!d.press("r", KeyTarget::Page, 2_200));
        assert_eq!(d.buffer(), "r");

        d.tick(10_000);
        assert_eq!(d.buffer(), "");
    }

    #[test]
    fn named_keys_push_out_characters() {
        let mut d = SequenceDetector::new(&AccessConfig::default());
        type_keys(&mut d, "cder", 0);
        d.press("Shift", KeyTarget::Page, 450);
        assert_eq!(d.buffer(), "shift");
        assert!(!d.press("f", KeyTarget::Page, 500));
    }

    #[test]
    fn custom_sequence_and_timeout() {
        let config = AccessConfig {
            sequence: "OPEN".into(),
            timeout_ms: 500,
        };
        let mut d = SequenceDetector::new(&config);
        assert_eq!(
            type_keys(&mut d, "open", 0),
            vec![false, false, false, true]
        );
        d.press("o", KeyTarget::Page, 1_000);
        d.press("p", KeyTarget::Page, 1_600);
        assert_eq!(d.buffer(), "p");
    }

    #[test]
    fn route_depends_on_session() {
        assert_eq!(access_route(true), "/dashboard");
        assert_eq!(access_route(false), "/dashboard/login");
    }
}
