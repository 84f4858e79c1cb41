//! Hotkey descriptor parsing
//!
//! Turns a human-readable descriptor such as `"mod+shift+k"` into a
//! [`Hotkey`]. Parsing never fails: unknown or duplicated tokens degrade to a
//! descriptor that matches nothing, or matches a key the author did not
//! intend. Callers wanting strict validation must check descriptors first.

/// Tokens that name a modifier rather than a key
pub const RESERVED_TOKENS: [&str; 5] = ["alt", "ctrl", "meta", "shift", "mod"];

/// Modifier flags named by a descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet {
    /// Alt/Option is required
    pub alt: bool,
    /// Control is required
    pub ctrl: bool,
    /// Meta/Command/Super is required
    pub meta: bool,
    /// Platform primary modifier: Control or Meta, either one satisfies it.
    /// When set, `ctrl` and `meta` are not checked.
    pub r#mod: bool,
    /// Shift is required
    pub shift: bool,
}

impl ModifierSet {
    /// Check if no modifier is named
    pub fn is_empty(&self) -> bool {
        !self.alt && !self.ctrl && !self.meta && !self.r#mod && !self.shift
    }
}

/// Parsed descriptor: modifiers plus the single non-modifier key, lowercased
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: ModifierSet,
    /// `None` for modifier-only descriptors, which never match a key press
    pub key: Option<String>,
}

/// Parse a `+`-separated descriptor.
///
/// The whole string is lowercased and each token trimmed. A modifier flag is
/// set when its name appears as a token anywhere; the key is the first token
/// that is not a modifier name.
pub fn parse_hotkey(descriptor: &str) -> Hotkey {
    let lowered = descriptor.to_lowercase();
    let tokens: Vec<&str> = lowered.split('+').map(str::trim).collect();
    let has = |name: &str| tokens.contains(&name);

    let modifiers = ModifierSet {
        alt: has("alt"),
        ctrl: has("ctrl"),
        meta: has("meta"),
        r#mod: has("mod"),
        shift: has("shift"),
    };

    let key = tokens
        .iter()
        .find(|token| !RESERVED_TOKENS.contains(*token))
        .map(|token| token.to_string());

    Hotkey { modifiers, key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifiers_and_key() {
        let hotkey = parse_hotkey("mod+shift+k");
        assert_eq!(
            hotkey.modifiers,
            ModifierSet {
                r#mod: true,
                shift: true,
                ..ModifierSet::default()
            }
        );
        assert_eq!(hotkey.key.as_deref(), Some("k"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse_hotkey("mod+K"), parse_hotkey("MOD+k"));
        assert_eq!(parse_hotkey("Ctrl+Shift+S").key.as_deref(), Some("s"));
    }

    #[test]
    fn test_parse_trims_tokens() {
        let hotkey = parse_hotkey("  ctrl +  alt+ Delete ");
        assert!(hotkey.modifiers.ctrl);
        assert!(hotkey.modifiers.alt);
        assert_eq!(hotkey.key.as_deref(), Some("delete"));
    }

    #[test]
    fn test_token_order_does_not_matter() {
        assert_eq!(parse_hotkey("shift+k+alt"), parse_hotkey("alt+shift+k"));
    }

    #[test]
    fn test_modifier_only_has_no_key() {
        for descriptor in ["ctrl", "MOD+Shift", " alt + meta + ctrl + shift + mod ", "shift+SHIFT"] {
            assert_eq!(parse_hotkey(descriptor).key, None, "{descriptor}");
        }
    }

    #[test]
    fn test_first_free_token_wins() {
        let hotkey = parse_hotkey("ctrl+a+b");
        assert_eq!(hotkey.key.as_deref(), Some("a"));
    }

    #[test]
    fn test_unknown_tokens_are_permissive() {
        // "cmd" is not reserved, so it becomes the key
        let hotkey = parse_hotkey("cmd+k");
        assert!(hotkey.modifiers.is_empty());
        assert_eq!(hotkey.key.as_deref(), Some("cmd"));

        // Empty string yields an empty key token rather than an error
        assert_eq!(parse_hotkey("").key.as_deref(), Some(""));
    }

    #[test]
    fn test_empty_modifier_set() {
        assert!(ModifierSet::default().is_empty());
        assert!(!parse_hotkey("alt+x").modifiers.is_empty());
    }
}
