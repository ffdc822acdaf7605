//! Shell prompt derivation.
//!
//! The switch announces its prompt once, right after login; every prompt
//! form used later in the session is derived from that single announcement.

use regex::bytes::Regex;

/// The three prompt forms a PowerConnect console sits at.
///
/// All are regex-escaped literals of the announced prompt, so a prompt
/// containing regex metacharacters still matches exactly.
#[derive(Debug)]
pub struct PromptSet {
    raw: String,
    main: Regex,
    config: Regex,
    interface_config: Regex,
}

impl PromptSet {
    /// Derive the prompt set from the announced prompt text.
    ///
    /// `announced` is whatever the locate pattern matched; leading newlines
    /// and surrounding whitespace are trimmed away. The config and
    /// interface-config forms replace the trailing `#` with `(config)#` and
    /// `(config-if)#` respectively.
    pub fn derive(announced: &str) -> Result<Self, regex::Error> {
        let raw = announced.trim().to_string();
        let stem = raw.strip_suffix('#').unwrap_or(&raw);

        let main = Regex::new(&regex::escape(&raw))?;
        let config = Regex::new(&regex::escape(&format!("{stem}(config)#")))?;
        let interface_config = Regex::new(&regex::escape(&format!("{stem}(config-if)#")))?;

        Ok(Self {
            raw,
            main,
            config,
            interface_config,
        })
    }

    /// The prompt exactly as the switch announced it, trimmed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Literal pattern for the top-level shell prompt.
    pub fn main(&self) -> &Regex {
        &self.main
    }

    /// Literal pattern for the `(config)#` prompt.
    pub fn config(&self) -> &Regex {
        &self.config
    }

    /// Literal pattern for the `(config-if)#` prompt.
    pub fn interface_config(&self) -> &Regex {
        &self.interface_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_three_forms_from_banner() {
        let prompts = PromptSet::derive("\r\nswitch1#").unwrap();

        assert_eq!(prompts.raw(), "switch1#");
        assert!(prompts.main().is_match(b"switch1#"));
        assert!(prompts.config().is_match(b"switch1(config)#"));
        assert!(prompts.interface_config().is_match(b"switch1(config-if)#"));
    }

    #[test]
    fn metacharacters_match_literally() {
        let prompts = PromptSet::derive(" sw.1*# ").unwrap();

        assert!(prompts.main().is_match(b"sw.1*#"));
        assert!(!prompts.main().is_match(b"swX1*#"));
        assert!(prompts.config().is_match(b"sw.1*(config)#"));
        assert!(!prompts.config().is_match(b"swX1*(config)#"));
    }

    #[test]
    fn config_forms_do_not_match_main_prompt() {
        let prompts = PromptSet::derive("switch1#").unwrap();

        assert!(!prompts.config().is_match(b"switch1#"));
        assert!(!prompts.interface_config().is_match(b"switch1(config)#"));
    }

    #[test]
    fn prompt_without_trailing_hash_keeps_its_stem() {
        // Unreachable through login (the locate pattern requires `#`), but
        // derivation stays total.
        let prompts = PromptSet::derive("oddprompt").unwrap();
        assert!(prompts.config().is_match(b"oddprompt(config)#"));
    }
}
