//! Interactive configuration for terminal sessions
//!
//! Used when required variables are missing and stdin is a terminal.
//! Values already present in the environment are kept and not asked for.

use dialoguer::{Input, Password};
use ipsync_core::config::env;
use ipsync_core::{ConfigSource, Error, RawSettings, Result, RunConfig};

/// Reads one answer per question
pub trait Prompter {
    /// Ask for a value without echoing it
    fn secret(&self, label: &str) -> Result<String>;

    /// Ask for a value; a blank answer yields `default` when there is one
    fn text(&self, label: &str, default: Option<&str>) -> Result<String>;
}

/// Prompts on the controlling terminal
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn secret(&self, label: &str) -> Result<String> {
        Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| Error::config(format!("Failed to read {}: {}", label, e)))
    }

    fn text(&self, label: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(label).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input
            .interact_text()
            .map_err(|e| Error::config(format!("Failed to read {}: {}", label, e)))
    }
}

/// Fills the gaps in environment settings by asking on the terminal
pub struct PromptConfigSource<P = TerminalPrompter> {
    base: RawSettings,
    prompter: P,
}

impl PromptConfigSource {
    pub fn new(base: RawSettings) -> Self {
        Self::with_prompter(base, TerminalPrompter)
    }
}

impl<P: Prompter> PromptConfigSource<P> {
    pub fn with_prompter(base: RawSettings, prompter: P) -> Self {
        Self { base, prompter }
    }
}

impl<P: Prompter> ConfigSource for PromptConfigSource<P> {
    fn load(&self) -> Result<RunConfig> {
        eprintln!("Interactive setup (press Enter to accept defaults)");
        prompt_settings(self.base.clone(), &self.prompter)?.into_config()
    }
}

/// Ask for every unset value; blank answers take the default
pub fn prompt_settings(mut raw: RawSettings, prompter: &impl Prompter) -> Result<RawSettings> {
    if is_unset(&raw.api_token) {
        raw.api_token = non_blank(prompter.secret(env::API_TOKEN)?, None);
    }

    ask_if_unset(&mut raw.new_ip, env::NEW_IP, None, prompter)?;
    ask_if_unset(&mut raw.old_ip, env::OLD_IP, None, prompter)?;
    ask_if_unset(&mut raw.target_domain, env::TARGET_DOMAIN, None, prompter)?;
    ask_if_unset(&mut raw.dry_run, env::DRY_RUN, Some("1"), prompter)?;
    ask_if_unset(&mut raw.debug, env::DEBUG, Some("0"), prompter)?;
    ask_if_unset(&mut raw.censor, env::CENSOR, Some("1"), prompter)?;

    Ok(raw)
}

fn ask_if_unset(
    slot: &mut Option<String>,
    label: &str,
    default: Option<&str>,
    prompter: &impl Prompter,
) -> Result<()> {
    if is_unset(slot) {
        *slot = non_blank(prompter.text(label, default)?, default);
    }
    Ok(())
}

fn is_unset(slot: &Option<String>) -> bool {
    slot.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn non_blank(answer: String, default: Option<&str>) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        default.map(str::to_string)
    } else {
        Some(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned answers and records what was asked
    #[derive(Default)]
    struct ScriptedPrompter {
        answers: RefCell<VecDeque<&'static str>>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().copied().collect()),
                asked: RefCell::default(),
            }
        }

        fn next(&self) -> String {
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_default()
                .to_string()
        }

        fn asked(&self) -> Vec<String> {
            self.asked.borrow().clone()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn secret(&self, label: &str) -> Result<String> {
            self.asked.borrow_mut().push(format!("{} (hidden)", label));
            Ok(self.next())
        }

        fn text(&self, label: &str, default: Option<&str>) -> Result<String> {
            let question = match default {
                Some(d) => format!("{} [{}]", label, d),
                None => label.to_string(),
            };
            self.asked.borrow_mut().push(question);
            Ok(self.next())
        }
    }

    #[test]
    fn asks_for_everything_and_applies_defaults() {
        let prompter = ScriptedPrompter::new(&[
            "tok-abcdefghijklmnop",
            "203.0.113.7",
            "",
            "example.com",
            "",
            "",
            "0",
        ]);

        let raw = prompt_settings(RawSettings::default(), &prompter).unwrap();

        assert_eq!(raw.api_token.as_deref(), Some("tok-abcdefghijklmnop"));
        assert_eq!(raw.new_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(raw.old_ip, None);
        assert_eq!(raw.target_domain.as_deref(), Some("example.com"));
        assert_eq!(raw.dry_run.as_deref(), Some("1"));
        assert_eq!(raw.debug.as_deref(), Some("0"));
        assert_eq!(raw.censor.as_deref(), Some("0"));

        let config = raw.into_config().unwrap();
        assert!(config.dry_run);
        assert!(!config.censor);

        let asked = prompter.asked();
        assert_eq!(asked[0], "CLOUDFLARE_API_TOKEN (hidden)");
        assert!(asked.contains(&"DRY_RUN [1]".to_string()));
        assert!(asked.contains(&"NEW_IP".to_string()));
    }

    #[test]
    fn token_is_only_read_as_a_secret() {
        let prompter = ScriptedPrompter::new(&["tok-abcdefghijklmnop"]);
        prompt_settings(RawSettings::default(), &prompter).unwrap();

        let asked = prompter.asked();
        let token_questions: Vec<_> = asked
            .iter()
            .filter(|q| q.starts_with(env::API_TOKEN))
            .collect();
        assert_eq!(token_questions, vec!["CLOUDFLARE_API_TOKEN (hidden)"]);
    }

    #[test]
    fn keeps_values_already_set() {
        let base = RawSettings {
            api_token: Some("tok-from-env-abcdefgh".to_string()),
            dry_run: Some("0".to_string()),
            ..RawSettings::default()
        };
        let prompter = ScriptedPrompter::new(&["198.51.100.1"]);

        let raw = prompt_settings(base, &prompter).unwrap();

        assert_eq!(raw.api_token.as_deref(), Some("tok-from-env-abcdefgh"));
        assert_eq!(raw.dry_run.as_deref(), Some("0"));
        assert_eq!(raw.new_ip.as_deref(), Some("198.51.100.1"));
        assert_eq!(
            prompter.asked(),
            vec!["NEW_IP", "OLD_IP", "TARGET_DOMAIN", "DEBUG [0]", "CENSOR [1]"]
        );
    }

    #[test]
    fn blank_answers_leave_required_values_missing() {
        let prompter = ScriptedPrompter::default();

        let raw = prompt_settings(RawSettings::default(), &prompter).unwrap();
        assert_eq!(raw.missing_required().len(), 2);
        assert!(raw.into_config().is_err());
    }

    #[test]
    fn config_source_uses_the_prompter() {
        let base = RawSettings {
            new_ip: Some("203.0.113.9".to_string()),
            ..RawSettings::default()
        };
        let source = PromptConfigSource::with_prompter(
            base,
            ScriptedPrompter::new(&["tok-abcdefghijklmnop"]),
        );

        let config = source.load().unwrap();
        assert_eq!(config.desired_ip, "203.0.113.9");
        assert!(config.dry_run);
        assert!(config.censor);
    }
}
