//! Placeholder substitution for rendered fragments.
//!
//! Emitted text carries portable `<<TOKEN>>` placeholders; each target
//! supplies a rule table that maps them onto its native expression
//! syntax. Substitution runs in a single scan, so a replacement value
//! that happens to contain `<<` is never rewritten again.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// Non-greedy body so adjacent tokens resolve independently.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<(.*?)>>").expect("literal pattern is valid"));

/// One target's placeholder dialect.
///
/// Lookup precedence: exact entries in `fixed`, then the `SECRET_`,
/// `ENV_` and `VAR_` prefix families, then the generic fallback. A token
/// always resolves to something; unknown names go through `generic`.
pub struct PlaceholderRules {
    /// Exact token to replacement text.
    pub fixed: &'static [(&'static str, &'static str)],
    /// `SECRET_<name>` family, applied to the stripped name.
    pub secret: fn(&str) -> String,
    /// `ENV_<name>` family, applied to the stripped name.
    pub env: fn(&str) -> String,
    /// `VAR_<name>` family, applied to the stripped name.
    pub var: fn(&str) -> String,
    /// Fallback for any other token name.
    pub generic: fn(&str) -> String,
}

impl PlaceholderRules {
    fn resolve(&self, token: &str) -> String {
        if let Some((_, replacement)) = self.fixed.iter().find(|(name, _)| *name == token) {
            return (*replacement).to_string();
        }
        if let Some(name) = token.strip_prefix("SECRET_") {
            return (self.secret)(name);
        }
        if let Some(name) = token.strip_prefix("ENV_") {
            return (self.env)(name);
        }
        if let Some(name) = token.strip_prefix("VAR_") {
            return (self.var)(name);
        }
        (self.generic)(token)
    }
}

/// Replace every `<<TOKEN>>` in `text` according to `rules`.
#[must_use]
pub fn substitute<'a>(text: &'a str, rules: &PlaceholderRules) -> Cow<'a, str> {
    PLACEHOLDER.replace_all(text, |captures: &regex::Captures<'_>| {
        rules.resolve(&captures[1])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    static RULES: PlaceholderRules = PlaceholderRules {
        fixed: &[("PIPELINE_ID", "${CI_PIPELINE_ID}")],
        secret: |name| format!("secret({name})"),
        env: |name| format!("env({name})"),
        var: |name| format!("var({name})"),
        generic: |name| format!("plain({name})"),
    };

    #[test]
    fn fixed_tokens_win_over_families() {
        assert_eq!(
            substitute("id=<<PIPELINE_ID>>", &RULES),
            "id=${CI_PIPELINE_ID}"
        );
    }

    #[test]
    fn prefix_families_strip_their_prefix() {
        assert_eq!(substitute("<<SECRET_TOKEN>>", &RULES), "secret(TOKEN)");
        assert_eq!(substitute("<<ENV_HOME>>", &RULES), "env(HOME)");
        assert_eq!(substitute("<<VAR_REGION>>", &RULES), "var(REGION)");
    }

    #[test]
    fn unknown_tokens_fall_back_to_generic() {
        assert_eq!(substitute("<<SOMETHING>>", &RULES), "plain(SOMETHING)");
    }

    #[test]
    fn adjacent_tokens_resolve_independently() {
        assert_eq!(
            substitute("<<PIPELINE_ID>>-<<ENV_X>>", &RULES),
            "${CI_PIPELINE_ID}-env(X)"
        );
    }

    #[test]
    fn replacement_text_is_never_rescanned() {
        static LOOPY: PlaceholderRules = PlaceholderRules {
            fixed: &[("A", "<<A>>")],
            secret: str::to_string,
            env: str::to_string,
            var: str::to_string,
            generic: str::to_string,
        };
        assert_eq!(substitute("<<A>>", &LOOPY), "<<A>>");
    }

    #[test]
    fn text_without_tokens_is_borrowed() {
        let text = "stages:\n  - build";
        assert!(matches!(substitute(text, &RULES), Cow::Borrowed(_)));
    }
}
