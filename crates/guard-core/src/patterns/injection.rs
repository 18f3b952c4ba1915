//! Prompt-injection / jailbreak pattern table.
//!
//! Covers role-escape directives, bracketed role tags, and known jailbreak
//! tokens. The compiled-in defaults carry both the English phrasing and the
//! Russian-language variants used in the deployed user base (the source this
//! ruleset was distilled from is a Russian-locale deployment) — a curated
//! baseline, not just English, since these are named as part of the spec's
//! pattern set rather than left to an optional overlay. Further locales are
//! added the same way, by extending the YAML overlay.

use super::PatternRule;

pub fn default_injection_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new(
            "role-escape-forget",
            r"(?i)\b(?:forget|ignore|disregard)\s+(?:all\s+|any\s+)?(?:previous|prior|above|earlier)\s+(?:instructions?|prompts?|rules?|context)\b",
            "Role-escape directive",
        ),
        PatternRule::new(
            "role-escape-forget-ru",
            r"(?i)\b(?:забудь|игнорируй|не\s+учитывай)\s+(?:все\s+|любые\s+)?(?:предыдущ\w*|прошл\w*|вышеуказанн\w*|предшествующ\w*)\s+(?:инструкци\w*|указани\w*|правил\w*|промпт\w*|контекст\w*)\b",
            "Role-escape directive",
        ),
        PatternRule::new(
            "role-escape-new-instructions",
            r"(?i)\byour\s+new\s+(?:instructions?|rules?|system\s+prompt)\s+(?:are|is)\b",
            "Role-escape directive",
        ),
        PatternRule::new(
            "role-escape-new-instructions-ru",
            r"(?i)\b(?:твои|твоя|твой)\s+нов\w+\s+(?:инструкци\w*|правил\w*|системн\w+\s+промпт\w*)\b",
            "Role-escape directive",
        ),
        PatternRule::new(
            "bracketed-role-tag",
            r"(?i)\[\s*(?:system|admin|developer|root)\s*\]",
            "Bracketed role tag",
        ),
        PatternRule::new(
            "dan-jailbreak",
            r"(?i)\bDAN\s+mode\b|\bdo\s+anything\s+now\b|\bjailbreak\s+mode\b",
            "Known jailbreak token",
        ),
        PatternRule::new(
            "dan-jailbreak-ru",
            r"(?i)\bрежим\w*\s+(?:без\s+ограничени\w*|джейлбрейк\w*)\b|\bты\s+теперь\s+без\s+правил\b|\bджейлбрейк[- ]режим\w*\b",
            "Known jailbreak token",
        ),
        PatternRule::new(
            "pretend-no-restrictions",
            r"(?i)\bpretend\s+(?:you\s+)?(?:have\s+no|there\s+are\s+no)\s+(?:restrictions|rules|guidelines|filters)\b",
            "Role-escape directive",
        ),
        PatternRule::new(
            "pretend-no-restrictions-ru",
            r"(?i)\bпритворись\W+что\s+(?:у\s+тебя\s+нет|нет)\s+(?:ограничени\w*|правил\w*|фильтр\w*)\b",
            "Role-escape directive",
        ),
        PatternRule::new(
            "reveal-system-prompt",
            r"(?i)\b(?:reveal|print|repeat|show)\s+(?:your\s+)?(?:system\s+prompt|initial\s+instructions)\b",
            "System-prompt exfiltration attempt",
        ),
        PatternRule::new(
            "reveal-system-prompt-ru",
            r"(?i)\b(?:покажи|повтори|выведи)\s+(?:свой\s+|твой\s+)?(?:системн\w+\s+промпт\w*|исходн\w+\s+инструкци\w*)\b",
            "System-prompt exfiltration attempt",
        ),
    ]
}
