//! Provider pricing pages and their best-effort parsers.
//!
//! Almost every pricing page is rendered client-side, so a static fetch sees
//! little more than a shell. The parsers note what they can recognise and
//! return an empty update set rather than guess at prices.

use crate::pricing::merge::UpdateSet;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::info;

static DEEPSEEK_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$(\d+\.?\d*)\s*(?:per|/)\s*(?:million|1M|MTok)").unwrap()
});

static OPENAI_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:GPT-4o(?:-mini)?|GPT-4\.1(?:\s+(?:Mini|Nano))?|o[13](?:-mini)?)").unwrap()
});

/// A page parser: raw page text in, observed prices out
pub type PageParser = fn(&str) -> UpdateSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Google,
    Mistral,
    DeepSeek,
    Cohere,
    Fireworks,
}

impl Provider {
    /// Fetch order
    pub const ALL: [Provider; 7] = [
        Provider::OpenAI,
        Provider::Anthropic,
        Provider::Google,
        Provider::Mistral,
        Provider::DeepSeek,
        Provider::Cohere,
        Provider::Fireworks,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Mistral => "mistral",
            Provider::DeepSeek => "deepseek",
            Provider::Cohere => "cohere",
            Provider::Fireworks => "meta_fireworks",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Google => "Google",
            Provider::Mistral => "Mistral",
            Provider::DeepSeek => "DeepSeek",
            Provider::Cohere => "Cohere",
            Provider::Fireworks => "Fireworks",
        }
    }

    pub fn pricing_url(self) -> &'static str {
        match self {
            Provider::OpenAI => "https://openai.com/api/pricing/",
            Provider::Anthropic => "https://docs.anthropic.com/en/docs/about-claude/models",
            Provider::Google => "https://ai.google.dev/gemini-api/docs/pricing",
            Provider::Mistral => "https://mistral.ai/pricing",
            Provider::DeepSeek => "https://api-docs.deepseek.com/quick_start/pricing",
            Provider::Cohere => "https://cohere.com/pricing",
            Provider::Fireworks => "https://fireworks.ai/pricing",
        }
    }

    pub fn parser(self) -> PageParser {
        match self {
            Provider::OpenAI => parse_openai,
            Provider::Anthropic => parse_anthropic,
            Provider::Google => parse_google,
            Provider::Mistral => parse_mistral,
            Provider::DeepSeek => parse_deepseek,
            Provider::Cohere => parse_cohere,
            Provider::Fireworks => parse_fireworks,
        }
    }

    pub fn parse(self, page: &str) -> UpdateSet {
        (self.parser())(page)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn manual_review(provider: Provider) -> UpdateSet {
    info!(
        "{} parser: page fetched, manual review recommended",
        provider.display_name()
    );
    UpdateSet::new()
}

pub fn parse_openai(page: &str) -> UpdateSet {
    let mentions = count_openai_models(page);
    if mentions > 0 {
        info!(
            "OpenAI parser: found {} model mentions, manual review recommended",
            mentions
        );
        UpdateSet::new()
    } else {
        manual_review(Provider::OpenAI)
    }
}

pub fn parse_anthropic(_page: &str) -> UpdateSet {
    manual_review(Provider::Anthropic)
}

pub fn parse_google(_page: &str) -> UpdateSet {
    manual_review(Provider::Google)
}

pub fn parse_mistral(_page: &str) -> UpdateSet {
    manual_review(Provider::Mistral)
}

pub fn parse_deepseek(page: &str) -> UpdateSet {
    let references = count_price_references(page);
    if references > 0 {
        info!(
            "DeepSeek parser: found {} price references, manual review recommended",
            references
        );
        UpdateSet::new()
    } else {
        manual_review(Provider::DeepSeek)
    }
}

pub fn parse_cohere(_page: &str) -> UpdateSet {
    manual_review(Provider::Cohere)
}

pub fn parse_fireworks(_page: &str) -> UpdateSet {
    manual_review(Provider::Fireworks)
}

/// `$0.28 per million tokens`, `$1.10/1M`, `$2 / MTok`
pub fn count_price_references(page: &str) -> usize {
    DEEPSEEK_PRICE_RE.find_iter(page).count()
}

pub fn count_openai_models(page: &str) -> usize {
    OPENAI_MODEL_RE.find_iter(page).count()
}
