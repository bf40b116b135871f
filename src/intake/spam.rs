//! Heuristic spam screening for public application submissions.
//!
//! A deterministic rule evaluator, not a classifier: rules are checked in a
//! fixed order and the first hit decides the verdict. Rule data is static and
//! compiled in.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

pub const REASON_HONEYPOT: &str = "Honeypot field was filled";
pub const REASON_URL_IN_NAME: &str = "Name contains a URL";
pub const REASON_DISPOSABLE_DOMAIN: &str = "Disposable email domain";
pub const REASON_ALL_CAPS_NAME: &str = "Name is all uppercase";
pub const REASON_SPAM_PHRASE: &str = "Cover letter contains spam phrase";

const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "guerrillamail.de",
    "sharklasers.com",
    "10minutemail.com",
    "temp-mail.org",
    "tempmail.com",
    "throwaway.email",
    "yopmail.com",
    "getnada.com",
    "maildrop.cc",
    "trashmail.com",
    "dispostable.com",
    "fakeinbox.com",
    "mintemail.com",
];

const SPAM_PHRASES: &[&str] = &[
    "make money fast",
    "work from home and earn",
    "click here",
    "limited time offer",
    "guaranteed income",
    "crypto investment",
    "forex signals",
    "seo services",
    "buy backlinks",
    "increase your traffic",
    "100% free",
    "no experience necessary $$$",
];

const URL_MARKERS: &[&str] = &["http://", "https://", "www."];

/// Fields of a public submission relevant to the spam rules.
#[derive(Debug, Clone, Copy)]
pub struct SpamCheckInput<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub cover_letter: Option<&'a str>,
    /// Hidden form field; humans never fill it.
    pub honeypot: Option<&'a str>,
}

/// Outcome of the rule evaluation plus the resolved client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpamVerdict {
    pub spam: bool,
    pub reasons: Vec<&'static str>,
    pub client_ip: Option<IpAddr>,
}

impl SpamVerdict {
    fn clean(client_ip: Option<IpAddr>) -> Self {
        Self {
            spam: false,
            reasons: Vec::new(),
            client_ip,
        }
    }

    fn flagged(reason: &'static str, client_ip: Option<IpAddr>) -> Self {
        Self {
            spam: true,
            reasons: vec![reason],
            client_ip,
        }
    }
}

/// Stateless evaluator over the static rule sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpamFilter;

impl SpamFilter {
    pub fn evaluate(&self, input: SpamCheckInput<'_>, client_ip: Option<IpAddr>) -> SpamVerdict {
        if input
            .honeypot
            .is_some_and(|value| !value.trim().is_empty())
        {
            return SpamVerdict::flagged(REASON_HONEYPOT, client_ip);
        }

        let combined = format!("{} {}", input.first_name, input.last_name);
        let lowered = combined.to_ascii_lowercase();
        if URL_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            return SpamVerdict::flagged(REASON_URL_IN_NAME, client_ip);
        }

        if let Some(domain) = input.email.rsplit_once('@').map(|(_, domain)| domain) {
            let domain = domain.trim().to_ascii_lowercase();
            if DISPOSABLE_DOMAINS.contains(&domain.as_str()) {
                return SpamVerdict::flagged(REASON_DISPOSABLE_DOMAIN, client_ip);
            }
        }

        let letters: Vec<char> = combined.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() > 4 && letters.iter().all(|c| c.is_uppercase()) {
            return SpamVerdict::flagged(REASON_ALL_CAPS_NAME, client_ip);
        }

        if let Some(cover) = input.cover_letter {
            let lowered = cover.to_ascii_lowercase();
            if SPAM_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
                return SpamVerdict::flagged(REASON_SPAM_PHRASE, client_ip);
            }
        }

        SpamVerdict::clean(client_ip)
    }
}

/// Resolve the client address: first `X-Forwarded-For` entry when parseable,
/// else the socket peer address.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|entry| entry.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| peer.map(|addr| addr.ip()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn input<'a>() -> SpamCheckInput<'a> {
        SpamCheckInput {
            first_name: "Ada",
            last_name: "Lovelace",
            email: "ada@example.com",
            cover_letter: Some("I enjoy building compilers."),
            honeypot: None,
        }
    }

    #[test]
    fn clean_submission_passes() {
        let verdict = SpamFilter.evaluate(input(), None);
        assert!(!verdict.spam);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn honeypot_always_wins() {
        let mut spammy = input();
        spammy.honeypot = Some("gotcha");
        // Even an otherwise pristine submission is rejected.
        let verdict = SpamFilter.evaluate(spammy, None);
        assert!(verdict.spam);
        assert_eq!(verdict.reasons, vec![REASON_HONEYPOT]);
    }

    #[test]
    fn whitespace_honeypot_is_ignored() {
        let mut form = input();
        form.honeypot = Some("   ");
        assert!(!SpamFilter.evaluate(form, None).spam);
    }

    #[test]
    fn url_in_name_is_spam() {
        let mut form = input();
        form.last_name = "www.cheap-seo.biz";
        let verdict = SpamFilter.evaluate(form, None);
        assert_eq!(verdict.reasons, vec![REASON_URL_IN_NAME]);
    }

    #[test]
    fn disposable_domain_is_spam() {
        let mut form = input();
        form.email = "user@mailinator.com";
        let verdict = SpamFilter.evaluate(form, None);
        assert!(verdict.spam);
        assert_eq!(verdict.reasons, vec![REASON_DISPOSABLE_DOMAIN]);
    }

    #[test]
    fn all_caps_name_is_spam() {
        let mut form = input();
        form.first_name = "JOHN";
        form.last_name = "SMITH";
        let verdict = SpamFilter.evaluate(form, None);
        assert_eq!(verdict.reasons, vec![REASON_ALL_CAPS_NAME]);
    }

    #[test]
    fn short_all_caps_name_is_allowed() {
        let mut form = input();
        form.first_name = "AJ";
        form.last_name = "Li";
        assert!(!SpamFilter.evaluate(form, None).spam);
    }

    #[test]
    fn spam_phrase_in_cover_letter() {
        let mut form = input();
        form.cover_letter = Some("You can Make Money FAST with this role");
        let verdict = SpamFilter.evaluate(form, None);
        assert_eq!(verdict.reasons, vec![REASON_SPAM_PHRASE]);
    }

    #[test]
    fn honeypot_short_circuits_other_rules() {
        let mut form = input();
        form.honeypot = Some("bot");
        form.email = "user@mailinator.com";
        let verdict = SpamFilter.evaluate(form, None);
        assert_eq!(verdict.reasons, vec![REASON_HONEYPOT]);
    }

    #[test]
    fn forwarded_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let peer: SocketAddr = "192.0.2.1:55320".parse().unwrap();
        let ip = resolve_client_ip(&headers, Some(peer));
        assert_eq!(ip, Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn falls_back_to_peer_address() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.1:55320".parse().unwrap();
        assert_eq!(
            resolve_client_ip(&headers, Some(peer)),
            Some("192.0.2.1".parse().unwrap())
        );
        assert_eq!(resolve_client_ip(&headers, None), None);

        let mut garbage = HeaderMap::new();
        garbage.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(
            resolve_client_ip(&garbage, Some(peer)),
            Some("192.0.2.1".parse().unwrap())
        );
    }
}
