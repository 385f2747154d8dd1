//! Subdomain and email extraction from raw tool output.
//!
//! Matching is purely textual. Anything shaped like `<labels>.<domain>` or
//! `<local>@<domain>` is taken, so incidental substrings (for instance
//! `example.com` inside `notexample.com`) are reported too.

use crate::error::ScanError;
use crate::models::{Domain, ExtractedEntities};
use regex::Regex;

/// Compiled patterns for one target domain.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    subdomain: Regex,
    email: Regex,
}

impl EntityExtractor {
    /// Build the patterns for a domain.
    ///
    /// The domain is matched literally and case-sensitively, so it must
    /// already be lowercase (which `Domain` guarantees).
    pub fn for_domain(domain: &Domain) -> Result<Self, ScanError> {
        let escaped = regex::escape(domain.as_str());

        // Optional dotted prefix; a bare occurrence of the domain also matches.
        let subdomain = Regex::new(&format!(r"(?:[\w.-]+\.)?{}", escaped))
            .map_err(|e| ScanError::InvalidInput(format!("{}: {}", domain, e)))?;
        let email = Regex::new(&format!(r"[a-zA-Z0-9_.+-]+@{}", escaped))
            .map_err(|e| ScanError::InvalidInput(format!("{}: {}", domain, e)))?;

        Ok(Self { subdomain, email })
    }

    /// Extract subdomains and emails from one tool's output.
    pub fn extract(&self, output: &str) -> ExtractedEntities {
        ExtractedEntities {
            subdomains: self
                .subdomain
                .find_iter(output)
                .map(|m| m.as_str().to_string())
                .collect(),
            emails: self
                .email
                .find_iter(output)
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(output: &str, domain: &Domain) -> Result<ExtractedEntities, ScanError> {
        Ok(EntityExtractor::for_domain(domain)?.extract(output))
    }

    fn domain(s: &str) -> Domain {
        Domain::parse(s).unwrap()
    }

    fn set(items: &[&str]) -> std::collections::BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_sentence() {
        let found = extract(
            "Found www.example.com and mail@example.com",
            &domain("example.com"),
        )
        .unwrap();

        // The bare domain after '@' counts as a subdomain match.
        assert_eq!(found.subdomains, set(&["www.example.com", "example.com"]));
        assert_eq!(found.emails, set(&["mail@example.com"]));
    }

    #[test]
    fn test_extract_deduplicates_within_output() {
        let output = "api.example.com\napi.example.com\ndev.api.example.com\n";
        let found = extract(output, &domain("example.com")).unwrap();

        assert_eq!(
            found.subdomains,
            set(&["api.example.com", "dev.api.example.com"])
        );
        assert!(found.emails.is_empty());
    }

    #[test]
    fn test_extract_harvester_style_output() {
        let output = "\
[*] Emails found: 2
----------------------
admin@example.com
first.last+tag@example.com

[*] Hosts found: 3
---------------------
mx1.example.com:203.0.113.10
vpn-gw.example.com
www.example.com:203.0.113.11
";
        let found = extract(output, &domain("example.com")).unwrap();

        assert_eq!(
            found.emails,
            set(&["admin@example.com", "first.last+tag@example.com"])
        );
        assert!(found.subdomains.contains("mx1.example.com"));
        assert!(found.subdomains.contains("vpn-gw.example.com"));
        assert!(found.subdomains.contains("www.example.com"));
    }

    #[test]
    fn test_dots_in_domain_are_literal() {
        let found = extract("wwwXexampleYcom www.example.com", &domain("example.com")).unwrap();
        assert_eq!(found.subdomains, set(&["www.example.com"]));
    }

    #[test]
    fn test_other_domains_ignored() {
        let output = "www.example.org user@example.org shop.example.net";
        let found = extract(output, &domain("example.com")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_matches_are_case_sensitive() {
        let found = extract("WWW.EXAMPLE.COM", &domain("example.com")).unwrap();
        assert!(found.subdomains.is_empty());
    }

    #[test]
    fn test_every_match_belongs_to_domain() {
        let target = domain("example.com");
        let output = "a.example.com.evil.org x@example.com.au notexample.com \
                      b-c.example.com, <d@example.com> e.f.example.comx";
        let found = extract(output, &target).unwrap();

        assert!(!found.subdomains.is_empty());
        for sub in &found.subdomains {
            assert!(sub.ends_with("example.com"), "{}", sub);
        }
        for email in &found.emails {
            let (_, host) = email.split_once('@').unwrap();
            assert_eq!(host, "example.com");
        }
    }

    #[test]
    fn test_empty_output() {
        let found = extract("", &domain("example.com")).unwrap();
        assert!(found.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn noisy_output() -> impl Strategy<Value = String> {
            proptest::collection::vec(
                prop_oneof![
                    Just("example.com".to_string()),
                    Just("example.co".to_string()),
                    Just(".".to_string()),
                    Just("@".to_string()),
                    Just(" ".to_string()),
                    Just("\n".to_string()),
                    "[a-zA-Z0-9_+-]{1,6}",
                ],
                0..40,
            )
            .prop_map(|parts| parts.concat())
        }

        proptest! {
            #[test]
            fn prop_entities_belong_to_domain(output in noisy_output()) {
                let found = extract(&output, &domain("example.com")).unwrap();

                for sub in &found.subdomains {
                    prop_assert!(sub.ends_with("example.com"), "{}", sub);
                }
                for email in &found.emails {
                    let (local, host) = email.split_once('@').unwrap();
                    prop_assert!(!local.is_empty());
                    prop_assert_eq!(host, "example.com");
                }
            }
        }
    }
}
