//! One-shot referral extraction from the page URL, and the matching link builder.

use asty_types::Address;
use url::Url;

use crate::validator::validate_referral;
use crate::ReferralError;

/// Query parameter carrying the referrer's address.
pub const REFERRAL_QUERY_PARAM: &str = "ref";

/// Outcome of [`ReferralExtractor::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Extraction already happened for this page load; nothing was read.
    AlreadyRan,
    NoReferral,
    /// A format-valid candidate to place in the form.
    Extracted(String),
    /// The parameter was present but unusable; the form is left alone.
    Invalid { value: String, error: ReferralError },
}

/// Reads the referral parameter exactly once per page load.
#[derive(Debug, Default)]
pub struct ReferralExtractor {
    ran: bool,
}

impl ReferralExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_run(&self) -> bool {
        self.ran
    }

    /// Read and validate the referral parameter of `page_url`.
    ///
    /// Every call after the first returns [`Extraction::AlreadyRan`], so a
    /// value the user edited by hand is never overwritten.
    pub fn extract(&mut self, page_url: &str, own_address: Option<&Address>) -> Extraction {
        if self.ran {
            return Extraction::AlreadyRan;
        }
        self.ran = true;

        let Some(value) = referral_param(page_url) else {
            tracing::debug!("no referral parameter in page URL");
            return Extraction::NoReferral;
        };

        match validate_referral(&value, own_address) {
            Some(error) => {
                tracing::warn!(%value, %error, "rejected referral from URL");
                Extraction::Invalid { value, error }
            }
            None => {
                tracing::debug!(%value, "referral extracted from URL");
                Extraction::Extracted(value)
            }
        }
    }
}

/// The non-empty referral parameter of `page_url`, if any.
///
/// Accepts absolute URLs and path-relative ones such as `/?ref=0x…`.
pub fn referral_param(page_url: &str) -> Option<String> {
    let url = parse_page_url(page_url)?;
    url.query_pairs()
        .find(|(key, _)| key == REFERRAL_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
}

/// Shareable registration link crediting `referrer`.
pub fn referral_link(base_url: &str, referrer: &Address) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != REFERRAL_QUERY_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(REFERRAL_QUERY_PARAM, &referrer.to_string());
    Ok(url.into())
}

fn parse_page_url(page_url: &str) -> Option<Url> {
    match Url::parse(page_url) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")
            .and_then(|base| base.join(page_url))
            .ok(),
        Err(e) => {
            tracing::debug!(%e, "unparseable page URL");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATE: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

    #[test]
    fn extracts_valid_referral() {
        let mut extractor = ReferralExtractor::new();
        let url = format!("https://asty.io/register?ref={CANDIDATE}");
        assert_eq!(extractor.extract(&url, None), Extraction::Extracted(CANDIDATE.to_string()));
        assert!(extractor.has_run());
    }

    #[test]
    fn runs_only_once() {
        let mut extractor = ReferralExtractor::new();
        let url = format!("https://asty.io/?ref={CANDIDATE}");
        assert!(matches!(extractor.extract(&url, None), Extraction::Extracted(_)));
        assert_eq!(extractor.extract(&url, None), Extraction::AlreadyRan);
    }

    #[test]
    fn missing_or_empty_param_is_no_referral() {
        assert_eq!(ReferralExtractor::new().extract("https://asty.io/", None), Extraction::NoReferral);
        assert_eq!(ReferralExtractor::new().extract("https://asty.io/?ref=", None), Extraction::NoReferral);
        assert_eq!(
            ReferralExtractor::new().extract("https://asty.io/?utm_source=x", None),
            Extraction::NoReferral
        );
    }

    #[test]
    fn invalid_param_reports_error() {
        let outcome = ReferralExtractor::new().extract("https://asty.io/?ref=0xnope", None);
        assert_eq!(
            outcome,
            Extraction::Invalid {
                value: "0xnope".into(),
                error: ReferralError::InvalidFormat
            }
        );
    }

    #[test]
    fn self_referral_from_url_is_rejected() {
        let own: Address = CANDIDATE.parse().unwrap();
        let url = format!("https://asty.io/?ref={}", CANDIDATE.to_lowercase());
        assert!(matches!(
            ReferralExtractor::new().extract(&url, Some(&own)),
            Extraction::Invalid { error: ReferralError::SelfReferral, .. }
        ));
    }

    #[test]
    fn relative_urls_are_accepted() {
        assert_eq!(referral_param(&format!("/?ref={CANDIDATE}")), Some(CANDIDATE.to_string()));
        assert_eq!(referral_param(&format!("?ref={CANDIDATE}&x=1")), Some(CANDIDATE.to_string()));
    }

    #[test]
    fn link_round_trips_through_extraction() {
        let referrer: Address = CANDIDATE.parse().unwrap();
        let link = referral_link("https://asty.io/register?utm_source=share&ref=0xold", &referrer).unwrap();
        assert!(link.contains("utm_source=share"));
        assert!(!link.contains("0xold"));
        let param = referral_param(&link).unwrap();
        assert!(param.eq_ignore_ascii_case(CANDIDATE));
    }

    #[test]
    fn link_rejects_relative_base() {
        let referrer: Address = CANDIDATE.parse().unwrap();
        assert!(referral_link("/register", &referrer).is_err());
    }
}
