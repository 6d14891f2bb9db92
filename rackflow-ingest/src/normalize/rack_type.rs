//! Rack-type classification
//!
//! Raw rack-type labels are free text. They are classified by
//! case-insensitive substring matching over [`RACK_TYPE_RULES`], first
//! match wins. Several tokens are substrings of others ("GB300" contains
//! "B300"), so the table order must not change.
//!
//! | # | Signal | Family |
//! |---|--------|--------|
//! | 1 | `JUICEBOX` | Juicebox (override) |
//! | 2 | `GB200` | GB200 |
//! | 3 | `GB300` | GB300 |
//! | 4 | `B200` | B200 |
//! | 5 | `B300` | B300 |
//! | 6 | `GLACIER` | Glacier |
//! | 7 | `EBS` | EBS |
//! | 8 | `S3` | S3 |
//! | 9 | `TRN2P` | TRN2P |
//! | 10 | `P5` | P5 |
//! | 11 | network keywords, `NW` delimited tokens, `^NW\b` | Network |
//! | - | nothing matched | Core |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical rack family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RackFamily {
    Juicebox,
    GB200,
    GB300,
    B200,
    B300,
    Glacier,
    EBS,
    S3,
    TRN2P,
    P5,
    Network,
    Core,
}

impl RackFamily {
    /// Option label used by the tracker
    pub fn as_str(&self) -> &'static str {
        match self {
            RackFamily::Juicebox => "Juicebox",
            RackFamily::GB200 => "GB200",
            RackFamily::GB300 => "GB300",
            RackFamily::B200 => "B200",
            RackFamily::B300 => "B300",
            RackFamily::Glacier => "Glacier",
            RackFamily::EBS => "EBS",
            RackFamily::S3 => "S3",
            RackFamily::TRN2P => "TRN2P",
            RackFamily::P5 => "P5",
            RackFamily::Network => "Network",
            RackFamily::Core => "Core",
        }
    }
}

/// Keywords that mark a network rack
pub const NETWORK_KEYWORDS: &[&str] = &[
    "FUSION", "PATCH", "ONEFABRIC", "STORM", "EUCLID", "PUFFIN", "FISSION", "12.8T", "51.2T",
    "BRICK",
];

/// "NW" only counts when delimited; a bare substring matches too much
pub const NW_TOKENS: &[&str] = &["NW.", "NW-", "NW_", " NW ", "NW/", "NW\\", "NW:", "NW="];

static NW_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^NW\b").expect("static regex"));

/// How a rule inspects the uppercased label
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// Label contains the token
    Token(&'static str),
    /// Network keywords, delimited NW tokens, or a leading `NW` word
    Network,
}

impl Signal {
    fn matches(&self, label: &str) -> bool {
        match self {
            Signal::Token(token) => label.contains(token),
            Signal::Network => {
                NETWORK_KEYWORDS.iter().any(|k| label.contains(k))
                    || NW_TOKENS.iter().any(|k| label.contains(k))
                    || NW_PREFIX.is_match(label)
            }
        }
    }
}

/// One precedence entry
#[derive(Debug, Clone, Copy)]
pub struct RackTypeRule {
    pub signal: Signal,
    pub family: RackFamily,
}

const fn token(t: &'static str, family: RackFamily) -> RackTypeRule {
    RackTypeRule {
        signal: Signal::Token(t),
        family,
    }
}

/// Ordered classification table; first match wins
pub const RACK_TYPE_RULES: &[RackTypeRule] = &[
    token("JUICEBOX", RackFamily::Juicebox),
    token("GB200", RackFamily::GB200),
    token("GB300", RackFamily::GB300),
    token("B200", RackFamily::B200),
    token("B300", RackFamily::B300),
    token("GLACIER", RackFamily::Glacier),
    token("EBS", RackFamily::EBS),
    token("S3", RackFamily::S3),
    token("TRN2P", RackFamily::TRN2P),
    token("P5", RackFamily::P5),
    RackTypeRule {
        signal: Signal::Network,
        family: RackFamily::Network,
    },
];

/// Classify a raw rack-type label; unmatched labels are [`RackFamily::Core`]
pub fn classify_rack_type(raw: &str) -> RackFamily {
    let label = raw.trim().to_uppercase();

    RACK_TYPE_RULES
        .iter()
        .find(|rule| rule.signal.matches(&label))
        .map(|rule| rule.family)
        .unwrap_or(RackFamily::Core)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_beats_everything() {
        assert_eq!(classify_rack_type("juicebox GB300 network"), RackFamily::Juicebox);
    }

    #[test]
    fn test_combined_family_before_single() {
        assert_eq!(classify_rack_type("GB300-rev2"), RackFamily::GB300);
        assert_eq!(classify_rack_type("gb200 nvl72"), RackFamily::GB200);
        assert_eq!(classify_rack_type("B300x"), RackFamily::B300);
        assert_eq!(classify_rack_type("HGX-B200"), RackFamily::B200);
    }

    #[test]
    fn test_200_before_300_within_group() {
        assert_eq!(classify_rack_type("GB300/GB200 mixed"), RackFamily::GB200);
        assert_eq!(classify_rack_type("B300 B200"), RackFamily::B200);
    }

    #[test]
    fn test_keyword_families() {
        assert_eq!(classify_rack_type("Glacier Deep"), RackFamily::Glacier);
        assert_eq!(classify_rack_type("ebs-io2"), RackFamily::EBS);
        assert_eq!(classify_rack_type("S3 Standard"), RackFamily::S3);
        assert_eq!(classify_rack_type("Trn2p Ultra"), RackFamily::TRN2P);
        assert_eq!(classify_rack_type("p5en"), RackFamily::P5);
    }

    #[test]
    fn test_keyword_order_glacier_before_s3() {
        assert_eq!(classify_rack_type("S3 Glacier"), RackFamily::Glacier);
    }

    #[test]
    fn test_network_keywords() {
        for label in NETWORK_KEYWORDS {
            assert_eq!(classify_rack_type(label), RackFamily::Network, "{}", label);
        }
        assert_eq!(classify_rack_type("onefabric spine"), RackFamily::Network);
    }

    #[test]
    fn test_network_nw_tokens() {
        for label in ["NW.AGG", "x NW-1", "core NW_2", "a NW b", "NW/x", "NW\\x", "NW:1", "NW=1"] {
            assert_eq!(classify_rack_type(label), RackFamily::Network, "{}", label);
        }
    }

    #[test]
    fn test_network_leading_word() {
        assert_eq!(classify_rack_type("NW"), RackFamily::Network);
        assert_eq!(classify_rack_type("nw spine"), RackFamily::Network);
    }

    #[test]
    fn test_bare_nw_substring_is_not_network() {
        assert_eq!(classify_rack_type("NWX compute"), RackFamily::Core);
        assert_eq!(classify_rack_type("SNOWBALL"), RackFamily::Core);
    }

    #[test]
    fn test_default_core() {
        assert_eq!(classify_rack_type("C7i general"), RackFamily::Core);
        assert_eq!(classify_rack_type(""), RackFamily::Core);
    }

    #[test]
    fn test_brick_network_after_compute_family() {
        assert_eq!(classify_rack_type("P5 brick"), RackFamily::P5);
    }
}
