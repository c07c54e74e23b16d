//! Version selector (§4.4), grounded on `adapter/Base.go`'s
//! `initProtocolAdapter` and the `iOS8.go`/`iOS9.go`/`iOS12.go` overlays.

use crate::rules::css_mapping::SelectorListMode;
use crate::rules::RulePack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceVersion {
    Ios8,
    Ios9,
    /// iOS >= 12.2: target-based wrapping, composes the iOS 9 pack.
    Ios12,
}

/// Splits `version` on `.`, takes `major`/`minor`, and chooses a pack per
/// §4.4's thresholds. A string with no recognizable major component falls
/// back to the iOS 9 pack, matching the source's fallthrough.
pub fn select(version: &str) -> DeviceVersion {
    let mut parts = version.split('.');
    let major: Option<i64> = parts.next().and_then(|p| p.parse().ok());
    let minor: Option<i64> = parts.next().and_then(|p| p.parse().ok());

    match major {
        Some(major) if major <= 8 => DeviceVersion::Ios8,
        Some(major) if major > 12 => DeviceVersion::Ios12,
        Some(12) if minor.unwrap_or(0) >= 2 => DeviceVersion::Ios12,
        _ => DeviceVersion::Ios9,
    }
}

impl DeviceVersion {
    pub fn selector_list_mode(self) -> SelectorListMode {
        match self {
            DeviceVersion::Ios8 => SelectorListMode::Ios8,
            DeviceVersion::Ios9 | DeviceVersion::Ios12 => SelectorListMode::Ios9Plus,
        }
    }

    pub fn build_rule_pack(self) -> RulePack {
        let mut pack = RulePack::new();
        crate::rules::base::install(&mut pack);
        match self {
            DeviceVersion::Ios8 => crate::rules::ios8::install(&mut pack),
            DeviceVersion::Ios9 => crate::rules::ios9::install(&mut pack),
            DeviceVersion::Ios12 => {
                crate::rules::ios9::install(&mut pack);
                crate::rules::ios12::install(&mut pack);
            }
        }
        pack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_ios8_for_major_le_8() {
        assert_eq!(select("8.3"), DeviceVersion::Ios8);
        assert_eq!(select("6.0"), DeviceVersion::Ios8);
    }

    #[test]
    fn selects_ios12_for_major_over_12_or_12_2_plus() {
        assert_eq!(select("13.0"), DeviceVersion::Ios12);
        assert_eq!(select("12.2"), DeviceVersion::Ios12);
        assert_eq!(select("12.4"), DeviceVersion::Ios12);
    }

    #[test]
    fn selects_ios9_otherwise() {
        assert_eq!(select("9.0"), DeviceVersion::Ios9);
        assert_eq!(select("12.0"), DeviceVersion::Ios9);
        assert_eq!(select("12.1"), DeviceVersion::Ios9);
        assert_eq!(select("11.4"), DeviceVersion::Ios9);
    }
}
