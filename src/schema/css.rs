//! Typed CSS entities, grounded on `entity/WebKitProtocol/css.go`. Only the
//! shapes the rule pack actually rewrites (`mapRule`/`mapStyle`/
//! `mapCssProperty`, §4.2f) are modeled; everything else inside a style
//! payload rides through untouched as part of the enclosing `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub type StyleSheetId = String;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CssRuleId {
    pub style_sheet_id: Option<StyleSheetId>,
    pub ordinal: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub start_line: i64,
    pub start_column: i64,
    pub end_line: i64,
    pub end_column: i64,
    /// DevTools-only field this proxy fills in; absent on the wire from iOS.
    pub content: Option<String>,
    pub range: Option<Box<SourceRange>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CssSelector {
    pub text: Option<serde_json::Value>,
    pub specificity: Option<Vec<i64>>,
    pub dynamic: Option<bool>,
    pub range: Option<serde_json::Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectorList {
    pub selectors: Vec<CssSelector>,
    pub text: Option<String>,
    pub range: Option<SourceRange>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CssProperty {
    pub name: Option<String>,
    pub value: Option<String>,
    pub priority: Option<String>,
    pub implicit: Option<bool>,
    pub text: Option<String>,
    pub parsed_ok: Option<bool>,
    pub status: Option<String>,
    pub range: Option<SourceRange>,
    /// DevTools-only; derived from `status` by [`crate::rules::css_mapping::map_css_property`].
    pub disabled: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CssStyle {
    pub style_id: Option<CssRuleId>,
    #[serde(default)]
    pub css_properties: Vec<CssProperty>,
    #[serde(default)]
    pub shorthand_entries: Vec<serde_json::Value>,
    pub css_text: Option<String>,
    pub range: Option<SourceRange>,
    pub width: Option<String>,
    pub height: Option<String>,
    /// DevTools-only; set from `style_id.style_sheet_id` by [`crate::rules::css_mapping::map_style`].
    pub style_sheet_id: Option<StyleSheetId>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CssRule {
    pub rule_id: Option<CssRuleId>,
    pub selector_list: Option<SelectorList>,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
    pub source_line: Option<i64>,
    pub origin: Option<String>,
    pub style: Option<CssStyle>,
    pub groupings: Option<Vec<serde_json::Value>>,
    /// DevTools-only; mirrors `rule_id.style_sheet_id` once `rule_id` is cleared.
    pub style_sheet_id: Option<StyleSheetId>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub rule: Option<CssRule>,
    #[serde(default)]
    pub matching_selectors: Vec<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InheritedStyleEntry {
    pub inline_style: Option<CssStyle>,
    #[serde(rename = "matchedCSSRules", default)]
    pub matched_css_rules: Vec<RuleMatch>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PseudoIdMatches {
    pub pseudo_id: Option<String>,
    #[serde(default)]
    pub matches: Vec<RuleMatch>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetMatchedStylesForNodeResult {
    #[serde(rename = "matchedCSSRules", default)]
    pub matched_css_rules: Vec<RuleMatch>,
    #[serde(default)]
    pub pseudo_elements: Vec<PseudoIdMatches>,
    #[serde(default)]
    pub inherited: Vec<InheritedStyleEntry>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetStyleTextResult {
    pub style: Option<CssStyle>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddRuleResult {
    pub rule: Option<CssRule>,
}
