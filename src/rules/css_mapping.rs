//! Rule mapping, selector-list mapping, and style mapping (§4.2 "Rule
//! mapping" / "Selector-list mapping" / "Style mapping"), grounded on
//! `adapter/Base.go`'s `mapRule`/`mapStyle`/`mapCssProperty`/
//! `extractDisabledStyles`/`getLineColumnFromIndex`.

use crate::schema::css::{CssProperty, CssRule, CssStyle, SelectorList, SourceRange};

const BEGIN_COMMENT: &str = "/* ";
const END_COMMENT: &str = " */";

/// Version-dependent selector-list handling (§4.2 "Selector-list mapping").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorListMode {
    /// iOS 8 pack: flatten each selector to `{text, range: selectorList.range}`, drop the top-level range.
    Ios8,
    /// iOS 9 and iOS >= 12.2 packs: leave `text` alone, carry `range` per the source.
    Ios9Plus,
}

pub fn map_selector_list(mode: SelectorListMode, list: &mut SelectorList) {
    match mode {
        SelectorListMode::Ios8 => {
            let outer_range = list.range.take();
            for selector in &mut list.selectors {
                selector.range = outer_range
                    .as_ref()
                    .map(|r| serde_json::to_value(r).unwrap_or_default());
            }
        }
        SelectorListMode::Ios9Plus => {
            // Already in the target shape; nothing to do.
        }
    }
}

/// `mapRule` (Base.go:761): promotes `ruleId.styleSheetId`, maps the
/// selector list, maps the style, and drops `sourceLine`.
pub fn map_rule(mode: SelectorListMode, rule: &mut CssRule) {
    if let Some(rule_id) = rule.rule_id.take() {
        rule.style_sheet_id = rule_id.style_sheet_id;
    }
    if let Some(selector_list) = rule.selector_list.as_mut() {
        map_selector_list(mode, selector_list);
    }
    let origin = rule.origin.clone();
    if let Some(style) = rule.style.as_mut() {
        map_style(style, origin.as_deref());
    }
    rule.source_line = None;
}

/// `mapStyle` (Base.go:861): splices disabled-property comments back in as
/// synthetic properties, maps every property, and (for non-`user-agent`
/// rules) promotes `styleId.styleSheetId` to the top-level `styleSheetId`.
pub fn map_style(style: &mut CssStyle, rule_origin: Option<&str>) {
    if let Some(css_text) = style.css_text.clone() {
        let disabled = extract_disabled_styles(&css_text, style.range.as_ref());
        for comment in disabled {
            insert_disabled_property(style, comment);
        }
    }

    for property in &mut style.css_properties {
        map_css_property(property);
    }

    if rule_origin != Some("user-agent") {
        style.style_sheet_id = style.style_id.as_ref().and_then(|id| id.style_sheet_id.clone());
    }

    style.style_id = None;
    style.width = None;
    style.height = None;
}

fn insert_disabled_property(style: &mut CssStyle, comment: SourceRange) {
    let content = comment.content.clone().unwrap_or_default();
    let trimmed = content.trim();
    let trimmed = trimmed.strip_prefix(BEGIN_COMMENT.trim_end()).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(END_COMMENT.trim_start()).unwrap_or(trimmed);
    let trimmed = trimmed.trim();
    let mut parts = trimmed.splitn(2, ':');
    let name = parts.next().unwrap_or_default().trim().to_string();
    let value = parts.next().unwrap_or_default().trim().to_string();

    let insert_at = style
        .css_properties
        .iter()
        .position(|p| match (&p.range, &comment.range) {
            (Some(pr), Some(cr)) => pr.start_line >= cr.start_line || pr.start_column > cr.start_column,
            _ => false,
        })
        .map(|index| index + 1)
        .unwrap_or(style.css_properties.len());

    style.css_properties.insert(
        insert_at,
        CssProperty {
            implicit: Some(false),
            name: Some(name),
            range: comment.range.map(|b| *b),
            status: Some("disabled".into()),
            text: comment.content,
            value: Some(value),
            ..Default::default()
        },
    );
}

/// `mapCssProperty` (Base.go:938): `status` becomes boolean `disabled`;
/// a non-empty `priority` sets (and the source immediately discards)
/// `implicit` — the discard is preserved verbatim (§9 Open Questions).
pub fn map_css_property(property: &mut CssProperty) {
    if let Some(status) = property.status.take() {
        property.disabled = Some(status == "disabled");
    }
    property.implicit = None;
}

/// `extractDisabledStyles` (Base.go:961): scans `styleText` for
/// `/* ... */`-delimited comments and returns their content plus computed
/// line/column ranges, seeded from `cssRange`.
pub fn extract_disabled_styles(style_text: &str, css_range: Option<&SourceRange>) -> Vec<SourceRange> {
    let mut starts = Vec::new();
    let mut out = Vec::new();
    let chars: Vec<char> = style_text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if matches_at(&chars, i, BEGIN_COMMENT) {
            starts.push(i);
            i += BEGIN_COMMENT.chars().count();
            continue;
        }
        if matches_at(&chars, i, END_COMMENT) {
            if starts.is_empty() {
                return Vec::new();
            }
            let start_index = starts.remove(0);
            let end_index = i + END_COMMENT.chars().count();

            let (start_line, start_column) = get_line_column_from_index(style_text, start_index, css_range);
            let (end_line, end_column) = get_line_column_from_index(style_text, end_index, css_range);

            let content: String = chars[start_index..end_index].iter().collect();
            out.push(SourceRange {
                content: Some(content),
                range: Some(Box::new(SourceRange {
                    start_line,
                    start_column,
                    end_line,
                    end_column,
                    ..Default::default()
                })),
                ..Default::default()
            });
            i = end_index;
            continue;
        }
        i += 1;
    }
    if starts.is_empty() {
        out
    } else {
        Vec::new()
    }
}

fn matches_at(chars: &[char], index: usize, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    if index + needle.len() > chars.len() {
        return false;
    }
    chars[index..index + needle.len()] == needle[..]
}

/// `getLineColumnFromIndex` (Base.go:1002): walks `text` up to `index`,
/// advancing `line`/`column` on each newline variant, seeded from `start_range`.
pub fn get_line_column_from_index(text: &str, index: usize, start_range: Option<&SourceRange>) -> (i64, i64) {
    if text.is_empty() || index > text.len() {
        return (0, 0);
    }
    let mut line = start_range.map(|r| r.start_line).unwrap_or(0);
    let mut column = start_range.map(|r| r.start_column).unwrap_or(0);
    let bytes = text.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() && i < index {
        if bytes[i] == b'\r' && i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
            i += 1;
            line += 1;
            column = 0;
        } else if bytes[i] == b'\n' || bytes[i] == b'\r' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
        i += 1;
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_css_property_translates_status_and_drops_implicit() {
        let mut prop = CssProperty { status: Some("disabled".into()), priority: Some("important".into()), ..Default::default() };
        map_css_property(&mut prop);
        assert_eq!(prop.disabled, Some(true));
        assert_eq!(prop.implicit, None);
        assert!(prop.status.is_none());
    }

    #[test]
    fn extract_disabled_styles_finds_single_comment() {
        let text = "color: red;\n/* display: none; */\nwidth: 1px;";
        let disabled = extract_disabled_styles(text, None);
        assert_eq!(disabled.len(), 1);
        assert_eq!(disabled[0].content.as_deref(), Some("/* display: none; */"));
    }

    #[test]
    fn extract_disabled_styles_unbalanced_returns_empty() {
        let text = "/* display: none;";
        assert!(extract_disabled_styles(text, None).is_empty());
    }

    #[test]
    fn line_column_advances_across_newlines() {
        let text = "ab\ncd\nef";
        let (line, column) = get_line_column_from_index(text, 6, None);
        assert_eq!((line, column), (2, 0));
    }

    #[test]
    fn insert_disabled_property_places_comment_after_preceding_property() {
        let prop_at = |line: i64, column: i64, name: &str| CssProperty {
            name: Some(name.into()),
            range: Some(SourceRange { start_line: line, start_column: column, ..Default::default() }),
            ..Default::default()
        };
        let comment_at = |line: i64, column: i64| SourceRange {
            content: Some("/* display: none; */".into()),
            range: Some(Box::new(SourceRange { start_line: line, start_column: column, ..Default::default() })),
            ..Default::default()
        };

        let mut style = CssStyle {
            css_properties: vec![prop_at(0, 0, "color"), prop_at(1, 0, "width"), prop_at(2, 0, "height")],
            ..Default::default()
        };

        // Comment shares `width`'s line, so it must land after `width` and
        // before `height`, not displace `width` itself.
        insert_disabled_property(&mut style, comment_at(1, 5));

        let names: Vec<&str> = style.css_properties.iter().map(|p| p.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["color", "width", "display", "height"]);
    }

    #[test]
    fn insert_disabled_property_appends_when_after_every_property() {
        let prop_at = |line: i64, name: &str| CssProperty {
            name: Some(name.into()),
            range: Some(SourceRange { start_line: line, ..Default::default() }),
            ..Default::default()
        };
        let mut style = CssStyle { css_properties: vec![prop_at(0, "color"), prop_at(1, "width")], ..Default::default() };

        let comment = SourceRange {
            content: Some("/* display: none; */".into()),
            range: Some(Box::new(SourceRange { start_line: 5, ..Default::default() })),
            ..Default::default()
        };
        insert_disabled_property(&mut style, comment);

        let names: Vec<&str> = style.css_properties.iter().map(|p| p.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["color", "width", "display"]);
    }

    #[test]
    fn map_selector_list_ios8_flattens_to_outer_range() {
        let mut list = SelectorList {
            selectors: vec![Default::default()],
            range: Some(SourceRange { start_line: 1, ..Default::default() }),
            ..Default::default()
        };
        map_selector_list(SelectorListMode::Ios8, &mut list);
        assert!(list.range.is_none());
        assert!(list.selectors[0].range.is_some());
    }
}
