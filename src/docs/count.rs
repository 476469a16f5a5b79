//! Counts checked-off entries: checkbox list items whose bold title line is
//! fully struck through. Restricting to bold list items keeps stray
//! strikethrough elsewhere in the document out of the count.

use super::model::{Paragraph, StructuralElement, TextRun};

/// Runs with no ASCII letter or digit (soft breaks, spaces, dashes, accented
/// punctuation) take no part in the style checks.
fn has_content(run: &TextRun) -> bool {
    run.content
        .as_deref()
        .is_some_and(|c| c.chars().any(|ch| ch.is_ascii_alphanumeric()))
}

fn is_checked_title(para: &Paragraph) -> bool {
    let Some(elements) = para.elements.as_deref() else {
        return false;
    };
    let runs: Vec<&TextRun> = elements
        .iter()
        .filter_map(|e| e.text_run.as_ref())
        .filter(|r| has_content(r))
        .collect();
    if runs.is_empty() {
        return false;
    }

    let is_list_item = para
        .bullet
        .as_ref()
        .and_then(|b| b.list_id.as_deref())
        .is_some_and(|id| !id.is_empty());
    let is_title_like = runs
        .iter()
        .any(|r| r.text_style.as_ref().and_then(|s| s.bold) == Some(true));
    let is_checked = runs
        .iter()
        .all(|r| r.text_style.as_ref().and_then(|s| s.strikethrough) == Some(true));

    is_list_item && is_title_like && is_checked
}

/// Number of checked title paragraphs in `content`. Absent content counts as 0.
pub fn count_checked_titles(content: Option<&[StructuralElement]>) -> usize {
    content
        .unwrap_or_default()
        .iter()
        .filter_map(|el| el.paragraph.as_ref())
        .filter(|p| is_checked_title(p))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// Raw `body.content`; anything that is not an array of structural
    /// elements counts as 0.
    fn count(content: Value) -> usize {
        match serde_json::from_value::<Vec<StructuralElement>>(content) {
            Ok(elements) => count_checked_titles(Some(&elements)),
            Err(_) => 0,
        }
    }

    #[test]
    fn counts_bold_list_item_with_all_runs_struck() {
        let content = json!([{ "paragraph": {
            "bullet": { "listId": "kix.1" },
            "elements": [
                { "textRun": { "content": "Example Title", "textStyle": { "bold": true, "strikethrough": true } } },
                { "textRun": { "content": "\u{000B}", "textStyle": { "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 1);
    }

    #[test]
    fn whitespace_run_without_strikethrough_does_not_disqualify() {
        let content = json!([{ "paragraph": {
            "bullet": { "listId": "kix.1" },
            "elements": [
                { "textRun": { "content": "Title", "textStyle": { "bold": true, "strikethrough": true } } },
                { "textRun": { "content": "\n", "textStyle": {} } }
            ]
        } }]);
        assert_eq!(count(content), 1);
    }

    #[test]
    fn ignores_struck_paragraph_outside_a_list() {
        let content = json!([{ "paragraph": {
            "elements": [
                { "textRun": { "content": "Some struck text", "textStyle": { "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 0);

        let content = json!([{ "paragraph": {
            "elements": [
                { "textRun": { "content": "Bold and struck", "textStyle": { "bold": true, "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 0);
    }

    #[test]
    fn ignores_empty_list_id() {
        let content = json!([{ "paragraph": {
            "bullet": {},
            "elements": [
                { "textRun": { "content": "Bold and struck", "textStyle": { "bold": true, "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 0);

        let content = json!([{ "paragraph": {
            "bullet": { "listId": "" },
            "elements": [
                { "textRun": { "content": "Bold and struck", "textStyle": { "bold": true, "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 0);
    }

    #[test]
    fn partially_struck_item_is_not_checked() {
        let content = json!([{ "paragraph": {
            "bullet": { "listId": "kix.1" },
            "elements": [
                { "textRun": { "content": "Title part ", "textStyle": { "bold": true, "strikethrough": true } } },
                { "textRun": { "content": "summary part", "textStyle": { "bold": false, "strikethrough": false } } }
            ]
        } }]);
        assert_eq!(count(content), 0);
    }

    #[test]
    fn item_without_bold_run_is_not_a_title() {
        let content = json!([{ "paragraph": {
            "bullet": { "listId": "kix.1" },
            "elements": [
                { "textRun": { "content": "Only italic summary", "textStyle": { "italic": true, "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 0);
    }

    #[test]
    fn item_with_only_whitespace_runs_never_counts() {
        let content = json!([{ "paragraph": {
            "bullet": { "listId": "kix.1" },
            "elements": [
                { "textRun": { "content": " \n", "textStyle": { "bold": true, "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 0);
    }

    #[test]
    fn counts_multiple_matches_and_skips_non_paragraphs() {
        let content = json!([
            { "endIndex": 1, "sectionBreak": {} },
            { "paragraph": { "bullet": { "listId": "a" }, "elements": [
                { "textRun": { "content": "One", "textStyle": { "bold": true, "strikethrough": true } } }
            ] } },
            { "table": {} },
            { "paragraph": { "bullet": { "listId": "a" }, "elements": [
                { "textRun": { "content": "Two", "textStyle": { "bold": true, "strikethrough": true } } }
            ] } },
            { "paragraph": { "bullet": { "listId": "a" } } }
        ]);
        assert_eq!(count(content), 2);
    }

    #[test]
    fn missing_or_malformed_input_counts_zero() {
        assert_eq!(count_checked_titles(None), 0);
        assert_eq!(count_checked_titles(Some(&[])), 0);
        assert_eq!(count(Value::Null), 0);
        assert_eq!(count(json!([])), 0);
        assert_eq!(count(json!({ "paragraph": "nope" })), 0);
        assert_eq!(count(json!([{ "paragraph": { "elements": "not a list" } }])), 0);
    }

    #[test]
    fn non_ascii_only_runs_are_not_content() {
        let content = json!([{ "paragraph": {
            "bullet": { "listId": "kix.9" },
            "elements": [
                { "textRun": { "content": "Title", "textStyle": { "bold": true, "strikethrough": true } } },
                { "textRun": { "content": " — é — ", "textStyle": {} } }
            ]
        } }]);
        assert_eq!(count(content), 1);

        let content = json!([{ "paragraph": {
            "bullet": { "listId": "kix.9" },
            "elements": [
                { "textRun": { "content": "読書メモ", "textStyle": { "bold": true, "strikethrough": true } } }
            ]
        } }]);
        assert_eq!(count(content), 0);
    }
}
