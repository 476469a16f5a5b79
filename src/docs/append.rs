//! Builds the `documents.batchUpdate` requests that append one checkbox entry:
//!
//! ```text
//! [ ] TITLE            (bold)
//!     summary          (italic)
//!     url              (link)
//! ```
//!
//! The block is prefixed with `\n` and ends with `\n\n` so consecutive entries are
//! separated by exactly one blank line. All offsets are UTF-16 code units, which is
//! how the Docs API indexes document text.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const PREFIX: &str = "\n";
const SUFFIX: &str = "\n\n";
const PARAGRAPH_BREAK: &str = "\n";
/// Shift+Enter in the Docs editor: new line, same paragraph.
const SOFT_BREAK: &str = "\u{000B}";

/// How the three lines of an entry are laid out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPolicy {
    /// Each line is its own paragraph; only the title paragraph is a checkbox item.
    PerLine,
    /// One paragraph joined by soft breaks; checking the box strikes the whole entry.
    #[default]
    SingleParagraph,
}

impl LayoutPolicy {
    fn line_separator(&self) -> &'static str {
        match self {
            LayoutPolicy::PerLine => PARAGRAPH_BREAK,
            LayoutPolicy::SingleParagraph => SOFT_BREAK,
        }
    }
}

/// Checkbox preset passed to `createParagraphBullets`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BulletPreset {
    #[default]
    #[serde(rename = "BULLET_CHECKBOX")]
    Checkbox,
    #[serde(rename = "BULLET_CHECKBOX_FILLED")]
    CheckboxFilled,
}

impl BulletPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulletPreset::Checkbox => "BULLET_CHECKBOX",
            BulletPreset::CheckboxFilled => "BULLET_CHECKBOX_FILLED",
        }
    }

    /// The other recognised preset, used when the backend rejects this one.
    pub fn alternate(&self) -> BulletPreset {
        match self {
            BulletPreset::Checkbox => BulletPreset::CheckboxFilled,
            BulletPreset::CheckboxFilled => BulletPreset::Checkbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBlock {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Half-open `[start_index, end_index)` range in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl TextRange {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_json(self) -> Value {
        json!({ "startIndex": self.start_index, "endIndex": self.end_index })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    InsertText { index: usize, text: String },
    ApplyBulletPreset { range: TextRange, preset: BulletPreset },
    ApplyBoldStyle { range: TextRange },
    ApplyItalicStyle { range: TextRange },
    ApplyLinkStyle { range: TextRange, url: String },
}

impl EditOperation {
    /// Range of document text this operation touches. For an insert that is the
    /// span the new text will occupy.
    pub fn range(&self) -> TextRange {
        match self {
            EditOperation::InsertText { index, text } => {
                TextRange::new(*index, *index + utf16_len(text))
            }
            EditOperation::ApplyBulletPreset { range, .. }
            | EditOperation::ApplyBoldStyle { range }
            | EditOperation::ApplyItalicStyle { range }
            | EditOperation::ApplyLinkStyle { range, .. } => *range,
        }
    }

    /// Encode as one entry of a `documents.batchUpdate` `requests` array.
    pub fn to_request(&self) -> Value {
        match self {
            EditOperation::InsertText { index, text } => json!({
                "insertText": {
                    "location": { "index": index },
                    "text": text,
                }
            }),
            EditOperation::ApplyBulletPreset { range, preset } => json!({
                "createParagraphBullets": {
                    "range": range.to_json(),
                    "bulletPreset": preset.as_str(),
                }
            }),
            EditOperation::ApplyBoldStyle { range } => json!({
                "updateTextStyle": {
                    "range": range.to_json(),
                    "textStyle": { "bold": true },
                    "fields": "bold",
                }
            }),
            EditOperation::ApplyItalicStyle { range } => json!({
                "updateTextStyle": {
                    "range": range.to_json(),
                    "textStyle": { "italic": true },
                    "fields": "italic",
                }
            }),
            EditOperation::ApplyLinkStyle { range, url } => json!({
                "updateTextStyle": {
                    "range": range.to_json(),
                    "textStyle": { "link": { "url": url } },
                    "fields": "link",
                }
            }),
        }
    }
}

/// Ordered edits for one appended entry plus the length of the inserted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendPlan {
    pub operations: Vec<EditOperation>,
    pub inserted_length: usize,
}

impl AppendPlan {
    pub fn requests(&self) -> Vec<Value> {
        self.operations.iter().map(EditOperation::to_request).collect()
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Compute the edits that append `block` at `insertion_index`, the 1-based
/// index before the document's final newline.
///
/// Operations are always emitted as insert, bullets, bold, italic, link: the
/// style ranges address text that only exists once the insert has run.
pub fn build_append_operations(
    insertion_index: usize,
    block: &AppendBlock,
    layout: LayoutPolicy,
    preset: BulletPreset,
) -> AppendPlan {
    let AppendBlock {
        title,
        summary,
        url,
    } = block;
    let sep = layout.line_separator();

    let mut text = String::with_capacity(
        PREFIX.len() + title.len() + summary.len() + url.len() + 2 * sep.len() + SUFFIX.len(),
    );
    text.push_str(PREFIX);
    text.push_str(title);
    text.push_str(sep);
    text.push_str(summary);
    text.push_str(sep);
    text.push_str(url);
    text.push_str(SUFFIX);
    let inserted_length = utf16_len(&text);

    let title_start = insertion_index + utf16_len(PREFIX);
    let title_end = title_start + utf16_len(title);
    let summary_start = title_end + utf16_len(sep);
    let summary_end = summary_start + utf16_len(summary);
    let url_start = summary_end + utf16_len(sep);
    let url_end = url_start + utf16_len(url);

    let bullet_end = match layout {
        // the bullet has to cover the title's own paragraph break
        LayoutPolicy::PerLine => title_end + utf16_len(PARAGRAPH_BREAK),
        LayoutPolicy::SingleParagraph => url_end,
    };

    let operations = vec![
        EditOperation::InsertText {
            index: insertion_index,
            text,
        },
        EditOperation::ApplyBulletPreset {
            range: TextRange::new(title_start, bullet_end),
            preset,
        },
        EditOperation::ApplyBoldStyle {
            range: TextRange::new(title_start, title_end),
        },
        EditOperation::ApplyItalicStyle {
            range: TextRange::new(summary_start, summary_end),
        },
        EditOperation::ApplyLinkStyle {
            range: TextRange::new(url_start, url_end),
            url: url.clone(),
        },
    ];

    AppendPlan {
        operations,
        inserted_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> AppendBlock {
        AppendBlock {
            title: "Title".into(),
            summary: "Summary".into(),
            url: "https://u.org".into(),
        }
    }

    fn ranges(plan: &AppendPlan) -> Vec<(usize, usize)> {
        plan.operations
            .iter()
            .map(|op| {
                let r = op.range();
                (r.start_index, r.end_index)
            })
            .collect()
    }

    #[test]
    fn single_paragraph_offsets_for_known_input() {
        let plan = build_append_operations(
            50,
            &sample_block(),
            LayoutPolicy::SingleParagraph,
            BulletPreset::Checkbox,
        );

        assert_eq!(plan.inserted_length, 30);
        assert_eq!(
            ranges(&plan),
            vec![(50, 80), (51, 78), (51, 56), (57, 64), (65, 78)]
        );

        match &plan.operations[0] {
            EditOperation::InsertText { index, text } => {
                assert_eq!(*index, 50);
                assert_eq!(text, "\nTitle\u{000B}Summary\u{000B}https://u.org\n\n");
            }
            other => panic!("expected insert first, got {:?}", other),
        }
    }

    #[test]
    fn per_line_offsets_for_known_input() {
        let plan = build_append_operations(
            50,
            &sample_block(),
            LayoutPolicy::PerLine,
            BulletPreset::Checkbox,
        );

        assert_eq!(plan.inserted_length, 30);
        assert_eq!(
            ranges(&plan),
            vec![(50, 80), (51, 57), (51, 56), (57, 64), (65, 78)]
        );
        match &plan.operations[0] {
            EditOperation::InsertText { text, .. } => {
                assert_eq!(text, "\nTitle\nSummary\nhttps://u.org\n\n");
            }
            other => panic!("expected insert first, got {:?}", other),
        }
    }

    #[test]
    fn emits_five_operations_in_fixed_order() {
        for layout in [LayoutPolicy::PerLine, LayoutPolicy::SingleParagraph] {
            let plan = build_append_operations(1, &sample_block(), layout, BulletPreset::Checkbox);
            assert_eq!(plan.operations.len(), 5);
            assert!(matches!(plan.operations[0], EditOperation::InsertText { .. }));
            assert!(matches!(plan.operations[1], EditOperation::ApplyBulletPreset { .. }));
            assert!(matches!(plan.operations[2], EditOperation::ApplyBoldStyle { .. }));
            assert!(matches!(plan.operations[3], EditOperation::ApplyItalicStyle { .. }));
            assert!(matches!(plan.operations[4], EditOperation::ApplyLinkStyle { .. }));
        }
    }

    #[test]
    fn ranges_stay_inside_inserted_text_and_never_go_backwards() {
        let block = AppendBlock {
            title: "Example Article".into(),
            summary: "A short summary here.".into(),
            url: "https://example.com/page".into(),
        };
        for layout in [LayoutPolicy::PerLine, LayoutPolicy::SingleParagraph] {
            let plan = build_append_operations(100, &block, layout, BulletPreset::Checkbox);
            let end = 100 + plan.inserted_length;
            let mut last_start = 0;
            for op in &plan.operations {
                let r = op.range();
                assert!(r.start_index >= 100 && r.end_index <= end, "{:?}", op);
                assert!(r.start_index >= last_start, "{:?}", op);
                last_start = r.start_index;
            }
        }
    }

    #[test]
    fn link_width_equals_url_length_and_bold_excludes_separator() {
        let plan = build_append_operations(
            7,
            &sample_block(),
            LayoutPolicy::SingleParagraph,
            BulletPreset::Checkbox,
        );
        let link = plan.operations[4].range();
        assert_eq!(link.len(), 13);

        let EditOperation::InsertText { text, .. } = &plan.operations[0] else {
            panic!("insert first");
        };
        let bold = plan.operations[2].range();
        let units: Vec<u16> = text.encode_utf16().collect();
        let offset = bold.start_index - 7;
        let bold_text = String::from_utf16(&units[offset..offset + bold.len()]).unwrap();
        assert_eq!(bold_text, "Title");
        assert_eq!(units[offset + bold.len()], 0x000B);
    }

    #[test]
    fn inserted_length_counts_every_separator() {
        let block = AppendBlock {
            title: "".into(),
            summary: "".into(),
            url: "".into(),
        };
        let plan = build_append_operations(1, &block, LayoutPolicy::PerLine, BulletPreset::Checkbox);
        assert_eq!(plan.inserted_length, 5);
        assert!(plan.operations[2].range().is_empty());
    }

    #[test]
    fn lengths_are_measured_in_utf16_units() {
        let block = AppendBlock {
            title: "Café 🚀".into(),
            summary: "ok".into(),
            url: "https://u.org".into(),
        };
        let plan = build_append_operations(
            1,
            &block,
            LayoutPolicy::SingleParagraph,
            BulletPreset::Checkbox,
        );
        // "Café " is 5 units, the rocket is a surrogate pair
        assert_eq!(plan.operations[2].range(), TextRange::new(2, 9));
        assert_eq!(plan.operations[3].range(), TextRange::new(10, 12));
        assert_eq!(plan.operations[4].range().len(), 13);
    }

    #[test]
    fn builder_is_deterministic() {
        let a = build_append_operations(
            42,
            &sample_block(),
            LayoutPolicy::SingleParagraph,
            BulletPreset::CheckboxFilled,
        );
        let b = build_append_operations(
            42,
            &sample_block(),
            LayoutPolicy::SingleParagraph,
            BulletPreset::CheckboxFilled,
        );
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a.requests()).unwrap(),
            serde_json::to_string(&b.requests()).unwrap()
        );
    }

    #[test]
    fn requests_encode_batch_update_shapes() {
        let plan = build_append_operations(
            50,
            &sample_block(),
            LayoutPolicy::SingleParagraph,
            BulletPreset::CheckboxFilled,
        );
        let reqs = plan.requests();
        assert_eq!(reqs[0]["insertText"]["location"]["index"], 50);
        assert_eq!(
            reqs[1]["createParagraphBullets"]["bulletPreset"],
            "BULLET_CHECKBOX_FILLED"
        );
        assert_eq!(reqs[1]["createParagraphBullets"]["range"]["startIndex"], 51);
        assert_eq!(reqs[1]["createParagraphBullets"]["range"]["endIndex"], 78);
        assert_eq!(reqs[2]["updateTextStyle"]["textStyle"]["bold"], true);
        assert_eq!(reqs[2]["updateTextStyle"]["fields"], "bold");
        assert_eq!(reqs[3]["updateTextStyle"]["textStyle"]["italic"], true);
        assert_eq!(reqs[4]["updateTextStyle"]["textStyle"]["link"]["url"], "https://u.org");
        assert_eq!(reqs[4]["updateTextStyle"]["range"]["endIndex"], 78);
    }

    #[test]
    fn preset_alternates() {
        assert_eq!(BulletPreset::Checkbox.alternate(), BulletPreset::CheckboxFilled);
        assert_eq!(BulletPreset::CheckboxFilled.alternate(), BulletPreset::Checkbox);
    }
}
