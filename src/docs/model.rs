//! Subset of the Docs API document tree read by the inbox.
//! Every field defaults when absent so partial payloads still deserialize.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub document_id: Option<String>,
    pub title: Option<String>,
    pub body: Option<Body>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Body {
    pub content: Option<Vec<StructuralElement>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralElement {
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    pub paragraph: Option<Paragraph>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Paragraph {
    pub bullet: Option<Bullet>,
    pub elements: Option<Vec<ParagraphElement>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Bullet {
    pub list_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphElement {
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRun {
    pub content: Option<String>,
    pub text_style: Option<TextStyle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub strikethrough: Option<bool>,
}

impl Document {
    pub fn content(&self) -> Option<&[StructuralElement]> {
        self.body.as_ref()?.content.as_deref()
    }

    /// Index just before the document's final newline, where new entries go.
    /// Falls back to 1, the first valid index of an empty body.
    pub fn append_index(&self) -> usize {
        self.content()
            .and_then(|c| c.last())
            .and_then(|el| el.end_index)
            .map(|end| end.saturating_sub(1).max(1))
            .unwrap_or(1)
    }
}
