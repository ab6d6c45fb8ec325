//! Content extraction.  Inbound bodies come in two shapes: a flat `content`
//! string or an ordered list of rich-text `blocks`.  The raw request is
//! resolved once into a [`SummaryBody`] and then flattened into a single text
//! blob by [`extract_content`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::SummarizeError;

/// Raw `/summarize` payload.  `content` and `blocks` are kept as loose JSON so
/// that an unexpected type in one field does not reject the whole body; the
/// shape is decided in [`SummaryRequest::into_parts`].
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SummaryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub blocks: Option<Value>,
}

/// One paragraph record of a rich-text document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RichTextBlock {
    pub text: Option<String>,
}

impl RichTextBlock {
    /// Non-objects and non-string `text` values are treated as missing text.
    fn from_value(value: &Value) -> Self {
        RichTextBlock {
            text: value
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}

/// The recognised body shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBody {
    Text(String),
    Blocks(Vec<RichTextBlock>),
    Unrecognized,
}

impl SummaryRequest {
    /// Split the request into the subject name and the resolved body.  A
    /// string `content` wins over `blocks`; blank names count as absent.
    pub fn into_parts(self) -> (Option<String>, SummaryBody) {
        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        let body = match (self.content, self.blocks) {
            (Some(Value::String(text)), _) => SummaryBody::Text(text),
            (_, Some(Value::Array(items))) => {
                SummaryBody::Blocks(items.iter().map(RichTextBlock::from_value).collect())
            }
            _ => SummaryBody::Unrecognized,
        };
        (name, body)
    }
}

/// Flatten a body into the text handed to the prompt builder.
///
/// Flat text is returned unchanged.  Blocks contribute their non-empty `text`
/// in order, joined by `\n`; blocks with missing or empty text are skipped
/// rather than turned into empty lines.  Fails with [`SummarizeError::NoContent`] when the
/// result is blank.
pub fn extract_content(body: SummaryBody) -> Result<String, SummarizeError> {
    let text = match body {
        SummaryBody::Text(text) => text,
        SummaryBody::Blocks(blocks) => blocks
            .into_iter()
            .filter_map(|b| b.text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        SummaryBody::Unrecognized => return Err(SummarizeError::NoContent),
    };
    if text.trim().is_empty() {
        return Err(SummarizeError::NoContent);
    }
    Ok(text)
}
