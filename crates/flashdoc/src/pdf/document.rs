//! Native text layer access through `lopdf`.

use super::error::{PdfError, Result, mentions_encryption};
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;

/// Kerning adjustment inside a `TJ` array wide enough to count as a word gap.
const TJ_WORD_GAP: f32 = -100.0;

/// An opened PDF whose pages can be read one at a time.
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open a PDF from memory.
    ///
    /// # Errors
    ///
    /// - `PdfError::PasswordRequired` when the document is encrypted.
    /// - `PdfError::InvalidPdf` when it cannot be parsed at all.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let doc = match Document::load_mem(bytes) {
            Ok(doc) => doc,
            Err(err) => {
                let msg = err.to_string();
                if has_encrypt_entry(bytes) || mentions_encryption(&msg) {
                    return Err(PdfError::PasswordRequired);
                }
                return Err(PdfError::from(err));
            }
        };

        if doc.is_encrypted() {
            return Err(PdfError::PasswordRequired);
        }

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of the page at zero-based `index`.
    ///
    /// Every text-showing operator (`Tj`, `TJ`, `'`, `"`) is one run; runs are
    /// trimmed and joined by single spaces so adjacent runs never fuse words.
    pub fn page_text(&self, index: usize) -> Result<String> {
        let page_id = *self.pages.get(index).ok_or(PdfError::PageNotFound(index + 1))?;
        let failed = |e: lopdf::Error| PdfError::TextExtractionFailed(format!("page {}: {}", index + 1, e));

        let encodings: BTreeMap<Vec<u8>, Encoding<'_>> = self
            .doc
            .get_page_fonts(page_id)
            .map_err(failed)?
            .into_iter()
            .filter_map(|(name, font)| font.get_font_encoding(&self.doc).ok().map(|enc| (name, enc)))
            .collect();
        let content = self.doc.get_and_decode_page_content(page_id).map_err(failed)?;

        let mut encoding = None;
        let mut runs = Vec::new();
        for op in &content.operations {
            match op.operator.as_str() {
                "Tf" => {
                    encoding = op
                        .operands
                        .first()
                        .and_then(|name| name.as_name().ok())
                        .and_then(|name| encodings.get(name));
                }
                "Tj" | "'" | "\"" | "TJ" => {
                    let mut run = String::new();
                    collect_run(&mut run, encoding, &op.operands);
                    runs.push(run);
                }
                _ => {}
            }
        }

        Ok(join_runs(&runs))
    }
}

/// Append the text of one show operator's operands to `run`.
///
/// Numeric operands of `"` are spacing values and are skipped. Inside a `TJ`
/// array a large negative adjustment stands for a space.
fn collect_run(run: &mut String, encoding: Option<&Encoding<'_>>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => run.push_str(&decode_string(encoding, bytes)),
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(bytes, _) => run.push_str(&decode_string(encoding, bytes)),
                        other if other.as_float().is_ok_and(|adjust| adjust < TJ_WORD_GAP) => run.push(' '),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn decode_string(encoding: Option<&Encoding<'_>>, bytes: &[u8]) -> String {
    encoding
        .and_then(|enc| Document::decode_text(enc, bytes).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}

fn join_runs(runs: &[String]) -> String {
    runs.iter()
        .map(|run| run.trim())
        .filter(|run| !run.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cheap scan for an `/Encrypt` trailer key in documents lopdf refuses to load.
fn has_encrypt_entry(bytes: &[u8]) -> bool {
    const KEY: &[u8] = b"/Encrypt";
    bytes.windows(KEY.len()).any(|w| w == KEY)
}
