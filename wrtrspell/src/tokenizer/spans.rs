//! Regions of a Markdown document that are never spellchecked.
//!
//! Spans are computed once per scan. Tokens are excluded by checking whether
//! their start offset falls inside a span, so a word that merely looks like
//! part of a URL elsewhere in the text is still checked.
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpanKind {
    Url,
    Link,
    Autolink,
    Email,
    InlineCode,
    CodeBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSpan {
    pub kind: SpanKind,
    pub range: Range<usize>,
}

fn patterns() -> &'static [(SpanKind, Regex)] {
    static PATTERNS: OnceLock<Vec<(SpanKind, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (SpanKind::Link, r"!?\[[^\]\n]*\]\([^)\n]*\)"),
            (SpanKind::Url, r"https?://[^\s<>]+|www\.[^\s<>]+"),
            (SpanKind::Autolink, r"<[A-Za-z][A-Za-z0-9+.\-]*:[^\s>]+>"),
            (SpanKind::Email, r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"),
            (SpanKind::InlineCode, r"`[^`\n]+`"),
        ]
        .into_iter()
        .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("span pattern is valid")))
        .collect()
    })
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let line = line.trim_start();
    if line.starts_with("```") {
        Some("```")
    } else if line.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

// An unterminated fence runs to the end of the document, as Markdown renders it.
fn code_blocks(text: &str, spans: &mut Vec<ExclusionSpan>) {
    let mut open: Option<(usize, &'static str)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        match (open, fence_marker(line)) {
            (None, Some(marker)) => open = Some((offset, marker)),
            (Some((start, marker)), Some(found)) if found == marker => {
                spans.push(ExclusionSpan {
                    kind: SpanKind::CodeBlock,
                    range: start..offset + line.len(),
                });
                open = None;
            }
            _ => {}
        }
        offset += line.len();
    }

    if let Some((start, _)) = open {
        spans.push(ExclusionSpan {
            kind: SpanKind::CodeBlock,
            range: start..text.len(),
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExclusionSpans {
    spans: Vec<ExclusionSpan>,
    merged: Vec<Range<usize>>,
}

impl ExclusionSpans {
    pub fn scan(text: &str) -> ExclusionSpans {
        let mut spans = Vec::new();
        code_blocks(text, &mut spans);

        for (kind, regex) in patterns() {
            spans.extend(regex.find_iter(text).map(|m| ExclusionSpan {
                kind: *kind,
                range: m.start()..m.end(),
            }));
        }

        spans.sort_by_key(|s| (s.range.start, s.range.end));

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
        for span in &spans {
            match merged.last_mut() {
                Some(last) if span.range.start <= last.end => {
                    last.end = last.end.max(span.range.end);
                }
                _ => merged.push(span.range.clone()),
            }
        }

        ExclusionSpans { spans, merged }
    }

    /// Whether a token starting at `offset` lies inside any span.
    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.merged.partition_point(|r| r.start <= offset);
        idx > 0 && offset < self.merged[idx - 1].end
    }

    /// The first span, in document order, covering `offset`.
    pub fn find(&self, offset: usize) -> Option<&ExclusionSpan> {
        self.spans
            .iter()
            .take_while(|s| s.range.start <= offset)
            .find(|s| offset < s.range.end)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionSpan> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
