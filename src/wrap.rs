/*
 *  wrap.rs
 *
 *  gsdisplay - ground station status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed width line wrapping for the message grid
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::warn;
use std::ops::Range;

/// One row of wrapped text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChunk<'a> {
    /// Grid row the chunk is drawn on
    pub line: usize,

    /// Half-open byte range into the source text
    pub span: Range<usize>,

    /// The text of the row, `&source[span]`
    pub text: &'a str,
}

impl LineChunk<'_> {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Ordered rows produced by [`layout`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineLayout<'a> {
    chunks: Vec<LineChunk<'a>>,
}

impl<'a> LineLayout<'a> {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[LineChunk<'a>] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineChunk<'a>> {
        self.chunks.iter()
    }

    /// Concatenation of every row, i.e. what survives truncation
    pub fn joined(&self) -> String {
        self.chunks.iter().map(|c| c.text).collect()
    }
}

impl<'l, 'a> IntoIterator for &'l LineLayout<'a> {
    type Item = &'l LineChunk<'a>;
    type IntoIter = std::slice::Iter<'l, LineChunk<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// Split `text` into rows of `line_width` characters starting at `start_line`.
///
/// Whole rows come first, followed by at most one shorter trailing row.
/// Anything beyond `(total_lines - start_line) * line_width` characters is
/// dropped. Widths count `char`s so a row never splits a UTF-8 sequence;
/// for ASCII this is the same as byte slicing.
///
/// A zero `line_width` or a `start_line` outside the grid yields an empty
/// layout.
pub fn layout(text: &str, start_line: usize, total_lines: usize, line_width: usize) -> LineLayout<'_> {
    if line_width == 0 || start_line >= total_lines {
        warn!(
            "layout rejected: start_line={} total_lines={} line_width={}",
            start_line, total_lines, line_width
        );
        return LineLayout::default();
    }
    if text.is_empty() {
        return LineLayout::default();
    }

    let available_lines = total_lines - start_line;

    // byte offset of every char start plus the end of the string
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = offsets.len() - 1;

    let full_lines = (char_len / line_width).min(available_lines);
    let remainder = char_len % line_width;
    let has_partial = full_lines < available_lines && remainder > 0;

    let mut chunks = Vec::with_capacity(full_lines + usize::from(has_partial));
    for li in 0..full_lines {
        let span = offsets[li * line_width]..offsets[(li + 1) * line_width];
        chunks.push(chunk(text, start_line + li, span));
    }

    if has_partial {
        let span = offsets[char_len - remainder]..text.len();
        chunks.push(chunk(text, start_line + full_lines, span));
    }

    LineLayout { chunks }
}

fn chunk(text: &str, line: usize, span: Range<usize>) -> LineChunk<'_> {
    LineChunk { line, text: &text[span.clone()], span }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert!(layout("", 0, 4, 15).is_empty());
        assert!(layout("", 1, 4, 15).is_empty());
    }

    #[test]
    fn test_exact_line() {
        let text = "A".repeat(15);
        let l = layout(&text, 0, 4, 15);
        assert_eq!(l.len(), 1);
        assert_eq!(l.chunks()[0].line, 0);
        assert_eq!(l.chunks()[0].text, text);
        assert_eq!(l.chunks()[0].span, 0..15);
    }

    #[test]
    fn test_partial_trailing_line() {
        let text = "A".repeat(16);
        let l = layout(&text, 0, 4, 15);
        assert_eq!(l.len(), 2);
        assert_eq!(l.chunks()[0].text, "A".repeat(15));
        assert_eq!(l.chunks()[1].text, "A");
        assert_eq!(l.chunks()[1].line, 1);
        assert_eq!(l.chunks()[1].span, 15..16);
    }

    #[test]
    fn test_start_line_offsets_rows() {
        let l = layout("hello world", 1, 4, 15);
        assert_eq!(l.len(), 1);
        assert_eq!(l.chunks()[0].line, 1);
        assert_eq!(l.chunks()[0].text, "hello world");
    }

    #[test]
    fn test_truncates_to_available_lines() {
        // 3 rows below the timestamp row, 45 chars max
        let text: String = ('a'..='z').cycle().take(60).collect();
        let l = layout(&text, 1, 4, 15);
        assert_eq!(l.len(), 3);
        assert_eq!(l.joined(), &text[..45]);
        let lines: Vec<usize> = l.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_partial_dropped_when_grid_full() {
        // 3 full rows plus 1 char, but only 3 rows available
        let text = "B".repeat(46);
        let l = layout(&text, 1, 4, 15);
        assert_eq!(l.len(), 3);
        assert!(l.iter().all(|c| c.char_len() == 15));
    }

    #[test]
    fn test_invalid_preconditions() {
        assert!(layout("text", 4, 4, 15).is_empty());
        assert!(layout("text", 9, 4, 15).is_empty());
        assert!(layout("text", 0, 4, 0).is_empty());
    }

    #[test]
    fn test_multibyte_never_split() {
        let text = "ñandú ✓ señal recibida";
        let l = layout(text, 0, 5, 5);
        assert_eq!(l.joined(), text);
        for chunk in &l {
            assert!(chunk.char_len() <= 5);
            assert_eq!(&text[chunk.span.clone()], chunk.text);
        }
        assert_eq!(l.chunks()[0].text, "ñandú");
    }

    #[test]
    fn test_concatenation_property() {
        let corpus = [
            "",
            "x",
            "short",
            "exactly fifteen",
            "sixteen chars!!!",
            "a much longer message that certainly does not fit on the grid at all",
        ];
        for text in corpus {
            for width in 1..=20 {
                for total in 1..=5 {
                    let l = layout(text, 0, total, width);
                    let keep = text.len().min(total * width);
                    assert_eq!(l.joined(), &text[..keep], "w={} n={} {:?}", width, total, text);

                    let n = l.len();
                    for (i, chunk) in l.iter().enumerate() {
                        assert_eq!(chunk.line, i);
                        if i + 1 < n {
                            assert_eq!(chunk.char_len(), width);
                        } else {
                            assert!((1..=width).contains(&chunk.char_len()));
                        }
                    }
                }
            }
        }
    }
}
