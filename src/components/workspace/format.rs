//! Toolbar formatting on a plain markdown buffer.
//!
//! Offsets are UTF-16 code units, matching `selectionStart`/`selectionEnd`
//! of a textarea.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
	/// Turns the touched lines into plain paragraphs.
	Paragraph,
	Heading(u8),
	Bold,
	Italic,
	Underline,
	Code,
	Quote,
	BulletList,
	NumberedList,
	Link,
	Image,
	Table,
	CodeBlock,
	ThematicBreak,
}

/// Buffer after a formatting command, with the new selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
	pub text: String,
	pub selection: (usize, usize),
}

fn utf16_len(s: &str) -> usize {
	s.encode_utf16().count()
}

/// Byte index of a UTF-16 offset, clamped to the text and to char boundaries.
fn byte_index(text: &str, offset: usize) -> usize {
	let mut units = 0;
	for (idx, ch) in text.char_indices() {
		if units >= offset {
			return idx;
		}
		units += ch.len_utf16();
	}
	text.len()
}

pub fn apply(text: &str, start: usize, end: usize, format: Format) -> Edit {
	let (start, end) = (start.min(end), start.max(end));
	let (start, end) = (byte_index(text, start), byte_index(text, end));
	match format {
		Format::Paragraph => block_type(text, start, end, None),
		Format::Heading(level) => block_type(text, start, end, Some(level.clamp(1, 6))),
		Format::Bold => wrap(text, start, end, "**", "**", "bold text"),
		Format::Italic => wrap(text, start, end, "*", "*", "italic text"),
		Format::Underline => wrap(text, start, end, "<u>", "</u>", "underlined text"),
		Format::Code => wrap(text, start, end, "`", "`", "code"),
		Format::CodeBlock => wrap(text, start, end, "```\n", "\n```", "code"),
		Format::Link => target_markup(text, start, end, "[", "link"),
		Format::Image => target_markup(text, start, end, "![", "image"),
		Format::Quote => prefix_lines(text, start, end, |_| "> ".to_string()),
		Format::BulletList => prefix_lines(text, start, end, |_| "- ".to_string()),
		Format::NumberedList => prefix_lines(text, start, end, |i| format!("{}. ", i + 1)),
		Format::Table => insert_block(text, end, TABLE, "Column 1"),
		Format::ThematicBreak => insert_block(text, end, "---", ""),
	}
}

const TABLE: &str = "| Column 1 | Column 2 |\n| --- | --- |\n|  |  |";

fn wrap(text: &str, start: usize, end: usize, open: &str, close: &str, placeholder: &str) -> Edit {
	let inner = if start == end { placeholder } else { &text[start..end] };
	let mut out = String::with_capacity(text.len() + open.len() + close.len() + inner.len());
	out.push_str(&text[..start]);
	out.push_str(open);
	out.push_str(inner);
	out.push_str(close);
	out.push_str(&text[end..]);

	let sel_start = utf16_len(&text[..start]) + utf16_len(open);
	Edit {
		text: out,
		selection: (sel_start, sel_start + utf16_len(inner)),
	}
}

/// `[label](url)` or `![alt](url)` around the selection, with `url` selected
/// so it can be typed over.
fn target_markup(text: &str, start: usize, end: usize, open: &str, placeholder: &str) -> Edit {
	let label = if start == end { placeholder } else { &text[start..end] };
	let replacement = format!("{}{}](url)", open, label);
	let out = format!("{}{}{}", &text[..start], replacement, &text[end..]);
	let url_start = utf16_len(&text[..start]) + utf16_len(open) + utf16_len(label) + 2;
	Edit {
		text: out,
		selection: (url_start, url_start + 3),
	}
}

/// Byte range of the whole lines the selection touches.
fn line_span(text: &str, start: usize, end: usize) -> (usize, usize) {
	let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
	let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
	(line_start, line_end)
}

fn replace_lines(text: &str, (line_start, line_end): (usize, usize), lines: Vec<String>) -> Edit {
	let rewritten = lines.join("\n");
	let sel_start = utf16_len(&text[..line_start]);
	Edit {
		selection: (sel_start, sel_start + utf16_len(&rewritten)),
		text: format!("{}{}{}", &text[..line_start], rewritten, &text[line_end..]),
	}
}

/// Prefixes every line the selection touches; removes the prefixes instead
/// when all of those lines already carry them.
fn prefix_lines(text: &str, start: usize, end: usize, marker: impl Fn(usize) -> String) -> Edit {
	let span = line_span(text, start, end);
	let lines: Vec<&str> = text[span.0..span.1].split('\n').collect();
	let already = lines
		.iter()
		.enumerate()
		.all(|(i, line)| line.starts_with(&marker(i)));
	let rewritten = lines
		.iter()
		.enumerate()
		.map(|(i, line)| {
			let marker = marker(i);
			if already {
				line[marker.len()..].to_string()
			} else {
				format!("{}{}", marker, line)
			}
		})
		.collect();
	replace_lines(text, span, rewritten)
}

/// Level and marker length of an ATX heading line.
fn heading_marker(line: &str) -> Option<(usize, usize)> {
	let level = line.chars().take_while(|&c| c == '#').count();
	((1..=6).contains(&level) && line[level..].starts_with(' ')).then_some((level, level + 1))
}

/// Strips heading and quote markers, then applies `level` if given. Applying
/// the level every touched line already has turns them back into paragraphs.
fn block_type(text: &str, start: usize, end: usize, level: Option<u8>) -> Edit {
	let span = line_span(text, start, end);
	let lines: Vec<&str> = text[span.0..span.1].split('\n').collect();
	let level = level.map(usize::from);
	let toggle_off = level.is_some()
		&& lines
			.iter()
			.all(|line| heading_marker(line).map(|(l, _)| l) == level);

	let rewritten = lines
		.iter()
		.map(|&line| {
			let body = match heading_marker(line) {
				Some((_, len)) => &line[len..],
				None => line.strip_prefix("> ").unwrap_or(line),
			};
			match level {
				Some(level) if !toggle_off => format!("{} {}", "#".repeat(level), body),
				_ => body.to_string(),
			}
		})
		.collect();
	replace_lines(text, span, rewritten)
}

/// Inserts `block` as its own paragraph after the line holding `at`. The
/// first occurrence of `select` inside it is selected, or the caret lands after it.
fn insert_block(text: &str, at: usize, block: &str, select: &str) -> Edit {
	let line_end = text[at..].find('\n').map_or(text.len(), |i| at + i);
	let insert = format!("\n\n{}\n", block);
	let base = utf16_len(&text[..line_end]);
	let selection = match block.find(select).filter(|_| !select.is_empty()) {
		Some(i) => {
			let from = base + 2 + utf16_len(&block[..i]);
			(from, from + utf16_len(select))
		}
		None => {
			let caret = base + utf16_len(&insert);
			(caret, caret)
		}
	};
	Edit {
		text: format!("{}{}{}", &text[..line_end], insert, &text[line_end..]),
		selection,
	}
}

/// Undo and redo over whole-buffer snapshots.
///
/// Writing into the textarea from code resets the browser's own undo stack,
/// so the editor keeps its own.
#[derive(Clone, Debug, Default)]
pub struct History {
	past: Vec<Edit>,
	future: Vec<Edit>,
}

impl History {
	const LIMIT: usize = 200;

	/// Remembers `before` as the state preceding a new change.
	pub fn record(&mut self, before: Edit) {
		if self.past.last().is_some_and(|last| last.text == before.text) {
			return;
		}
		self.past.push(before);
		if self.past.len() > Self::LIMIT {
			self.past.remove(0);
		}
		self.future.clear();
	}

	pub fn undo(&mut self, current: Edit) -> Option<Edit> {
		let previous = self.past.pop()?;
		self.future.push(current);
		Some(previous)
	}

	pub fn redo(&mut self, current: Edit) -> Option<Edit> {
		let next = self.future.pop()?;
		self.past.push(current);
		Some(next)
	}

	pub fn can_undo(&self) -> bool {
		!self.past.is_empty()
	}

	pub fn can_redo(&self) -> bool {
		!self.future.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bold_wraps_selection() {
		let edit = apply("make this loud", 10, 14, Format::Bold);
		assert_eq!(edit.text, "make this **loud**");
		assert_eq!(edit.selection, (12, 16));
	}

	#[test]
	fn empty_selection_inserts_placeholder() {
		let edit = apply("ab", 1, 1, Format::Italic);
		assert_eq!(edit.text, "a*italic text*b");
		assert_eq!(edit.selection, (2, 13));
	}

	#[test]
	fn reversed_selection_is_normalized() {
		assert_eq!(apply("xy", 2, 0, Format::Code).text, "`xy`");
	}

	#[test]
	fn heading_prefixes_current_line() {
		let edit = apply("one\ntwo\nthree", 5, 5, Format::Heading(2));
		assert_eq!(edit.text, "one\n## two\nthree");
		assert_eq!(edit.selection, (4, 10));
	}

	#[test]
	fn list_toggles_off_when_present() {
		let on = apply("a\nb", 0, 3, Format::BulletList);
		assert_eq!(on.text, "- a\n- b");
		let off = apply(&on.text, 0, 7, Format::BulletList);
		assert_eq!(off.text, "a\nb");
	}

	#[test]
	fn numbered_list_counts_lines() {
		assert_eq!(apply("a\nb\nc", 0, 5, Format::NumberedList).text, "1. a\n2. b\n3. c");
	}

	#[test]
	fn link_selects_url() {
		let edit = apply("see docs", 4, 8, Format::Link);
		assert_eq!(edit.text, "see [docs](url)");
		assert_eq!(&edit.text[edit.selection.0..edit.selection.1], "url");
	}

	#[test]
	fn offsets_are_utf16_units() {
		// the emoji is two UTF-16 units
		let edit = apply("😀 hi", 3, 5, Format::Bold);
		assert_eq!(edit.text, "😀 **hi**");
		assert_eq!(edit.selection, (5, 7));
	}

	#[test]
	fn heading_replaces_existing_marker() {
		assert_eq!(apply("## x", 0, 0, Format::Heading(1)).text, "# x");
		assert_eq!(apply("> quoted", 0, 0, Format::Heading(3)).text, "### quoted");
		// same level again goes back to a paragraph
		assert_eq!(apply("# x", 0, 0, Format::Heading(1)).text, "x");
	}

	#[test]
	fn paragraph_strips_block_markers() {
		let edit = apply("# title\n> note\nplain", 0, 20, Format::Paragraph);
		assert_eq!(edit.text, "title\nnote\nplain");
	}

	#[test]
	fn underline_uses_html_tag() {
		assert_eq!(apply("mark", 0, 4, Format::Underline).text, "<u>mark</u>");
	}

	#[test]
	fn image_wraps_alt_text_and_selects_url() {
		let edit = apply("a logo", 2, 6, Format::Image);
		assert_eq!(edit.text, "a ![logo](url)");
		assert_eq!(&edit.text[edit.selection.0..edit.selection.1], "url");
		assert_eq!(apply("", 0, 0, Format::Image).text, "![image](url)");
	}

	#[test]
	fn table_is_inserted_after_line_with_header_selected() {
		let edit = apply("intro\nrest", 2, 2, Format::Table);
		assert_eq!(
			edit.text,
			"intro\n\n| Column 1 | Column 2 |\n| --- | --- |\n|  |  |\n\nrest"
		);
		assert_eq!(&edit.text[edit.selection.0..edit.selection.1], "Column 1");
	}

	#[test]
	fn history_undoes_and_redoes() {
		let edit = |text: &str| Edit {
			text: text.into(),
			selection: (0, 0),
		};
		let mut history = History::default();
		assert!(!history.can_undo());
		history.record(edit("a"));
		history.record(edit("ab"));
		assert_eq!(history.undo(edit("abc")).unwrap().text, "ab");
		assert_eq!(history.undo(edit("ab")).unwrap().text, "a");
		assert!(history.undo(edit("a")).is_none());
		assert_eq!(history.redo(edit("a")).unwrap().text, "ab");
		assert!(history.can_redo());

		// a new change drops the redo branch
		history.record(edit("ab"));
		assert!(!history.can_redo());
	}

	#[test]
	fn thematic_break_goes_after_line() {
		let edit = apply("a\nb", 0, 0, Format::ThematicBreak);
		assert_eq!(edit.text, "a\n\n---\n\nb");
		assert_eq!(edit.selection, (7, 7));
	}

	#[test]
	fn out_of_range_offsets_clamp() {
		assert_eq!(apply("ab", 10, 20, Format::Bold).text, "ab**bold text**");
	}
}
