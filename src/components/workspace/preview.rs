//! Block-level reading of markdown for the preview pane. Inline markup is
//! shown as written.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
	Heading { level: u8, text: String },
	Paragraph(String),
	ListItem { ordered: bool, text: String },
	Quote(String),
	Code { lang: Option<String>, body: String },
	Table { header: Vec<String>, rows: Vec<Vec<String>> },
	Image { alt: String, url: String },
	Rule,
}

fn heading(line: &str) -> Option<Block> {
	let level = line.chars().take_while(|&c| c == '#').count();
	if !(1..=6).contains(&level) {
		return None;
	}
	let rest = &line[level..];
	if !rest.is_empty() && !rest.starts_with(' ') {
		return None;
	}
	Some(Block::Heading {
		level: level as u8,
		text: rest.trim().to_string(),
	})
}

fn list_item(line: &str) -> Option<Block> {
	for marker in ["- ", "* ", "+ "] {
		if let Some(text) = line.strip_prefix(marker) {
			return Some(Block::ListItem {
				ordered: false,
				text: text.trim().to_string(),
			});
		}
	}
	let digits = line.chars().take_while(char::is_ascii_digit).count();
	let text = line[digits..].strip_prefix(". ")?;
	(digits > 0).then(|| Block::ListItem {
		ordered: true,
		text: text.trim().to_string(),
	})
}

fn cells(line: &str) -> Vec<String> {
	let inner = line.trim().trim_start_matches('|').trim_end_matches('|');
	inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn is_table_separator(line: &str) -> bool {
	let cells = cells(line);
	!cells.is_empty()
		&& cells
			.iter()
			.all(|c| c.contains('-') && c.chars().all(|ch| matches!(ch, '-' | ':')))
}

/// A line holding nothing but `![alt](url)`.
fn image(line: &str) -> Option<Block> {
	let rest = line.strip_prefix("![")?;
	let (alt, rest) = rest.split_once("](")?;
	let url = rest.strip_suffix(')')?;
	Some(Block::Image {
		alt: alt.to_string(),
		url: url.trim().to_string(),
	})
}

fn is_rule(line: &str) -> bool {
	let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
	compact.len() >= 3
		&& ['-', '*', '_']
			.iter()
			.any(|&m| compact.chars().all(|c| c == m))
}

pub fn blocks(markdown: &str) -> Vec<Block> {
	let mut out = Vec::new();
	let mut paragraph: Vec<&str> = Vec::new();
	let mut code: Option<(Option<String>, Vec<&str>)> = None;

	let flush = |paragraph: &mut Vec<&str>, out: &mut Vec<Block>| {
		if !paragraph.is_empty() {
			out.push(Block::Paragraph(paragraph.join(" ")));
			paragraph.clear();
		}
	};

	let mut lines = markdown.lines().peekable();
	while let Some(raw) = lines.next() {
		let line = raw.trim_end();
		if let Some((lang, body)) = code.as_mut() {
			if line.trim_start().starts_with("```") {
				out.push(Block::Code {
					lang: lang.take(),
					body: body.join("\n"),
				});
				code = None;
			} else {
				body.push(raw);
			}
			continue;
		}

		let trimmed = line.trim_start();
		if let Some(info) = trimmed.strip_prefix("```") {
			flush(&mut paragraph, &mut out);
			let lang = Some(info.trim()).filter(|l| !l.is_empty()).map(str::to_string);
			code = Some((lang, Vec::new()));
		} else if trimmed.is_empty() {
			flush(&mut paragraph, &mut out);
		} else if trimmed.starts_with('|')
			&& lines.peek().is_some_and(|next| is_table_separator(next))
		{
			flush(&mut paragraph, &mut out);
			lines.next();
			let header = cells(trimmed);
			let mut rows = Vec::new();
			while let Some(row) = lines.next_if(|l| l.trim_start().starts_with('|')) {
				rows.push(cells(row));
			}
			out.push(Block::Table { header, rows });
		} else if let Some(block) = image(trimmed) {
			flush(&mut paragraph, &mut out);
			out.push(block);
		} else if is_rule(trimmed) {
			flush(&mut paragraph, &mut out);
			out.push(Block::Rule);
		} else if let Some(block) = heading(trimmed).or_else(|| list_item(trimmed)) {
			flush(&mut paragraph, &mut out);
			out.push(block);
		} else if let Some(text) = trimmed.strip_prefix('>') {
			flush(&mut paragraph, &mut out);
			out.push(Block::Quote(text.trim().to_string()));
		} else {
			paragraph.push(trimmed);
		}
	}

	flush(&mut paragraph, &mut out);
	// an unterminated fence still shows its contents
	if let Some((lang, body)) = code {
		out.push(Block::Code {
			lang,
			body: body.join("\n"),
		});
	}
	out
}
