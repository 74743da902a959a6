use leptos::prelude::*;
use log::debug;
use web_sys::{HtmlSelectElement, HtmlTextAreaElement, MouseEvent};

use super::format::{self, Edit, Format, History};
use super::preview::{self, Block};

/// Text a fresh editor opens with.
pub const PLACEHOLDER: &str = "The markdown to input";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewMode {
	Source,
	RichText,
}

const INLINE_TOOLS: &[(&str, &str, Format)] = &[
	("B", "Bold", Format::Bold),
	("I", "Italic", Format::Italic),
	("U", "Underline", Format::Underline),
	("`", "Inline code", Format::Code),
];

const INSERT_TOOLS: &[(&str, &str, Format)] = &[
	("•", "Bulleted list", Format::BulletList),
	("1.", "Numbered list", Format::NumberedList),
	("🔗", "Link", Format::Link),
	("🖼", "Image", Format::Image),
	("▦", "Table", Format::Table),
	("―", "Thematic break", Format::ThematicBreak),
	("{ }", "Code block", Format::CodeBlock),
];

/// Options of the block type select; the value is the option's index.
const BLOCK_TYPES: &[(&str, Format)] = &[
	("Paragraph", Format::Paragraph),
	("Quote", Format::Quote),
	("Heading 1", Format::Heading(1)),
	("Heading 2", Format::Heading(2)),
	("Heading 3", Format::Heading(3)),
	("Heading 4", Format::Heading(4)),
	("Heading 5", Format::Heading(5)),
	("Heading 6", Format::Heading(6)),
];

const TOOLBAR_STYLE: &str =
	"display: flex; align-items: center; gap: 4px; padding: 4px; border-bottom: 1px solid #333;";
const SOURCE_STYLE: &str = "flex: 1; resize: none; background: transparent; color: #eee; \
	border: none; padding: 12px; font-family: monospace;";

fn render_block(block: Block) -> AnyView {
	match block {
		Block::Heading { level: 1, text } => view! { <h1>{text}</h1> }.into_any(),
		Block::Heading { level: 2, text } => view! { <h2>{text}</h2> }.into_any(),
		Block::Heading { level: 3, text } => view! { <h3>{text}</h3> }.into_any(),
		Block::Heading { level: 4, text } => view! { <h4>{text}</h4> }.into_any(),
		Block::Heading { level: 5, text } => view! { <h5>{text}</h5> }.into_any(),
		Block::Heading { text, .. } => view! { <h6>{text}</h6> }.into_any(),
		Block::Paragraph(text) => view! { <p>{text}</p> }.into_any(),
		Block::ListItem { ordered, text } => {
			let style = if ordered {
				"display: list-item; list-style: decimal inside;"
			} else {
				"display: list-item; list-style: disc inside;"
			};
			view! { <div style=style>{text}</div> }.into_any()
		}
		Block::Quote(text) => view! { <blockquote>{text}</blockquote> }.into_any(),
		Block::Code { lang, body } => view! {
			<pre><code data-lang=lang.unwrap_or_default()>{body}</code></pre>
		}
		.into_any(),
		Block::Table { header, rows } => view! {
			<table style="border-collapse: collapse;">
				<thead>
					<tr>
						{header
							.into_iter()
							.map(|cell| view! { <th style="border: 1px solid #444; padding: 4px 8px;">{cell}</th> })
							.collect_view()}
					</tr>
				</thead>
				<tbody>
					{rows
						.into_iter()
						.map(|row| {
							view! {
								<tr>
									{row
										.into_iter()
										.map(|cell| view! { <td style="border: 1px solid #444; padding: 4px 8px;">{cell}</td> })
										.collect_view()}
								</tr>
							}
						})
						.collect_view()}
				</tbody>
			</table>
		}
		.into_any(),
		Block::Image { alt, url } => view! { <img src=url alt=alt style="max-width: 100%;" /> }.into_any(),
		Block::Rule => view! { <hr /> }.into_any(),
	}
}

/// Buffer and selection currently in the textarea.
fn read(area: &HtmlTextAreaElement) -> Edit {
	let start = area.selection_start().ok().flatten().unwrap_or(0);
	let end = area.selection_end().ok().flatten().unwrap_or(start);
	Edit {
		text: area.value(),
		selection: (start as usize, end as usize),
	}
}

fn write(area: &HtmlTextAreaElement, edit: &Edit) {
	area.set_value(&edit.text);
	let _ = area.set_selection_range(edit.selection.0 as u32, edit.selection.1 as u32);
	let _ = area.focus();
}

/// Markdown editor with a formatting toolbar, undo history, and a rich-text
/// view it opens in.
#[component]
pub fn MarkdownEditor(#[prop(into)] md_input: String) -> impl IntoView {
	let textarea_ref = NodeRef::<leptos::html::Textarea>::new();
	let block_select_ref = NodeRef::<leptos::html::Select>::new();
	let markdown = RwSignal::new(md_input);
	let history = RwSignal::new(History::default());
	let mode = RwSignal::new(ViewMode::RichText);

	let apply_format = move |format: Format| {
		let Some(area) = textarea_ref.get() else {
			return;
		};
		let area: HtmlTextAreaElement = area.into();
		let before = read(&area);
		let edit = format::apply(&before.text, before.selection.0, before.selection.1, format);
		history.update(|h| h.record(before));
		write(&area, &edit);
		debug!("{:?} applied, markdown now {} chars", format, edit.text.chars().count());
		markdown.set(edit.text);
	};

	let step_history = move |undo: bool| {
		let Some(area) = textarea_ref.get() else {
			return;
		};
		let area: HtmlTextAreaElement = area.into();
		let current = read(&area);
		let target = history
			.try_update(|h| if undo { h.undo(current) } else { h.redo(current) })
			.flatten();
		if let Some(edit) = target {
			write(&area, &edit);
			debug!("{} to {} chars", if undo { "undo" } else { "redo" }, edit.text.chars().count());
			markdown.set(edit.text);
		}
	};

	let tool_buttons = move |tools: &'static [(&'static str, &'static str, Format)]| {
		tools
			.iter()
			.map(|&(label, title, format)| {
				view! {
					<button
						class="md-editor__tool"
						title=title
						// mousedown keeps the textarea selection alive
						on:mousedown=move |ev: MouseEvent| {
							ev.prevent_default();
							apply_format(format);
						}
					>
						{label}
					</button>
				}
			})
			.collect_view()
	};

	let on_block_type = move |ev: web_sys::Event| {
		let choice = event_target_value(&ev).parse::<usize>().ok();
		if let Some(&(_, format)) = choice.and_then(|i| BLOCK_TYPES.get(i)) {
			apply_format(format);
		}
		if let Some(select) = block_select_ref.get() {
			let select: HtmlSelectElement = select.into();
			select.set_value("");
		}
	};

	let toggle_mode = move |_: MouseEvent| {
		mode.update(|m| {
			*m = match m {
				ViewMode::Source => ViewMode::RichText,
				ViewMode::RichText => ViewMode::Source,
			}
		});
	};

	view! {
		<div class="md-editor dark-theme dark-editor" style="display: flex; flex-direction: column; height: 100%;">
			<div class="md-editor__toolbar" style=TOOLBAR_STYLE>
				<button
					title="Undo"
					disabled=move || history.with(|h| !h.can_undo())
					on:mousedown=move |ev: MouseEvent| {
						ev.prevent_default();
						step_history(true);
					}
				>
					"↶"
				</button>
				<button
					title="Redo"
					disabled=move || history.with(|h| !h.can_redo())
					on:mousedown=move |ev: MouseEvent| {
						ev.prevent_default();
						step_history(false);
					}
				>
					"↷"
				</button>
				{tool_buttons(INLINE_TOOLS)}
				<select node_ref=block_select_ref class="md-editor__block-type" on:change=on_block_type>
					<option value="" selected>"Block type"</option>
					{BLOCK_TYPES
						.iter()
						.enumerate()
						.map(|(i, &(label, _))| view! { <option value=i.to_string()>{label}</option> })
						.collect_view()}
				</select>
				{tool_buttons(INSERT_TOOLS)}
				<span style="flex: 1;" />
				<button class="md-editor__mode" on:click=toggle_mode>
					{move || match mode.get() {
						ViewMode::Source => "Rich text",
						ViewMode::RichText => "Source",
					}}
				</button>
			</div>
			<textarea
				node_ref=textarea_ref
				class="md-editor__source"
				prop:value=markdown.get_untracked()
				style=move || {
					let display = if mode.get() == ViewMode::Source { "block" } else { "none" };
					format!("{} display: {};", SOURCE_STYLE, display)
				}
				on:input=move |ev| {
					let value = event_target_value(&ev);
					let before = Edit {
						text: markdown.get_untracked(),
						selection: (0, 0),
					};
					history.update(|h| h.record(before));
					debug!("markdown edited, {} chars", value.chars().count());
					markdown.set(value);
				}
			/>
			<Show when=move || mode.get() == ViewMode::RichText>
				<div class="md-editor__preview" style="flex: 1; overflow: auto; padding: 12px; color: #eee;">
					{move || {
						preview::blocks(&markdown.get())
							.into_iter()
							.map(render_block)
							.collect_view()
					}}
				</div>
			</Show>
		</div>
	}
}
