//! Read-only terminal view of a render snapshot.
//!
//! Render nodes are flattened into styled ratatui lines: block-level tags
//! start new lines, mark tags change the style of the text below them.

use anyhow::Result;
use blockweave_engine::render::UNKNOWN_CLASS;
use blockweave_engine::{RenderBlock, RenderNode, Snapshot};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::{Stdout, stdout};

pub struct App {
    title: String,
    blocks: Vec<RenderBlock>,
    list_state: ListState,
}

impl App {
    pub fn new(title: String, snapshot: Snapshot) -> Self {
        let mut list_state = ListState::default();
        if !snapshot.blocks.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            title,
            blocks: snapshot.blocks,
            list_state,
        }
    }

    fn next_block(&mut self) {
        if self.blocks.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.blocks.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous_block(&mut self) {
        if self.blocks.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.blocks.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn selected(&self) -> Option<&RenderBlock> {
        self.list_state.selected().and_then(|i| self.blocks.get(i))
    }
}

pub fn run(app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = app;
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_block(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_block(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(rows[0]);

    let items: Vec<ListItem> = app
        .blocks
        .iter()
        .map(|block| {
            let style = if block.fallback {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(block.plugin_type.clone(), style)))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Blocks"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(list, columns[0], &mut app.list_state);

    let selected = app.selected().map(|b| b.id.clone());
    let mut lines = Vec::new();
    for block in &app.blocks {
        let mut block_lines = block_lines(block);
        if Some(&block.id) == selected.as_ref() {
            for line in &mut block_lines {
                line.spans.insert(0, Span::styled("▌", Style::default().fg(Color::Yellow)));
            }
        }
        lines.extend(block_lines);
        lines.push(Line::default());
    }
    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(app.title.clone()))
        .wrap(Wrap { trim: false });
    f.render_widget(content, columns[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next"),
    ]));
    f.render_widget(help, rows[1]);
}

/// Lines for one rendered block; the placeholder stands in for empty blocks.
pub fn block_lines(block: &RenderBlock) -> Vec<Line<'static>> {
    let mut out = LineBuilder::default();
    out.node(&block.node, Style::default(), "");
    let mut lines = out.finish();
    if let Some(placeholder) = &block.placeholder
        && lines.iter().all(|l| l.spans.iter().all(|s| s.content.trim().is_empty()))
    {
        lines = vec![Line::from(Span::styled(
            placeholder.clone(),
            Style::default().fg(Color::DarkGray),
        ))];
    }
    lines
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl LineBuilder {
    fn node(&mut self, node: &RenderNode, style: Style, prefix: &str) {
        let RenderNode::Element { tag, children, .. } = node else {
            if let RenderNode::Text(text) = node {
                self.text(text, style, prefix);
            }
            return;
        };

        if node.attr("class").is_some_and(|c| c.split_whitespace().any(|c| c == UNKNOWN_CLASS)) {
            self.break_line();
            self.current.push(Span::styled(
                "[unknown block] ",
                Style::default().fg(Color::Red),
            ));
        }

        match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.break_line();
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                self.current.push(Span::styled(
                    format!("{} ", "#".repeat(level)),
                    Style::default().fg(Color::Cyan),
                ));
                self.children(children, style.add_modifier(Modifier::BOLD), prefix);
                self.break_line();
            }
            "li" => {
                self.break_line();
                self.current.push(Span::raw(format!("{prefix}• ")));
                self.children(children, style, prefix);
                self.break_line();
            }
            "ol" => {
                // Each numbered block renders its own one-item list.
                self.break_line();
                self.current.push(Span::raw(format!("{prefix}1. ")));
                for child in children {
                    match child {
                        RenderNode::Element { tag, children, .. } if tag == "li" => {
                            self.children(children, style, prefix)
                        }
                        other => self.node(other, style, prefix),
                    }
                }
                self.break_line();
            }
            "blockquote" => {
                self.break_line();
                self.children(children, style.add_modifier(Modifier::ITALIC), "│ ");
                self.break_line();
            }
            "pre" => {
                self.break_line();
                let code = node.text_content();
                for line in code.lines() {
                    self.lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::Green),
                    )));
                }
            }
            "input" => {
                let checked = node.attr("checked").is_some();
                self.current
                    .push(Span::raw(if checked { "[x] " } else { "[ ] " }));
            }
            "img" | "video" | "iframe" => {
                let src = node.attr("src").unwrap_or_default();
                self.current.push(Span::styled(
                    format!("[{tag}: {src}]"),
                    Style::default().fg(Color::Magenta),
                ));
            }
            "a" => {
                self.children(children, style.add_modifier(Modifier::UNDERLINED).fg(Color::Blue), prefix);
                if let Some(href) = node.attr("href") {
                    self.current.push(Span::styled(
                        format!(" <{href}>"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            "strong" | "b" => self.children(children, style.add_modifier(Modifier::BOLD), prefix),
            "em" | "i" => self.children(children, style.add_modifier(Modifier::ITALIC), prefix),
            "u" | "ins" => {
                self.children(children, style.add_modifier(Modifier::UNDERLINED), prefix)
            }
            "s" | "del" | "strike" => {
                self.children(children, style.add_modifier(Modifier::CROSSED_OUT), prefix)
            }
            "code" => self.children(children, style.fg(Color::Green), prefix),
            _ => self.children(children, style, prefix),
        }
    }

    fn children(&mut self, children: &[RenderNode], style: Style, prefix: &str) {
        for child in children {
            self.node(child, style, prefix);
        }
    }

    fn text(&mut self, text: &str, style: Style, prefix: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            if self.current.is_empty() && !prefix.is_empty() {
                self.current.push(Span::raw(prefix.to_string()));
            }
            if !part.is_empty() {
                self.current.push(Span::styled(part.to_string(), style));
            }
        }
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.break_line();
        self.lines
    }
}
