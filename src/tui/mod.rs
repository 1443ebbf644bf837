pub mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use ab_glyph::FontVec;
use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::backend::GenerationBackend;
use crate::color::Color as AppColor;
use crate::palette::{DisplayOptions, Palette};
use crate::pipeline::render::{encode_png, render_palette};
use crate::session::Session;
use widgets::PaletteStrip;

/// Everything the interactive session needs from the command line.
pub struct TuiConfig {
    pub backend: Option<Arc<dyn GenerationBackend>>,
    pub seed: Option<Palette>,
    pub options: DisplayOptions,
    pub font: Option<FontVec>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    /// Describe a new palette and generate it.
    Prompt,
    /// Describe a revision of the current palette.
    AiEdit,
    /// Manual per-color editing.
    Customize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldEdit {
    None,
    Hex,
    Name,
}

struct App {
    session: Session,
    backend: Option<Arc<dyn GenerationBackend>>,
    font: Option<FontVec>,
    output: PathBuf,
    view: View,
    field: FieldEdit,
    /// The generation prompt, kept across view switches.
    prompt: String,
    /// Scratch buffer for the AI-edit instruction and field editing.
    input: String,
    selected: usize,
    /// Transient local status (saved file, refused actions). Distinct from
    /// the session's user-facing backend messages.
    status: Option<String>,
    quit: bool,
}

/// Launch the interactive session and restore the terminal on the way out.
pub async fn run(config: TuiConfig) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, config).await;
    ratatui::restore();
    result
}

async fn event_loop(terminal: &mut DefaultTerminal, config: TuiConfig) -> Result<()> {
    let session = match config.seed {
        Some(palette) => Session::with_palette(palette, config.options),
        None => Session::new(config.options),
    };
    let mut app = App {
        session,
        backend: config.backend,
        font: config.font,
        output: config.output,
        view: View::Prompt,
        field: FieldEdit::None,
        prompt: String::new(),
        input: String::new(),
        selected: 0,
        status: None,
        quit: false,
    };

    // A single in-flight request reports back over this channel; the
    // session's busy flag keeps a second one from starting.
    let (tx, mut rx) = mpsc::channel::<Result<String>>(1);
    let mut events = EventStream::new();

    while !app.quit {
        terminal.draw(|frame| app.draw(frame))?;
        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.on_key(key, &tx);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                }
            }
            Some(outcome) = rx.recv() => {
                match outcome {
                    Ok(text) => {
                        app.session.apply_response(&text);
                    }
                    Err(err) => app.session.apply_error(&err),
                }
                app.clamp_selection();
            }
        }
    }
    Ok(())
}

impl App {
    fn clamp_selection(&mut self) {
        let len = self.session.palette().map_or(0, Palette::len);
        if len > 0 && self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn on_key(&mut self, key: KeyEvent, tx: &mpsc::Sender<Result<String>>) {
        self.status = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        if ctrl && key.code == KeyCode::Char('s') {
            self.save();
            return;
        }

        if self.field != FieldEdit::None {
            self.on_field_key(key);
            return;
        }
        match self.view {
            View::Prompt => self.on_prompt_key(key, ctrl, tx),
            View::AiEdit => self.on_ai_edit_key(key, tx),
            View::Customize => self.on_customize_key(key),
        }
    }

    fn on_prompt_key(&mut self, key: KeyEvent, ctrl: bool, tx: &mpsc::Sender<Result<String>>) {
        match key.code {
            KeyCode::Enter => self.submit_generate(tx),
            KeyCode::Tab if self.session.palette().is_some() => self.view = View::Customize,
            KeyCode::Char('e') if ctrl && self.session.palette().is_some() => {
                self.input.clear();
                self.view = View::AiEdit;
            }
            KeyCode::Esc => self.quit = true,
            KeyCode::Backspace => {
                self.prompt.pop();
            }
            KeyCode::Char(c) if !ctrl => self.prompt.push(c),
            _ => {}
        }
    }

    fn on_ai_edit_key(&mut self, key: KeyEvent, tx: &mpsc::Sender<Result<String>>) {
        match key.code {
            KeyCode::Enter => self.submit_edit(tx),
            KeyCode::Esc => self.view = View::Prompt,
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c)
            }
            _ => {}
        }
    }

    fn on_customize_key(&mut self, key: KeyEvent) {
        let len = self.session.palette().map_or(0, Palette::len);
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.view = View::Prompt,
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Left if self.selected > 0 => self.selected -= 1,
            KeyCode::Right if self.selected + 1 < len => self.selected += 1,
            KeyCode::Char('h') => {
                self.session.options.show_hex = !self.session.options.show_hex;
            }
            KeyCode::Char('n') => {
                self.session.options.show_name = !self.session.options.show_name;
            }
            KeyCode::Char('a') => {
                if let Some(palette) = self.session.palette_mut() {
                    palette.add_default();
                }
            }
            KeyCode::Char('d') => {
                let index = self.selected;
                if let Some(palette) = self.session.palette_mut() {
                    if !palette.remove(index) {
                        self.status = Some("a palette keeps at least 2 colors".into());
                    }
                }
                self.clamp_selection();
            }
            KeyCode::Char('e') => {
                if let Some(hex) = self.selected_entry().map(|e| e.color.to_hex()) {
                    self.input = hex;
                    self.field = FieldEdit::Hex;
                }
            }
            KeyCode::Char('r') => {
                if let Some(name) = self.selected_entry().map(|e| e.name.clone()) {
                    self.input = name;
                    self.field = FieldEdit::Name;
                }
            }
            KeyCode::Char('s') => self.save(),
            _ => {}
        }
    }

    fn on_field_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.field = FieldEdit::None,
            KeyCode::Enter => self.commit_field(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c)
            }
            _ => {}
        }
    }

    fn selected_entry(&self) -> Option<&crate::palette::ColorEntry> {
        self.session.palette()?.get(self.selected)
    }

    fn commit_field(&mut self) {
        let index = self.selected;
        match self.field {
            FieldEdit::Hex => match AppColor::from_hex(&self.input) {
                Ok(color) => {
                    if let Some(palette) = self.session.palette_mut() {
                        palette.set_color(index, color);
                    }
                    self.field = FieldEdit::None;
                }
                Err(err) => self.status = Some(format!("{err:#}")),
            },
            FieldEdit::Name => {
                let name = self.input.clone();
                if let Some(palette) = self.session.palette_mut() {
                    palette.rename(index, name);
                }
                self.field = FieldEdit::None;
            }
            FieldEdit::None => {}
        }
    }

    fn submit_generate(&mut self, tx: &mpsc::Sender<Result<String>>) {
        if !self.session.can_submit(&self.prompt) {
            self.status = Some("describe the palette in a few words first".into());
            return;
        }
        let Some(backend) = self.backend.clone() else {
            self.status = Some("no backend URL configured (--backend-url)".into());
            return;
        };
        if !self.session.begin_request() {
            return;
        }
        let prompt = self.prompt.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(backend.generate(&prompt).await).await;
        });
    }

    fn submit_edit(&mut self, tx: &mpsc::Sender<Result<String>>) {
        if !self.session.can_submit(&self.input) {
            self.status = Some("describe the change in a few words first".into());
            return;
        }
        let Some(instruction) = self.session.edit_instruction(&self.input) else {
            self.status = Some("generate a palette before editing it".into());
            return;
        };
        let Some(backend) = self.backend.clone() else {
            self.status = Some("no backend URL configured (--backend-url)".into());
            return;
        };
        if !self.session.begin_request() {
            return;
        }
        let tx = tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(backend.edit(&instruction).await).await;
        });
    }

    fn save(&mut self) {
        let Some(palette) = self.session.palette() else {
            self.status = Some("nothing to save yet".into());
            return;
        };
        let result = render_palette(palette, self.session.options, self.font.as_ref())
            .and_then(|image| encode_png(&image))
            .and_then(|bytes| {
                std::fs::write(&self.output, bytes).map_err(anyhow::Error::from)
            });
        self.status = Some(match result {
            Ok(()) => format!("wrote {}", self.output.display()),
            Err(err) => format!("save failed: {err:#}"),
        });
    }

    fn draw(&self, frame: &mut Frame) {
        let strip_height = if self.session.palette().is_some() { 8 } else { 0 };
        let [title_area, body_area, strip_area, status_area, help_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(4),
                Constraint::Length(strip_height),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(frame.area());

        frame.render_widget(
            Paragraph::new(" huesmith — AI color palettes")
                .style(Style::default().add_modifier(Modifier::BOLD)),
            title_area,
        );

        self.draw_body(frame, body_area);

        if let Some(palette) = self.session.palette() {
            let selected = (self.view == View::Customize).then_some(self.selected);
            frame.render_widget(
                PaletteStrip::new(palette, self.session.options, selected),
                strip_area,
            );
        }

        let status = if self.session.busy {
            "working…".to_string()
        } else if let Some(message) = &self.session.message {
            message.clone()
        } else {
            self.status.clone().unwrap_or_default()
        };
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::Yellow)),
            status_area,
        );

        frame.render_widget(
            Paragraph::new(self.help_line()).style(Style::default().fg(Color::DarkGray)),
            help_area,
        );
    }

    fn draw_body(&self, frame: &mut Frame, area: Rect) {
        let (title, text) = match (self.field, self.view) {
            (FieldEdit::Hex, _) => ("Edit hex (#RRGGBB)", self.input.as_str()),
            (FieldEdit::Name, _) => ("Edit name", self.input.as_str()),
            (FieldEdit::None, View::Prompt) => {
                ("Describe the color palette you want", self.prompt.as_str())
            }
            (FieldEdit::None, View::AiEdit) => {
                ("Describe how to change the palette", self.input.as_str())
            }
            (FieldEdit::None, View::Customize) => (
                "Customize",
                "arrows select, e hex, r name, a add, d delete, h/n toggle labels",
            ),
        };
        let editing = !(self.field == FieldEdit::None && self.view == View::Customize);
        let content = if editing {
            format!("{text}▏")
        } else {
            text.to_string()
        };
        frame.render_widget(
            Paragraph::new(content)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(title)),
            area,
        );
    }

    fn help_line(&self) -> &'static str {
        if self.field != FieldEdit::None {
            return " enter apply · esc cancel";
        }
        match self.view {
            View::Prompt => {
                " enter generate · ctrl+e edit with AI · tab customize · ctrl+s save · esc quit"
            }
            View::AiEdit => " enter submit · esc back · ctrl+s save · ctrl+c quit",
            View::Customize => " s/ctrl+s save · tab/esc back · q quit",
        }
    }
}
