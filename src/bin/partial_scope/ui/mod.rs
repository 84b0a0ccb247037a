//! TUI module for partial-scope
//!
//! Stereo oscilloscope and spectrum of the rendered output, plus demo
//! selection.

mod spectrum;
mod waveform;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use crate::demo::Demo;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Frames shown by the oscilloscope and fed to the FFT.
const VIS_BUFFER_SIZE: usize = 1024;

pub struct ScopeUi {
    /// Stereo output frames from the audio thread
    scope_rx: Consumer<[f32; 2]>,
    /// Demo selections for the audio thread
    demo_tx: Producer<Demo>,
    demo: Demo,
    frames: Vec<[f32; 2]>,
    /// Mid signal of `frames`, the spectrum's input.
    mid: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    sample_rate: f32,
    should_quit: bool,
}

impl ScopeUi {
    pub fn new(scope_rx: Consumer<[f32; 2]>, demo_tx: Producer<Demo>, sample_rate: f32) -> Self {
        Self {
            scope_rx,
            demo_tx,
            demo: Demo::Pcm,
            frames: vec![[0.0; 2]; VIS_BUFFER_SIZE],
            mid: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            sample_rate,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.mid);

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE frames.
    fn poll_audio(&mut self) {
        let available = self.scope_rx.slots();
        if available == 0 {
            return;
        }
        if let Ok(chunk) = self.scope_rx.read_chunk(available) {
            let (first, second) = chunk.as_slices();
            self.frames.extend_from_slice(first);
            self.frames.extend_from_slice(second);
            chunk.commit_all();
        }
        if self.frames.len() > VIS_BUFFER_SIZE {
            let excess = self.frames.len() - VIS_BUFFER_SIZE;
            self.frames.drain(..excess);
        }
        self.mid.clear();
        self.mid.extend(self.frames.iter().map(|[l, r]| (l + r) * 0.5));
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='3') => {
                let demo = Demo::ALL[c as usize - '1' as usize];
                if self.demo_tx.push(demo).is_ok() {
                    self.demo = demo;
                } else {
                    warn!("demo queue full, dropping selection");
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Demo bar
                Constraint::Min(8),    // Scope + spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        self.render_demo_bar(frame, rows[0]);
        render_waveform(frame, columns[0], &self.frames);
        render_spectrum(frame, columns[1], self.spectrum.data());

        let help = Paragraph::new(" [1-3] Select demo  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[2]);
    }

    fn render_demo_bar(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let peak = self
            .frames
            .iter()
            .flatten()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        let mut spans = Vec::new();
        for (i, demo) in Demo::ALL.iter().enumerate() {
            let style = if *demo == self.demo {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(ratatui::text::Span::styled(format!(" {} {} ", i + 1, demo.name()), style));
            spans.push(ratatui::text::Span::raw(" "));
        }
        spans.push(ratatui::text::Span::raw(format!(
            "  peak {peak:.3}  {:.0} Hz",
            self.sample_rate
        )));

        let bar = Paragraph::new(Line::from(spans))
            .block(Block::default().title(" partial-scope ").borders(Borders::ALL));
        frame.render_widget(bar, area);
    }
}
