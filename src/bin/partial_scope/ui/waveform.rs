//! Stereo oscilloscope
//!
//! Left and right are drawn over each other. With a centred partial the two
//! traces coincide; pan and split-pan structures pull them apart.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

const LEFT: usize = 0;
const RIGHT: usize = 1;

/// (frame index, sample) points for one channel.
fn channel_trace(frames: &[[f32; 2]], channel: usize) -> Vec<(f64, f64)> {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| (i as f64, frame[channel] as f64))
        .collect()
}

/// Left level minus right level as a share of the louder one, -1..1.
/// Zero for silence.
pub fn balance(frames: &[[f32; 2]]) -> f32 {
    let (left, right) = frames.iter().fold((0.0f32, 0.0f32), |(l, r), frame| {
        (l.max(frame[LEFT].abs()), r.max(frame[RIGHT].abs()))
    });
    let louder = left.max(right);
    if louder == 0.0 {
        0.0
    } else {
        (left - right) / louder
    }
}

pub fn render_waveform(frame: &mut Frame, area: Rect, frames: &[[f32; 2]]) {
    let title = format!(" Output  L/R balance {:+.2} ", balance(frames));
    let block = Block::default().title(title).borders(Borders::ALL);

    let left = channel_trace(frames, LEFT);
    let right = channel_trace(frames, RIGHT);
    let datasets = vec![
        Dataset::default()
            .name("L")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&left),
        Dataset::default()
            .name("R")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&right),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, frames.len().max(1) as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .labels(vec!["-1.0", "0.0", "1.0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_pick_their_own_channel() {
        let frames = [[0.5, -0.5], [0.25, 0.0]];
        assert_eq!(channel_trace(&frames, LEFT), [(0.0, 0.5), (1.0, 0.25)]);
        assert_eq!(channel_trace(&frames, RIGHT), [(0.0, -0.5), (1.0, 0.0)]);
    }

    #[test]
    fn balance_follows_pan() {
        assert_eq!(balance(&[[0.0, 0.0]; 4]), 0.0);
        assert_eq!(balance(&[[0.5, -0.5], [-0.25, 0.25]]), 0.0);
        assert_eq!(balance(&[[0.8, 0.0]]), 1.0);
        assert_eq!(balance(&[[0.0, -0.4]]), -1.0);
        assert!((balance(&[[0.5, 0.25]]) - 0.5).abs() < 1e-6);
    }
}
