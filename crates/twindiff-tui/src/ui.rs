#![forbid(unsafe_code)]

//! Terminal rendering: split panes, gutters, highlights, status line.
//!
//! Both panes share one vertical scroll offset so matching regions stay
//! side by side. Gutter numbers are colored by the classified line kind
//! from the last published result; run highlights come straight from the
//! pane's structure, so they may lag the text while a recompute is
//! pending - exactly the stale-overlay behavior of the focused-pane
//! policy.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, queue};
use twindiff_core::{SegmentKind, Side};
use unicode_width::UnicodeWidthChar;

use crate::app::App;

/// Gutter: four digits plus a space.
const GUTTER_WIDTH: u16 = 5;

/// Draw a full frame.
pub fn draw(out: &mut impl Write, app: &App) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    if width < 2 * GUTTER_WIDTH + 3 || height < 2 {
        return Ok(());
    }
    let content_rows = height - 1;
    let pane_width = (width - 1) / 2;

    queue!(out, cursor::Hide, Clear(ClearType::All))?;

    draw_pane(out, app, Side::Left, 0, pane_width, content_rows)?;
    for row in 0..content_rows {
        queue!(
            out,
            MoveTo(pane_width, row),
            SetForegroundColor(Color::DarkGrey),
            Print("│"),
            ResetColor
        )?;
    }
    draw_pane(
        out,
        app,
        Side::Right,
        pane_width + 1,
        width - pane_width - 1,
        content_rows,
    )?;
    draw_status(out, app, width, content_rows)?;
    position_caret(out, app, pane_width, content_rows)?;
    out.flush()
}

fn draw_pane(
    out: &mut impl Write,
    app: &App,
    side: Side,
    x: u16,
    width: u16,
    rows: u16,
) -> io::Result<()> {
    let pane = app.pane(side);
    let lines = pane.surface.visual_lines();
    let result_lines = app.result().map(|r| r.side_lines(side));
    let text_budget = usize::from(width.saturating_sub(GUTTER_WIDTH));

    for row in 0..rows {
        let idx = app.scroll_top + usize::from(row);
        if idx >= lines.len() {
            continue;
        }
        queue!(out, MoveTo(x, row))?;

        let line_kind = result_lines
            .and_then(|l| l.get(idx))
            .map(|line| line.kind)
            .unwrap_or(SegmentKind::Unchanged);
        let gutter_color = match line_kind {
            SegmentKind::Added => Color::Green,
            SegmentKind::Removed => Color::Red,
            SegmentKind::Unchanged => Color::DarkGrey,
        };
        queue!(
            out,
            SetForegroundColor(gutter_color),
            Print(format!("{:>4} ", idx + 1)),
            ResetColor
        )?;

        let mut used = 0usize;
        for run in &lines[idx] {
            if used >= text_budget {
                break;
            }
            let (clipped, clipped_width) = clip_to_width(&run.text, text_budget - used);
            match run.kind {
                SegmentKind::Added => {
                    queue!(out, SetBackgroundColor(Color::DarkGreen), Print(clipped), ResetColor)?;
                }
                SegmentKind::Removed => {
                    queue!(out, SetBackgroundColor(Color::DarkRed), Print(clipped), ResetColor)?;
                }
                SegmentKind::Unchanged => queue!(out, Print(clipped))?,
            }
            used += clipped_width;
        }
    }
    Ok(())
}

/// Longest prefix fitting in `budget` display columns, with its width.
fn clip_to_width(text: &str, budget: usize) -> (&str, usize) {
    let mut used = 0;
    for (byte, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            return (&text[..byte], used);
        }
        used += w;
    }
    (text, used)
}

fn draw_status(out: &mut impl Write, app: &App, width: u16, row: u16) -> io::Result<()> {
    let pane = app.pane(app.focus());
    let (line, col) = pane.surface.caret_line_col();
    let computing = if app.is_computing() {
        "  computing diff…"
    } else {
        ""
    };
    let status = format!(
        " {}  Ln {}, Col {}{}  ·  Tab switch · Ctrl+Q quit",
        pane.label,
        line + 1,
        col + 1,
        computing
    );
    let (clipped, clipped_width) = clip_to_width(&status, usize::from(width));
    let padding = usize::from(width) - clipped_width;
    queue!(
        out,
        MoveTo(0, row),
        SetAttribute(Attribute::Reverse),
        Print(clipped),
        Print(" ".repeat(padding)),
        SetAttribute(Attribute::Reset)
    )?;
    Ok(())
}

fn position_caret(out: &mut impl Write, app: &App, pane_width: u16, rows: u16) -> io::Result<()> {
    let side = app.focus();
    let pane = app.pane(side);
    let (line, col) = pane.surface.caret_line_col();
    if line < app.scroll_top || line >= app.scroll_top + usize::from(rows) {
        return Ok(());
    }
    let row = (line - app.scroll_top) as u16;

    // Display width of the first `col` chars of the caret line.
    let lines = pane.surface.visual_lines();
    let mut remaining = col;
    let mut caret_x = 0usize;
    if let Some(runs) = lines.get(line) {
        'outer: for run in runs {
            for ch in run.text.chars() {
                if remaining == 0 {
                    break 'outer;
                }
                remaining -= 1;
                caret_x += ch.width().unwrap_or(0);
            }
        }
    }

    let base_x = match side {
        Side::Left => 0,
        Side::Right => pane_width + 1,
    };
    let max_x = base_x + pane_width.saturating_sub(1);
    let x = (base_x + GUTTER_WIDTH + caret_x as u16).min(max_x);
    queue!(out, MoveTo(x, row), cursor::Show)?;
    Ok(())
}
