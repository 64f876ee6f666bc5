mod app;
mod logger;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::LevelFilter;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use palette_springs::EngineConfig;
use palette_springs::gradient::{self, GradientPolicy};
use palette_springs::palette::{self, GROUPS, POSITIONS, SLOTS};

use app::App;

const FRAME: Duration = Duration::from_millis(33);
const LOG_LINES: usize = 6;

/// `palette-springs-harness [config.toml] [palette.txt]`
fn main() -> Result<()> {
    logger::init(LevelFilter::Debug).context("installing logger")?;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            EngineConfig::load(&path).with_context(|| format!("loading config {path}"))?
        }
        None => EngineConfig::default(),
    };
    let save_path = args.next().map(PathBuf::from).unwrap_or_else(|| "palette.txt".into());

    enable_raw_mode()?;
    crossterm::execute!(io::stdout(), EnterAlternateScreen)?;

    let result = run(App::new(config, save_path));

    disable_raw_mode()?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)?;

    result
}

fn run(mut app: App) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    while !app.should_quit {
        app.tick();
        terminal.draw(|f| draw(f, &app))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(LOG_LINES as u16 + 2),
    ])
    .split(f.area());

    header(f, rows[0]);

    let cols = Layout::horizontal([Constraint::Length(46), Constraint::Min(0)]).split(rows[1]);

    swatches(f, cols[0], app);

    let right = Layout::vertical([Constraint::Length(10), Constraint::Min(0)]).split(cols[1]);

    details(f, right[0], app);
    gradients(f, right[1], app);
    logs(f, rows[2]);
}

fn header(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(
            "palette-springs  [arrows move] [enter active] [l lock] [c spring] [t ring] \
             [x clear] [space run] [n step] [g gradient] [m match] [+/- light] [r regen] \
             [s save] [o load] [q quit]",
        )
        .style(Style::new().fg(Color::DarkGray)),
        area,
    );
}

fn text_color(color: palette_springs::Color) -> Color {
    if color.luminance() > 0.18 {
        Color::Black
    } else {
        Color::White
    }
}

fn swatches(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.store.palette();
    let mut lines = Vec::new();

    for group in 0..GROUPS {
        lines.push(Line::from(format!(" group {}", group + 1)).style(Style::new().bold()));

        for slot in 0..SLOTS {
            let mut spans = Vec::new();

            for position in 0..POSITIONS {
                let index = palette::index(group, slot, position);
                let Some(color) = palette.get(index) else {
                    continue;
                };

                let marker = if index == app.cursor { ">" } else { " " };
                let lock = if app.store.is_locked(index) { "L" } else { " " };
                let active = if app.store.active() == Some(index) { "*" } else { " " };

                spans.push(Span::raw(marker));
                spans.push(Span::styled(
                    format!("{active}{:.3}{lock}", color.luminance()),
                    Style::new().bg(color.into()).fg(text_color(color)),
                ));
                spans.push(Span::raw(" "));
            }

            lines.push(Line::from(spans));
        }
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(" palette ")),
        area,
    );
}

fn details(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();

    if let Some(color) = app.cursor_color() {
        let (group, slot, position) = palette::coordinates(app.cursor);
        let (h, s, l) = color.hsl();
        let rgb = color.rgb();
        let velocity = app.network.velocity(app.cursor).unwrap_or_default();

        lines.push(Line::from(format!(
            "#{}  group {} palette {} position {}",
            app.cursor,
            group + 1,
            slot + 1,
            position + 1
        )));
        lines.push(Line::from(format!(
            "HSL({h:.1}, {s:.1}, {l:.1})  RGB({}, {}, {})  L={:.3}",
            rgb.r,
            rgb.g,
            rgb.b,
            color.luminance()
        )));
        lines.push(Line::from(format!(
            "velocity h {:+.3} s {:+.3} l {:+.3}",
            velocity.h, velocity.s, velocity.l
        )));

        let neighbors: Vec<String> = app
            .network
            .neighbors(app.cursor)
            .map(|n| n.to_string())
            .collect();
        lines.push(Line::from(format!("springs to [{}]", neighbors.join(", "))));
    }

    lines.push(Line::from(format!(
        "active {}  locked {}  springs {}",
        app.store
            .active()
            .map_or_else(|| "-".to_string(), |i| i.to_string()),
        app.store.locked().len(),
        app.network.connection_count()
    )));

    let params = app.network.params();
    lines.push(Line::from(format!(
        "k {}  damping {}  dt {}  energy {:.5}  {}",
        params.spring_constant,
        params.damping,
        params.timestep,
        app.network.kinetic_energy(),
        if app.running { "running" } else { "paused" }
    )));

    f.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(" selection ")),
        area,
    );
}

fn gradients(f: &mut Frame, area: Rect, app: &App) {
    let title = match app.gradient_ends() {
        Some((a, b)) => format!(" gradient #{a} → #{b} "),
        None => " gradient ".to_string(),
    };

    let mut lines = Vec::new();

    for policy in GradientPolicy::ALL {
        let sequence = app.gradients.get(policy);
        let spread = gradient::step_spread(sequence)
            .map(|(lo, hi)| format!("  step {lo:.3}..{hi:.3}"))
            .unwrap_or_default();

        lines.push(Line::from(format!("{}{spread}", policy.name())));
        lines.push(Line::from(
            sequence
                .iter()
                .map(|&c| Span::styled("  ", Style::new().bg(c.into())))
                .collect::<Vec<_>>(),
        ));
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(title)),
        area,
    );
}

fn logs(f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = logger::LOGGER
        .recent(LOG_LINES)
        .into_iter()
        .map(Line::from)
        .collect();

    f.render_widget(
        Paragraph::new(lines)
            .style(Style::new().fg(Color::Gray))
            .block(Block::bordered().title(" log ")),
        area,
    );
}
