//! Paint a few boxes on the current terminal, move one, then clean up.
//!
//! Run with `cargo run --example terminal_boxes`. Terminals that do not
//! report their pixel size fall back to 8x16 px cells.

use std::io;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use cellbox::logging::FileSink;
use cellbox::{
    BoxController, CellMetrics, ControllerConfig, Host, Logger, Result, StyleOverride,
    TerminalHost,
};
use crossterm::{cursor, execute, terminal};

fn main() -> Result<()> {
    let host = Rc::new(match TerminalHost::detect().cell_metrics() {
        Ok(_) => TerminalHost::detect(),
        Err(_) => TerminalHost::new(CellMetrics::new(8, 16)),
    });

    let mut config = ControllerConfig::default();
    config.fill.columns = 20;
    config.fill.rows = 6;
    config.enable_metrics();
    if let Ok(sink) = FileSink::new("cellbox_demo.log", 64 * 1024) {
        config = config.with_logger(Logger::new(sink));
    }

    let mut stdout = io::stdout();
    execute!(stdout, terminal::Clear(terminal::ClearType::All), cursor::Hide)?;

    let mut boxes = BoxController::with_config(Rc::clone(&host), config);
    let metrics = host.cell_metrics()?;
    let cell_w = metrics.width_px as i32;
    let cell_h = metrics.height_px as i32;

    let marker = boxes.create(
        2 * cell_w,
        cell_h,
        20 * cell_w,
        6 * cell_h,
        Some(&StyleOverride::new().background_color("#2255aa")),
    )?;
    boxes.create(
        26 * cell_w,
        2 * cell_h,
        14 * cell_w,
        4 * cell_h,
        Some(
            &StyleOverride::new()
                .background_color("dark_green")
                .border_color("yellow")
                .border_width(1),
        ),
    )?;
    host.render(&mut stdout)?;

    for step in 1..=10 {
        thread::sleep(Duration::from_millis(120));
        boxes.move_to(marker, (2 + step) * cell_w, (1 + step / 3) * cell_h)?;
        host.render(&mut stdout)?;
    }

    thread::sleep(Duration::from_millis(500));
    boxes.emit_metrics();
    boxes.delete_all();
    host.render(&mut stdout)?;
    execute!(stdout, cursor::Show, cursor::MoveTo(0, 0))?;
    Ok(())
}
