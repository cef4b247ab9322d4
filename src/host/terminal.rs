use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor};

use crate::error::{BoxError, Result};
use crate::geometry::{CellMetrics, CellSize, Position};
use crate::style::parse_color;

use super::{ContentId, ContentSettings, FaceOverride, Host, SurfaceDelta, SurfaceId, SurfaceParams};

/// Terminal root; every box is a child of it.
const TERMINAL_ROOT: SurfaceId = SurfaceId(0);

#[derive(Debug, Clone, Copy)]
enum MetricSource {
    Fixed(CellMetrics),
    Detect,
}

#[derive(Debug)]
struct TerminalSurface {
    params: SurfaceParams,
    content: Option<ContentId>,
}

#[derive(Debug, Default)]
struct TerminalState {
    next_id: u64,
    order: Vec<SurfaceId>,
    surfaces: HashMap<SurfaceId, TerminalSurface>,
    faces: HashMap<ContentId, Option<FaceOverride>>,
    stale: Vec<(Position, CellSize)>,
    dirty: bool,
}

/// Host that paints boxes as solid cell rectangles on an ANSI terminal.
///
/// Boxes stack in creation order. Nothing reaches the terminal until
/// [`TerminalHost::render`] is called; areas vacated by moved, resized or
/// deleted boxes are blanked on the next render.
#[derive(Debug)]
pub struct TerminalHost {
    metrics: MetricSource,
    state: RefCell<TerminalState>,
}

impl TerminalHost {
    /// Host with fixed cell metrics.
    pub fn new(metrics: CellMetrics) -> Self {
        Self::with_source(MetricSource::Fixed(metrics))
    }

    /// Host that asks the terminal for its pixel size on every metric query.
    pub fn detect() -> Self {
        Self::with_source(MetricSource::Detect)
    }

    fn with_source(metrics: MetricSource) -> Self {
        Self {
            metrics,
            state: RefCell::new(TerminalState {
                next_id: 1,
                ..TerminalState::default()
            }),
        }
    }

    pub fn needs_render(&self) -> bool {
        self.state.borrow().dirty
    }

    /// Paint every live box onto `writer` and flush it.
    pub fn render(&self, writer: &mut impl Write) -> Result<()> {
        let metrics = self.cell_metrics()?;
        let mut state = self.state.borrow_mut();

        for (position, size) in state.stale.drain(..) {
            paint_rect(writer, to_cell_origin(position, metrics), size, None, None, 0)?;
        }

        for id in &state.order {
            let Some(surface) = state.surfaces.get(id) else {
                continue;
            };
            let params = &surface.params;
            if !params.visible || params.opacity == 0 {
                continue;
            }

            let background = surface
                .content
                .and_then(|content| state.faces.get(&content).cloned().flatten())
                .map(|face| face.background)
                .unwrap_or_else(|| params.background_color.clone());

            paint_rect(
                writer,
                to_cell_origin(params.position(), metrics),
                params.size(),
                parse_color(&background),
                parse_color(&params.border_color),
                params.border_width,
            )?;
        }

        state.dirty = false;
        writer.flush()?;
        Ok(())
    }

    fn mark_stale(state: &mut TerminalState, params: &SurfaceParams) {
        state.stale.push((params.position(), params.size()));
        state.dirty = true;
    }
}

fn to_cell_origin(position: Position, metrics: CellMetrics) -> (u16, u16) {
    let col = position.x.max(0) as u32 / metrics.width_px.max(1);
    let row = position.y.max(0) as u32 / metrics.height_px.max(1);
    (
        col.min(u16::MAX as u32) as u16,
        row.min(u16::MAX as u32) as u16,
    )
}

fn paint_rect(
    writer: &mut impl Write,
    (col, row): (u16, u16),
    size: CellSize,
    fill: Option<Color>,
    border: Option<Color>,
    border_width: u16,
) -> Result<()> {
    let band = if border.is_some() { border_width } else { 0 };

    for offset in 0..size.rows {
        queue!(writer, MoveTo(col, row.saturating_add(offset)))?;

        let edge_row = offset < band || offset >= size.rows.saturating_sub(band);
        if edge_row {
            paint_run(writer, border, size.cols)?;
            continue;
        }

        let side = band.min(size.cols / 2);
        paint_run(writer, border, side)?;
        paint_run(writer, fill, size.cols - side * 2)?;
        paint_run(writer, border, side)?;
    }

    queue!(writer, ResetColor)?;
    Ok(())
}

fn paint_run(writer: &mut impl Write, color: Option<Color>, cols: u16) -> Result<()> {
    if cols == 0 {
        return Ok(());
    }
    match color {
        Some(color) => queue!(writer, SetBackgroundColor(color))?,
        None => queue!(writer, ResetColor)?,
    }
    queue!(writer, Print(" ".repeat(cols as usize)))?;
    Ok(())
}

impl Host for TerminalHost {
    fn cell_metrics(&self) -> Result<CellMetrics> {
        match self.metrics {
            MetricSource::Fixed(metrics) => Ok(metrics),
            MetricSource::Detect => {
                let size = crossterm::terminal::window_size()
                    .map_err(|err| BoxError::HostUnavailable(err.to_string()))?;
                if size.columns == 0 || size.rows == 0 || size.width == 0 || size.height == 0 {
                    return Err(BoxError::HostUnavailable(
                        "terminal does not report its pixel size".to_string(),
                    ));
                }
                Ok(CellMetrics::new(
                    (size.width / size.columns) as u32,
                    (size.height / size.rows) as u32,
                ))
            }
        }
    }

    fn selected_surface(&self) -> Result<SurfaceId> {
        Ok(TERMINAL_ROOT)
    }

    fn create_surface(&self, params: &SurfaceParams) -> Result<SurfaceId> {
        let mut state = self.state.borrow_mut();
        if params.parent != TERMINAL_ROOT && !state.surfaces.contains_key(&params.parent) {
            return Err(BoxError::Host(format!("parent {} is not live", params.parent)));
        }
        let id = SurfaceId(state.next_id);
        state.next_id += 1;
        state.order.push(id);
        state.surfaces.insert(
            id,
            TerminalSurface {
                params: params.clone(),
                content: None,
            },
        );
        state.dirty = true;
        Ok(id)
    }

    fn modify_surface(&self, surface: SurfaceId, delta: &SurfaceDelta) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let previous = state
            .surfaces
            .get(&surface)
            .map(|entry| entry.params.clone())
            .ok_or_else(|| BoxError::Host(format!("{surface} is not live")))?;
        Self::mark_stale(&mut state, &previous);
        if let Some(entry) = state.surfaces.get_mut(&surface) {
            delta.apply_to(&mut entry.params);
        }
        Ok(())
    }

    fn is_surface_live(&self, surface: SurfaceId) -> bool {
        self.state.borrow().surfaces.contains_key(&surface)
    }

    fn delete_surface(&self, surface: SurfaceId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(removed) = state.surfaces.remove(&surface) {
            state.order.retain(|id| *id != surface);
            Self::mark_stale(&mut state, &removed.params);
        }
        Ok(())
    }

    fn create_content(&self, _name: &str) -> Result<ContentId> {
        let mut state = self.state.borrow_mut();
        let id = ContentId(state.next_id);
        state.next_id += 1;
        state.faces.insert(id, None);
        Ok(id)
    }

    fn fill_content(&self, content: ContentId, _text: &str) -> Result<()> {
        self.require_content(content)
    }

    fn configure_content(&self, content: ContentId, _settings: &ContentSettings) -> Result<()> {
        self.require_content(content)
    }

    fn attach_content(&self, surface: SurfaceId, content: ContentId) -> Result<()> {
        self.require_content(content)?;
        let mut state = self.state.borrow_mut();
        let entry = state
            .surfaces
            .get_mut(&surface)
            .ok_or_else(|| BoxError::Host(format!("{surface} is not live")))?;
        entry.content = Some(content);
        state.dirty = true;
        Ok(())
    }

    fn set_face_override(&self, content: ContentId, face: &FaceOverride) -> Result<()> {
        self.replace_face(content, Some(face.clone()))
    }

    fn clear_face_override(&self, content: ContentId) -> Result<()> {
        self.replace_face(content, None)
    }

    fn release_content(&self, content: ContentId) -> Result<()> {
        self.state.borrow_mut().faces.remove(&content);
        Ok(())
    }
}

impl TerminalHost {
    fn require_content(&self, content: ContentId) -> Result<()> {
        if self.state.borrow().faces.contains_key(&content) {
            Ok(())
        } else {
            Err(BoxError::Host(format!("no content container #{}", content.0)))
        }
    }

    fn replace_face(&self, content: ContentId, face: Option<FaceOverride>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let slot = state
            .faces
            .get_mut(&content)
            .ok_or_else(|| BoxError::Host(format!("no content container #{}", content.0)))?;
        *slot = face;
        state.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StyleOverride, StyleRecord};

    fn boxed(host: &TerminalHost, x: i32, y: i32, style: &StyleRecord) -> SurfaceId {
        let params =
            SurfaceParams::child_box(TERMINAL_ROOT, Position::new(x, y), CellSize::new(4, 3), style);
        host.create_surface(&params).unwrap()
    }

    fn rendered(host: &TerminalHost) -> String {
        let mut output = Vec::new();
        host.render(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn paints_background_at_cell_origin() {
        let host = TerminalHost::new(CellMetrics::new(10, 20));
        let style = StyleRecord::default().merged(&StyleOverride::new().border_width(0));
        boxed(&host, 30, 40, &style);

        let out = rendered(&host);
        // 30px / 10px = column 3, 40px / 20px = row 2 (1-based 4 and 3).
        assert!(out.contains("\u{1b}[3;4H"));
        assert!(out.contains("\u{1b}[48;2;51;51;51m    "));
        assert!(!host.needs_render());
    }

    #[test]
    fn face_override_wins_over_surface_background() {
        let host = TerminalHost::new(CellMetrics::new(10, 20));
        let style = StyleRecord::default().merged(&StyleOverride::new().border_width(0));
        let surface = boxed(&host, 0, 0, &style);
        let content = host.create_content("fill").unwrap();
        host.attach_content(surface, content).unwrap();
        let face = FaceOverride::from_style(
            &style.merged(&StyleOverride::new().background_color("#ff0000")),
        );
        host.set_face_override(content, &face).unwrap();

        let out = rendered(&host);
        assert!(out.contains("\u{1b}[48;2;255;0;0m"));
        assert!(!out.contains("\u{1b}[48;2;51;51;51m"));
    }

    #[test]
    fn transparent_boxes_are_skipped() {
        let host = TerminalHost::new(CellMetrics::new(10, 20));
        let style = StyleRecord::default().merged(&StyleOverride::new().opacity(0));
        boxed(&host, 0, 0, &style);
        let out = rendered(&host);
        assert!(!out.contains("48;2;51;51;51"));
    }

    #[test]
    fn deleted_box_is_blanked_once() {
        let host = TerminalHost::new(CellMetrics::new(10, 20));
        let surface = boxed(&host, 0, 0, &StyleRecord::default());
        rendered(&host);

        host.delete_surface(surface).unwrap();
        host.delete_surface(surface).unwrap();
        assert!(host.needs_render());
        let out = rendered(&host);
        assert!(out.contains("\u{1b}[1;1H"));
        assert!(!out.contains("48;2;51;51;51"));

        let again = rendered(&host);
        assert!(!again.contains("\u{1b}[1;1H"));
    }

    #[test]
    fn border_surrounds_fill() {
        let host = TerminalHost::new(CellMetrics::new(10, 20));
        let style = StyleRecord::default().merged(&StyleOverride::new().border_color("#0000ff"));
        boxed(&host, 0, 0, &style);
        let out = rendered(&host);
        assert!(out.contains("\u{1b}[48;2;0;0;255m    "));
        assert!(out.contains("\u{1b}[48;2;51;51;51m  "));
    }
}
