//! File exports: the text report, the chat transcript and the network PNG.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::core::config;
use crate::core::types::Color;
use crate::graph::graph_view::GraphView;
use crate::graph::projection::VisualGraph;
use crate::platform::renderer::Renderer;
use crate::platform::renderer_cairo::RendererCairo;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] cairo::IoError),
}

/// Destination for exported files.
pub trait FileSink {
    /// Store `bytes` under `name`, returning where it ended up.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Writes into a directory on disk, creating it when needed.
pub struct DiskSink {
    dir: PathBuf,
}

impl DiskSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DiskSink {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ExportError::Io { path, source }
        };
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.dir.join(name);
        fs::write(&path, bytes).map_err(io_err(&path))?;
        info!("exported {}", path.display());
        Ok(path)
    }
}

pub fn export_text(sink: &dyn FileSink, name: &str, text: &str) -> Result<PathBuf, ExportError> {
    sink.write(name, text.as_bytes())
}

/// Render the whole graph, independent of the current pan and zoom, to PNG bytes.
pub fn render_png(graph: &VisualGraph, callout: &str) -> Result<Vec<u8>, ExportError> {
    let b = graph.bounds;
    let scale = config::EXPORT_SCALE;
    let w = (b.width * scale).ceil().max(1.0) as i32;
    let h = (b.height * scale).ceil().max(1.0) as i32;

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, w, h)?;
    {
        let cr = cairo::Context::new(&surface)?;
        cr.scale(scale, scale);
        cr.translate(-b.min_x, -b.min_y);
        let renderer = RendererCairo::new(cr);
        renderer.fill_rect(
            b.min_x,
            b.min_y,
            b.width,
            b.height,
            Color::from_hex(config::BG_COLOR, 1.0),
        );
        GraphView::render_static(&renderer, graph, callout);
    }
    surface.flush();

    let mut bytes = Vec::new();
    surface.write_to_png(&mut bytes)?;
    Ok(bytes)
}

pub fn export_png(
    sink: &dyn FileSink,
    name: &str,
    graph: &VisualGraph,
    callout: &str,
) -> Result<PathBuf, ExportError> {
    let bytes = render_png(graph, callout)?;
    sink.write(name, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::fixtures::small_tree;
    use crate::graph::projection::project;

    #[test]
    fn test_disk_sink_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DiskSink::new(dir.path().join("reports"));
        let path = export_text(&sink, "Diagnostic_Report_2024-01-01.txt", "hello\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
        assert_eq!(path.parent().unwrap(), sink.dir());
    }

    #[test]
    fn test_png_has_scaled_bounds() {
        let graph = project(&small_tree(), &[], "Q1", "Q1", None);
        let bytes = render_png(&graph, "Question: Click!").unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        // IHDR width/height, big-endian, right after the signature and chunk header
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        assert_eq!(width as f64, (graph.bounds.width * 3.0).ceil());
        assert_eq!(height as f64, (graph.bounds.height * 3.0).ceil());
    }
}
