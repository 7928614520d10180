use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Ok, Result};

pub(crate) struct SvgWriter {
    writer: BufWriter<File>
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for SvgWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter {
    /// Create a new SVG writer to a file path
    pub(crate) fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[svg] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }

    /// Write the SVG header, including the XML declaration and opening <svg> tag.
    pub(crate) fn write_header(&mut self, width: f64, height: f64) -> Result<()> {
        writeln!(self, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
        writeln!(self, r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"##)?;
        writeln!(self, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        Ok(())
    }

    /// Write SVG styles for dashboard artifacts.
    pub(crate) fn write_styles(&mut self) -> Result<()> {
        writeln!(self, r##"<defs>
<style>
    .vlg {{ stroke: #000000; stroke-width: 0.5; fill-opacity: 0.7; }}
    .poi {{ fill: #d62728; stroke: #ffffff; stroke-width: 0.8; }}
    .lgd {{ font: 12px sans-serif; fill: #111827; }}
    .bar {{ fill: #1f77b4; }}
    .lbl {{ font: 12px sans-serif; fill: #111827; }}
    .ttl {{ font: bold 14px sans-serif; fill: #111827; }}
    .msg {{ font: 14px sans-serif; fill: #6b7280; }}
</style>
</defs>"##)?;
        Ok(())
    }

    /// Write a centered placeholder message (empty-subset artifacts).
    pub(crate) fn write_message(&mut self, width: f64, height: f64, message: &str) -> Result<()> {
        writeln!(
            self,
            r##"<text class="msg" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"##,
            width / 2.0,
            height / 2.0,
            escape_text(message),
        )?;
        Ok(())
    }

    /// Write the closing </svg> tag.
    pub(crate) fn write_footer(&mut self) -> Result<()> {
        writeln!(self, "</svg>")?;
        Ok(())
    }
}

/// Minimal XML text escaping for labels coming from attribute data.
pub(crate) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
