use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::RgbImage;
use shared::PolyData;

use crate::error::{Result, ViewerError};

/// VTK XML file format version written in the header
const VTK_VERSION: &str = "0.1";

/// Write `objects` as an ASCII VTK XML PolyData file, one `<Piece>` per object.
///
/// Readers that merge pieces (ParaView, `vtkXMLPolyDataReader`) get the whole
/// scene back as a single dataset.
pub fn write_vtp<'a, I>(path: &Path, objects: I) -> Result<()>
where
    I: IntoIterator<Item = &'a PolyData>,
{
    let io_err = |source| ViewerError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    write_vtp_to(&mut out, objects).map_err(io_err)?;
    out.flush().map_err(io_err)
}

/// Serialize `objects` into any writer
pub fn write_vtp_to<'a, W, I>(out: &mut W, objects: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a PolyData>,
{
    writeln!(out, "<?xml version=\"1.0\"?>")?;
    writeln!(
        out,
        "<VTKFile type=\"PolyData\" version=\"{VTK_VERSION}\" byte_order=\"LittleEndian\" header_type=\"UInt64\">"
    )?;
    writeln!(out, "  <PolyData>")?;
    for pd in objects {
        write_piece(out, pd)?;
    }
    writeln!(out, "  </PolyData>")?;
    writeln!(out, "</VTKFile>")
}

fn write_piece<W: Write>(out: &mut W, pd: &PolyData) -> io::Result<()> {
    writeln!(
        out,
        "    <Piece NumberOfPoints=\"{}\" NumberOfVerts=\"{}\" NumberOfLines=\"{}\" NumberOfStrips=\"0\" NumberOfPolys=\"{}\">",
        pd.points.len(),
        pd.verts.len(),
        pd.lines.len(),
        pd.polys.len()
    )?;

    // ── Points ───────────────────────────────────────────────
    writeln!(out, "      <Points>")?;
    writeln!(
        out,
        "        <DataArray type=\"Float64\" Name=\"Points\" NumberOfComponents=\"3\" format=\"ascii\">"
    )?;
    for p in &pd.points {
        writeln!(out, "          {} {} {}", p[0], p[1], p[2])?;
    }
    writeln!(out, "        </DataArray>")?;
    writeln!(out, "      </Points>")?;

    // ── Cells ────────────────────────────────────────────────
    let verts: Vec<&[usize]> = pd.verts.iter().map(std::slice::from_ref).collect();
    write_cells(out, "Verts", &verts)?;
    let lines: Vec<&[usize]> = pd.lines.iter().map(Vec::as_slice).collect();
    write_cells(out, "Lines", &lines)?;
    writeln!(out, "      <Strips/>")?;
    let polys: Vec<&[usize]> = pd.polys.iter().map(Vec::as_slice).collect();
    write_cells(out, "Polys", &polys)?;

    writeln!(out, "    </Piece>")
}

/// A cell block as a connectivity array plus running end offsets
fn write_cells<W: Write>(out: &mut W, tag: &str, cells: &[&[usize]]) -> io::Result<()> {
    if cells.is_empty() {
        return writeln!(out, "      <{tag}/>");
    }
    writeln!(out, "      <{tag}>")?;

    writeln!(
        out,
        "        <DataArray type=\"Int64\" Name=\"connectivity\" format=\"ascii\">"
    )?;
    for cell in cells {
        writeln!(out, "          {}", join(cell.iter()))?;
    }
    writeln!(out, "        </DataArray>")?;

    let offsets = cells.iter().scan(0usize, |end, cell| {
        *end += cell.len();
        Some(*end)
    });
    writeln!(
        out,
        "        <DataArray type=\"Int64\" Name=\"offsets\" format=\"ascii\">"
    )?;
    writeln!(out, "          {}", join(offsets))?;
    writeln!(out, "        </DataArray>")?;

    writeln!(out, "      </{tag}>")
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Encode a captured frame as PNG
pub fn write_png(path: &Path, frame: &RgbImage) -> Result<()> {
    frame
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| match source {
            image::ImageError::IoError(source) => ViewerError::Io {
                path: path.to_path_buf(),
                source,
            },
            source => ViewerError::Image {
                path: path.to_path_buf(),
                source,
            },
        })
}
