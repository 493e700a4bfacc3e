//! KML rendering of a canonical, colored grouping tree.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::warn;

use crate::canonical::{CanonicalContents, CanonicalGroup, CanonicalTree};
use crate::color::{ColorAssignment, LeafStyle};
use crate::constants::kml::{INFO_WINDOW_CLASS, XMLNS, XMLNS_ATOM, XMLNS_GX};
use crate::errors::ConvertError;
use crate::format::FieldFormatter;
use crate::record::Record;

const INDENT: usize = 2;

/// Write the full KML document for `tree` to `out`.
///
/// Styles come first (one per leaf, canonical order), then the folders, then
/// any ungrouped placemarks.
pub fn write_kml<W: io::Write>(
    out: W,
    tree: &CanonicalTree<'_>,
    colors: &ColorAssignment,
    formatter: &FieldFormatter,
) -> Result<(), ConvertError> {
    let mut writer = Writer::new_with_indent(out, b' ', INDENT);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("kml").with_attributes([
        ("xmlns", XMLNS),
        ("xmlns:gx", XMLNS_GX),
        ("xmlns:kml", XMLNS),
        ("xmlns:atom", XMLNS_ATOM),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;

    for style_id in colors.colliding_style_ids() {
        warn!(
            style_id,
            "[darwin_kml:kml] several leaf groups share a style id; viewers resolve it to the first"
        );
    }
    for (_, style) in colors.iter() {
        write_style(&mut writer, style)?;
    }
    for group in tree.groups() {
        write_folder(&mut writer, group, colors, formatter)?;
    }
    for record in tree.ungrouped() {
        write_placemark(&mut writer, record, None, formatter)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;
    let mut out = writer.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Render the document into a string.
pub fn render_kml(
    tree: &CanonicalTree<'_>,
    colors: &ColorAssignment,
    formatter: &FieldFormatter,
) -> Result<String, ConvertError> {
    let mut buffer = Vec::new();
    write_kml(&mut buffer, tree, colors, formatter)?;
    String::from_utf8(buffer)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
}

fn write_style<W: io::Write>(
    writer: &mut Writer<W>,
    style: &LeafStyle,
) -> Result<(), ConvertError> {
    writer.write_event(Event::Start(
        BytesStart::new("Style").with_attributes([("id", style.style_id.as_str())]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("IconStyle")))?;
    write_text_element(writer, "color", &style.color.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("IconStyle")))?;
    writer.write_event(Event::End(BytesEnd::new("Style")))?;
    Ok(())
}

fn write_folder<W: io::Write>(
    writer: &mut Writer<W>,
    group: &CanonicalGroup<'_>,
    colors: &ColorAssignment,
    formatter: &FieldFormatter,
) -> Result<(), ConvertError> {
    writer.write_event(Event::Start(BytesStart::new("Folder")))?;
    write_text_element(writer, "name", group.name())?;
    match group.contents() {
        CanonicalContents::Groups(children) => {
            for child in children {
                write_folder(writer, child, colors, formatter)?;
            }
        }
        CanonicalContents::Records(records) => {
            let style = colors.get(group.path()).ok_or_else(|| {
                ConvertError::StructuralInvariant(format!(
                    "leaf group '{}' has no assigned style",
                    group.style_id()
                ))
            })?;
            for record in records {
                write_placemark(writer, record, Some(style), formatter)?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new("Folder")))?;
    Ok(())
}

fn write_placemark<W: io::Write>(
    writer: &mut Writer<W>,
    record: &Record,
    style: Option<&LeafStyle>,
    formatter: &FieldFormatter,
) -> Result<(), ConvertError> {
    writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
    write_text_element(writer, "name", &formatter.placemark_name(record))?;
    if let Some(style) = style {
        write_text_element(writer, "styleUrl", &format!("#{}", style.style_id))?;
    }

    let description = format!(
        "<div class=\"{INFO_WINDOW_CLASS}\">\n{}</div>",
        formatter.describe(record)
    );
    writer.write_event(Event::Start(BytesStart::new("description")))?;
    write_cdata(writer, &description)?;
    writer.write_event(Event::End(BytesEnd::new("description")))?;

    match formatter.coordinates(record) {
        Some(coordinates) => {
            writer.write_event(Event::Start(BytesStart::new("Point")))?;
            write_text_element(writer, "coordinates", &coordinates)?;
            writer.write_event(Event::End(BytesEnd::new("Point")))?;
        }
        None => warn!(
            row = record.row(),
            "[darwin_kml:kml] record has no coordinates; writing placemark without a point"
        ),
    }
    writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    Ok(())
}

/// Write `text` as CDATA, splitting every `]]>` across two adjacent sections.
fn write_cdata<W: io::Write>(writer: &mut Writer<W>, text: &str) -> Result<(), ConvertError> {
    let pieces: Vec<&str> = text.split("]]>").collect();
    let last = pieces.len().saturating_sub(1);
    for (idx, piece) in pieces.into_iter().enumerate() {
        let mut section = String::with_capacity(piece.len() + 3);
        if idx > 0 {
            section.push('>');
        }
        section.push_str(piece);
        if idx < last {
            section.push_str("]]");
        }
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    Ok(())
}

fn write_text_element<W: io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), ConvertError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
