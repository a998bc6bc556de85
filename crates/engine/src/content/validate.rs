use std::fmt;

use roxmltree::{Document, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    XmlMalformed,
    MissingData,
    UnsupportedEncoding,
    DataRowCount,
    MissingAttribute,
    InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapValidationError {
    pub code: ValidationCode,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for MapValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (line={}, column={})",
                self.code, self.message, loc.line, loc.column
            ),
            None => write!(f, "{:?}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for MapValidationError {}

const OBJECT_ATTRIBUTES: [&str; 4] = ["x", "y", "width", "height"];

/// Structural check of a map document, run only when strict loading is
/// requested. It rejects documents the line scanner would misread; it does
/// not change what the scanner accepts.
pub fn validate_map_document(raw: &str, map_height: u32) -> Result<(), MapValidationError> {
    let doc = Document::parse(raw).map_err(|error| MapValidationError {
        code: ValidationCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let Some(data) = doc
        .descendants()
        .filter(|node| node.has_tag_name("data"))
        .last()
    else {
        return Err(error_at_node(
            ValidationCode::MissingData,
            "map has no <data> element".to_string(),
            &doc,
            doc.root_element(),
        ));
    };

    if let Some(encoding) = data.attribute("encoding") {
        if encoding != "csv" {
            return Err(error_at_node(
                ValidationCode::UnsupportedEncoding,
                format!("tile data encoding '{encoding}' is not supported; expected csv"),
                &doc,
                data,
            ));
        }
    }

    let row_count = data
        .text()
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();
    if row_count < map_height as usize {
        return Err(error_at_node(
            ValidationCode::DataRowCount,
            format!("tile data has {row_count} rows; map height is {map_height}"),
            &doc,
            data,
        ));
    }

    let objects = doc.descendants().filter(|node| {
        node.has_tag_name("object")
            && node
                .parent_element()
                .is_some_and(|parent| parent.has_tag_name("objectgroup"))
    });
    for object in objects {
        for name in OBJECT_ATTRIBUTES {
            let Some(value) = object.attribute(name) else {
                return Err(error_at_node(
                    ValidationCode::MissingAttribute,
                    format!("<object> is missing attribute '{name}'"),
                    &doc,
                    object,
                ));
            };
            let valid = value.trim().parse::<f32>().is_ok_and(f32::is_finite);
            if !valid {
                return Err(error_at_node(
                    ValidationCode::InvalidValue,
                    format!("<object> attribute {name}='{value}' is not a number"),
                    &doc,
                    object,
                ));
            }
        }
    }

    Ok(())
}

fn error_at_node(
    code: ValidationCode,
    message: String,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> MapValidationError {
    let pos = doc.text_pos_at(node.range().start);
    MapValidationError {
        code,
        message,
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
