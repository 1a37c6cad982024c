//! XML writer for export operations
//!
//! Layout:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <results><item><id>1</id><name>Red</name></item></results>
//! ```
//!
//! Every value goes through the plain text rule, so the output carries no
//! type information.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::export::convert::{PlainTextConverter, ValueConverter};
use crate::model::ExportRecord;

use super::{write_document, FormatStrategy};

const ROOT_ELEMENT: &str = "results";
const ITEM_ELEMENT: &str = "item";

/// Markup-tree strategy
#[derive(Debug, Clone, Default)]
pub struct XmlFormat {
    /// Converter for values to element text
    converter: PlainTextConverter,
}

impl XmlFormat {
    /// Create an XML strategy that renders NULL as an empty element body
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_null_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            converter: PlainTextConverter::with_null_placeholder(placeholder),
        }
    }

    /// Check that a column name can be used as an element name
    ///
    /// Names must start with a letter or underscore, continue with letters,
    /// digits, `-`, `_` or `.`, and must not start with `xml` in any case.
    fn validate_element_name(name: &str) -> std::result::Result<(), ExportError> {
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));
        let reserved = name
            .get(..3)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("xml"));

        if valid_start && valid_rest && !reserved {
            Ok(())
        } else {
            Err(ExportError::encoding(
                "xml",
                "column name",
                format!("'{name}' is not a valid element name"),
            ))
        }
    }

    /// Characters allowed in an XML 1.0 document
    fn is_xml_char(c: char) -> bool {
        match c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => c >= '\u{20}',
        }
    }

    fn write_event<'a>(
        writer: &mut Writer<Vec<u8>>,
        event: Event<'a>,
    ) -> std::result::Result<(), ExportError> {
        writer
            .write_event(event)
            .map_err(|e| ExportError::encoding("xml", "document", e.to_string()))
    }

    /// Encode records into an XML document
    pub fn encode(&self, records: &[ExportRecord]) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());

        Self::write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
        )?;
        Self::write_event(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;

        if records.is_empty() {
            Self::write_event(&mut writer, Event::Empty(BytesStart::new(ROOT_ELEMENT)))?;
            return Ok(writer.into_inner());
        }

        Self::write_event(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
        for record in records {
            Self::write_event(&mut writer, Event::Start(BytesStart::new(ITEM_ELEMENT)))?;
            for (key, value) in record.iter() {
                Self::validate_element_name(key)?;
                let text = self.converter.convert(value);
                if let Some(c) = text.chars().find(|&c| !Self::is_xml_char(c)) {
                    return Err(ExportError::encoding(
                        "xml",
                        value.type_name(),
                        format!("character U+{:04X} in '{key}' is not allowed in XML", c as u32),
                    )
                    .into());
                }
                Self::write_event(&mut writer, Event::Start(BytesStart::new(key)))?;
                Self::write_event(&mut writer, Event::Text(BytesText::new(&text)))?;
                Self::write_event(&mut writer, Event::End(BytesEnd::new(key)))?;
            }
            Self::write_event(&mut writer, Event::End(BytesEnd::new(ITEM_ELEMENT)))?;
        }
        Self::write_event(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

        Ok(writer.into_inner())
    }
}

impl FormatStrategy for XmlFormat {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn save(&self, records: &[ExportRecord], path: &Path) -> Result<()> {
        let bytes = self.encode(records)?;
        write_document(path, &bytes)?;

        debug!("Saved {} records as XML to {}", records.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResultSet, Value};
    use chrono::NaiveDate;
    use quick_xml::Reader;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn encode(format: &XmlFormat, rs: ResultSet) -> String {
        String::from_utf8(format.encode(&rs.into_records()).unwrap()).unwrap()
    }

    /// Walk the document and fail on any parse error
    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        let mut depth = 0i32;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_xml_end_to_end() {
        let xml = encode(
            &XmlFormat::new(),
            ResultSet::new(
                vec!["id".into(), "name".into(), "student_count".into()],
                vec![
                    vec![1i64.into(), "Red".into(), 3i64.into()],
                    vec![2i64.into(), "Blue".into(), 0i64.into()],
                ],
            ),
        );

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<results>\
             <item><id>1</id><name>Red</name><student_count>3</student_count></item>\
             <item><id>2</id><name>Blue</name><student_count>0</student_count></item>\
             </results>"
        );
        assert_well_formed(&xml);
    }

    #[test]
    fn test_xml_empty_sequence() {
        let xml = encode(&XmlFormat::new(), ResultSet::empty(vec!["id".into()]));
        assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<results/>");
        assert_well_formed(&xml);
    }

    #[test]
    fn test_xml_null_is_empty_body() {
        let xml = encode(
            &XmlFormat::new(),
            ResultSet::new(vec!["name".into()], vec![vec![Value::Null]]),
        );
        assert!(xml.contains("<item><name></name></item>"));
    }

    #[test]
    fn test_xml_null_placeholder() {
        let xml = encode(
            &XmlFormat::with_null_placeholder("None"),
            ResultSet::new(vec!["name".into()], vec![vec![Value::Null]]),
        );
        assert!(xml.contains("<name>None</name>"));
    }

    #[test]
    fn test_xml_escapes_text() {
        let xml = encode(
            &XmlFormat::new(),
            ResultSet::new(vec!["name".into()], vec![vec!["R&D <lab>".into()]]),
        );
        assert!(xml.contains("<name>R&amp;D &lt;lab&gt;</name>"));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_xml_rejects_control_characters() {
        let records =
            ResultSet::new(vec!["name".into()], vec![vec!["Room\u{1}B".into()]]).into_records();
        let err = XmlFormat::new().encode(&records).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RoomstatError::Export(ExportError::Encoding { .. })
        ));
        assert!(err.to_string().contains("U+0001"));

        let records =
            ResultSet::new(vec!["name".into()], vec![vec!["\u{FFFE}".into()]]).into_records();
        assert!(XmlFormat::new().encode(&records).is_err());
    }

    #[test]
    fn test_xml_keeps_whitespace_controls() {
        let xml = encode(
            &XmlFormat::new(),
            ResultSet::new(vec!["name".into()], vec![vec!["a\tb\nc".into()]]),
        );
        assert!(xml.contains("<name>a\tb\nc</name>"));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_xml_typed_values_as_text() {
        let xml = encode(
            &XmlFormat::new(),
            ResultSet::new(
                vec!["avg_age".into(), "birthday".into()],
                vec![vec![
                    Value::Decimal(Decimal::from_str("22.5000").unwrap()),
                    Value::Date(NaiveDate::from_ymd_opt(2001, 9, 3).unwrap()),
                ]],
            ),
        );
        assert!(xml.contains("<avg_age>22.5000</avg_age>"));
        assert!(xml.contains("<birthday>2001-09-03</birthday>"));
    }

    #[test]
    fn test_xml_element_order_follows_columns() {
        let xml = encode(
            &XmlFormat::new(),
            ResultSet::new(
                vec!["name".into(), "id".into()],
                vec![vec!["A".into(), 1i64.into()]],
            ),
        );
        assert!(xml.contains("<item><name>A</name><id>1</id></item>"));
    }

    #[test]
    fn test_xml_invalid_column_name() {
        let records =
            ResultSet::new(vec!["COUNT(s.id)".into()], vec![vec![1i64.into()]]).into_records();
        assert!(XmlFormat::new().encode(&records).is_err());

        assert!(XmlFormat::validate_element_name("student_count").is_ok());
        assert!(XmlFormat::validate_element_name("1st").is_err());
        assert!(XmlFormat::validate_element_name("xmlns").is_err());
        assert!(XmlFormat::validate_element_name("").is_err());
    }

    #[test]
    fn test_xml_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.xml");
        std::fs::write(&path, "stale").unwrap();

        let records = ResultSet::new(vec!["id".into()], vec![vec![1i64.into()]]).into_records();
        XmlFormat::new().save(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml"));
        assert!(!content.contains("stale"));
    }
}
