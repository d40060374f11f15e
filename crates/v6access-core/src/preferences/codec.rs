//! XML codec for preferences documents
//!
//! The whole mapping lives in the attributes of a single root element:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <Preferences MachineIdentifier="..." customConnections="..."></Preferences>
//! ```
//!
//! Child content of the root element is never read.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::Preferences;
use crate::error::{Error, Result};

/// Declaration line written in front of every encoded document
pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Name of the root element written by [`Preferences::encode`]
pub const ROOT_ELEMENT: &str = "Preferences";

impl Preferences {
    /// Decode the attributes of the first element in `bytes`
    ///
    /// The root element's name is not checked and its children are ignored,
    /// so `<Preferences/>` decodes to an empty mapping. A repeated attribute
    /// takes the value of its last occurrence.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                    return Self::from_element(&element);
                }
                Ok(Event::Eof) => {
                    return Err(Error::parse(
                        "unexpected EOF: preferences document has no root element",
                    ));
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::parse(format!(
                        "XML syntax error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
            buf.clear();
        }
    }

    fn from_element(element: &BytesStart<'_>) -> Result<Self> {
        let mut preferences = Self::new();

        // A repeated attribute keeps its first position and takes its last value
        let mut attributes = element.attributes();
        attributes.with_checks(false);

        for attribute in attributes {
            let attribute =
                attribute.map_err(|e| Error::parse(format!("invalid attribute: {}", e)))?;

            let key = std::str::from_utf8(attribute.key.local_name().as_ref())
                .map_err(|e| Error::parse(format!("attribute name is not UTF-8: {}", e)))?
                .to_string();

            let value = attribute
                .unescape_value()
                .map_err(|e| {
                    Error::parse(format!("invalid value for attribute {}: {}", key, e))
                })?
                .into_owned();

            preferences.insert(key, value);
        }

        Ok(preferences)
    }

    /// Encode into a complete document
    ///
    /// Attributes are written in mapping order and the root element is
    /// always written as a start/end pair, never self-closing.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut root = BytesStart::new(ROOT_ELEMENT);
        for (key, value) in self.iter() {
            root.push_attribute((key, value));
        }

        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Start(root))
            .map_err(|e| Error::parse(format!("failed to encode preferences: {}", e)))?;
        writer
            .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
            .map_err(|e| Error::parse(format!("failed to encode preferences: {}", e)))?;

        let mut document = format!("{}\n", XML_HEADER).into_bytes();
        document.extend(writer.into_inner());
        Ok(document)
    }
}
