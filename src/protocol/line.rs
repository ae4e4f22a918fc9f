//! Broadcast line format
//!
//! `<code> <repeat> <name> <tag>\n`, with `repeat` in hexadecimal. Lines
//! are parsed leniently: the first four whitespace separated tokens are
//! taken and anything after them is ignored.

use std::fmt;

use bytes::Bytes;

use super::event::RawEvent;

/// Tag identifying lines produced by this daemon
pub const SOURCE_TAG: &str = "IRMP";

/// One line of the distribution protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLine {
    /// Full hex code, flags included
    pub code: String,
    /// Repeat count, or the flag byte for a fresh press
    pub repeat: u32,
    /// Symbolic name, or the full code when untranslated
    pub name: String,
    /// Source tag
    pub tag: String,
}

impl ProtocolLine {
    /// Build the line for an event
    ///
    /// Falls back to the full code when `name` is `None`.
    pub fn from_event(event: &RawEvent, repeat: u32, name: Option<&str>) -> Self {
        let code = event.full_code();
        let name = name.map(str::to_owned).unwrap_or_else(|| code.clone());

        Self {
            code,
            repeat,
            name,
            tag: SOURCE_TAG.to_owned(),
        }
    }

    /// Parse a received line
    ///
    /// Returns `None` unless four tokens are present and the repeat token
    /// is valid hex.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let code = tokens.next()?;
        let repeat = u32::from_str_radix(tokens.next()?, 16).ok()?;
        let name = tokens.next()?;
        let tag = tokens.next()?;

        Some(Self {
            code: code.to_owned(),
            repeat,
            name: name.to_owned(),
            tag: tag.to_owned(),
        })
    }

    /// Encode with a trailing newline
    ///
    /// The buffer is shared by every subscriber write.
    pub fn encode(&self) -> Bytes {
        Bytes::from(format!("{}\n", self))
    }

    /// Check if this line came from an IRMP producer
    pub fn has_source_tag(&self) -> bool {
        self.tag.eq_ignore_ascii_case(SOURCE_TAG)
    }

    /// Tab separated rendering used by the print mode
    pub fn columns(&self) -> String {
        format!(
            "{}\t|{}\t|{}\t|{}",
            self.code, self.repeat, self.name, self.tag
        )
    }
}

impl fmt::Display for ProtocolLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x} {} {}", self.code, self.repeat, self.name, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translated_line() {
        let event = RawEvent::new(0x01, 0x0102, 0x0304, 0x00);
        let line = ProtocolLine::from_event(&event, 0, Some("living_room_power"));

        assert_eq!(
            line.encode(),
            Bytes::from_static(b"010102030400 0 living_room_power IRMP\n")
        );
    }

    #[test]
    fn test_untranslated_line_uses_code() {
        let event = RawEvent::new(0x02, 0xff00, 0x0015, 0x00);
        let line = ProtocolLine::from_event(&event, 0, None);

        assert_eq!(line.name, line.code);
        assert_eq!(line.to_string(), "02ff00001500 0 02ff00001500 IRMP");
    }

    #[test]
    fn test_repeat_is_hex() {
        let event = RawEvent::new(0x02, 0xff00, 0x0015, 0x00);
        let line = ProtocolLine::from_event(&event, 26, Some("KEY_UP"));

        assert_eq!(line.to_string(), "02ff00001500 1a KEY_UP IRMP");
        assert_eq!(ProtocolLine::parse(&line.to_string()).unwrap().repeat, 26);
    }

    #[test]
    fn test_parse_recovers_fields() {
        let event = RawEvent::new(0x0a, 0x1234, 0xabcd, 0x01);
        let line = ProtocolLine::from_event(&event, 3, Some("KEY_OK"));
        let encoded = line.encode();

        let parsed = ProtocolLine::parse(std::str::from_utf8(&encoded).unwrap()).unwrap();
        assert_eq!(parsed, line);
        assert_eq!(parsed.code, "0a1234abcd01");
    }

    #[test]
    fn test_parse_tolerates_extra_tokens() {
        let parsed = ProtocolLine::parse("  010102030400\t0  KEY_OK IRMP extra stuff").unwrap();

        assert_eq!(parsed.name, "KEY_OK");
        assert_eq!(parsed.tag, "IRMP");
    }

    #[test]
    fn test_parse_rejects_short_lines() {
        assert!(ProtocolLine::parse("").is_none());
        assert!(ProtocolLine::parse("010102030400 0 KEY_OK").is_none());
        assert!(ProtocolLine::parse("010102030400 zz KEY_OK IRMP").is_none());
    }

    #[test]
    fn test_source_tag_case_insensitive() {
        let mut line = ProtocolLine::parse("0 0 KEY_OK irmp").unwrap();
        assert!(line.has_source_tag());

        line.tag = "lircd".into();
        assert!(!line.has_source_tag());
    }

    #[test]
    fn test_columns() {
        let line = ProtocolLine::parse("010102030400 1 KEY_OK IRMP").unwrap();
        assert_eq!(line.columns(), "010102030400\t|1\t|KEY_OK\t|IRMP");
    }
}
