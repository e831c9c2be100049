//! Action records and the DoAction tag.
//!
//! An action record is a one byte opcode. Opcodes with bit 7 set carry a
//! payload behind a 16-bit little-endian length:
//!
//! ```text
//! 0x00..=0x7F   [code]
//! 0x80..=0xFF   [code] [length:UI16] [payload; length]
//! ```
//!
//! A zero length is legal and differs from "no payload": it still writes the
//! length word. [`ActionObject`] keeps the payload opaque.

use crate::bitstream::{BitReader, BitWriter};
use crate::coder::{self, Decodable, Encodable, Structure};
use crate::context::Context;
use crate::tag::{self, Tag, TagHeader, code};
use crate::{Error, Result};

/// Opcode of the action that terminates an action list.
pub const END: u8 = 0x00;

/// Lowest opcode that carries a payload.
pub const PAYLOAD_BIT: u8 = 0x80;

/// Returns true if actions with `code` carry a length-prefixed payload.
pub const fn has_payload(code: u8) -> bool {
    code & PAYLOAD_BIT != 0
}

/// An action record with an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionObject {
    code: u8,
    payload: Option<Vec<u8>>,
}

impl ActionObject {
    /// Action without payload. Opcodes >= 0x80 need one and fail with
    /// [`Error::MissingPayload`].
    pub fn basic(code: u8) -> Result<Self> {
        Self::new(code, None)
    }

    /// Action with payload. Opcodes < 0x80 cannot carry one and fail with
    /// [`Error::UnexpectedPayload`].
    pub fn with_payload(code: u8, payload: Vec<u8>) -> Result<Self> {
        Self::new(code, Some(payload))
    }

    pub fn new(code: u8, payload: Option<Vec<u8>>) -> Result<Self> {
        match (has_payload(code), &payload) {
            (false, Some(_)) => Err(Error::UnexpectedPayload { code }),
            (true, None) => Err(Error::MissingPayload { code }),
            (_, Some(data)) if data.len() > u16::MAX as usize => {
                Err(Error::LengthOverflow { structure: Self::NAME, length: data.len() })
            }
            _ => Ok(Self { code, payload }),
        }
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    /// `None` for opcodes < 0x80; possibly empty otherwise.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn is_end(&self) -> bool {
        self.code == END
    }
}

impl Structure for ActionObject {
    const NAME: &'static str = "ActionObject";
}

impl Encodable for ActionObject {
    fn size_of(&self, _ctx: &Context) -> usize {
        match &self.payload {
            Some(data) => 3 + data.len(),
            None => 1,
        }
    }

    fn write_into(&self, writer: &mut BitWriter, _ctx: &Context) -> Result<()> {
        writer.write_u8(self.code)?;
        if let Some(data) = &self.payload {
            // Länge ist im Konstruktor geprüft
            writer.write_u16(data.len() as u16)?;
            writer.write_bytes(data)?;
        }
        Ok(())
    }
}

impl Decodable for ActionObject {
    fn read_from(reader: &mut BitReader<'_>, _ctx: &Context) -> Result<Self> {
        let code = reader.read_u8()?;
        let payload = if has_payload(code) {
            let length = reader.read_u16()? as usize;
            Some(reader.read_bytes(length)?)
        } else {
            None
        };
        Ok(Self { code, payload })
    }
}

/// The DoAction tag: a list of actions executed when the frame is shown.
///
/// The terminating end action is implicit; it is written on encode and
/// consumed on decode but never stored in the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DoAction {
    actions: Vec<ActionObject>,
    extended: bool,
}

fn check_action(action: &ActionObject) -> Result<()> {
    if action.is_end() {
        return Err(Error::invalid_value("the end action is implicit in DoAction"));
    }
    Ok(())
}

impl DoAction {
    pub fn new(actions: Vec<ActionObject>) -> Result<Self> {
        actions.iter().try_for_each(check_action)?;
        Ok(Self { actions, extended: false })
    }

    /// Writes the long header form even when the body is short.
    pub fn with_extended_header(mut self) -> Self {
        self.extended = true;
        self
    }

    pub fn actions(&self) -> &[ActionObject] {
        &self.actions
    }

    pub fn add(&mut self, action: ActionObject) -> Result<&mut Self> {
        check_action(&action)?;
        self.actions.push(action);
        Ok(self)
    }
}

impl Structure for DoAction {
    const NAME: &'static str = "DoAction";
}

impl Tag for DoAction {
    const CODE: u16 = code::DO_ACTION;

    fn body_size(&self, ctx: &Context) -> usize {
        self.actions.iter().map(|a| a.size_of(ctx)).sum::<usize>() + 1
    }

    fn write_body(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        for action in &self.actions {
            action.write_into(writer, ctx)?;
        }
        writer.write_u8(END)
    }

    fn read_body(reader: &mut BitReader<'_>, ctx: &Context, header: &TagHeader) -> Result<Self> {
        let start = reader.bit_position();
        let length = header.length as usize;
        let end = length
            .checked_mul(8)
            .and_then(|bits| start.checked_add(bits))
            .ok_or(Error::OutOfData { position: start, requested: usize::MAX })?;
        let mut actions = Vec::new();
        while reader.bit_position() < end {
            let action = ActionObject::read_from(reader, ctx)?;
            if action.is_end() {
                log::trace!("DoAction: {} actions", actions.len());
                return Ok(Self { actions, extended: header.is_forced_extended() });
            }
            actions.push(action);
        }
        // letzte Action ragt über das deklarierte Ende hinaus
        coder::check_end(Self::NAME, start, length, reader.bit_position())?;
        Err(Error::invalid_value(format!(
            "DoAction at byte {} has no end action",
            start / 8
        )))
    }

    fn extended(&self) -> bool {
        self.extended
    }
}

impl Encodable for DoAction {
    fn size_of(&self, ctx: &Context) -> usize {
        tag::tag_size(self, ctx)
    }

    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        tag::write_tag(self, writer, ctx)
    }
}

impl Decodable for DoAction {
    fn read_from(reader: &mut BitReader<'_>, ctx: &Context) -> Result<Self> {
        tag::read_tag(reader, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::{decode, encode};

    #[test]
    fn opcode_boundary_vectors() {
        let ctx = Context::new();
        let basic = ActionObject::basic(0x01).unwrap();
        assert_eq!(encode(&basic, &ctx).unwrap(), vec![0x01]);

        let empty = ActionObject::with_payload(0x80, vec![]).unwrap();
        assert_eq!(encode(&empty, &ctx).unwrap(), vec![0x80, 0x00, 0x00]);

        let full = ActionObject::with_payload(0x80, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(encode(&full, &ctx).unwrap(), vec![0x80, 0x04, 0x00, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_payload_differs_from_none() {
        let ctx = Context::new();
        let empty = decode::<ActionObject>(&[0x80, 0x00, 0x00], &ctx).unwrap();
        assert_eq!(empty.payload(), Some(&[][..]));
        let none = decode::<ActionObject>(&[0x7F], &ctx).unwrap();
        assert_eq!(none.payload(), None);
    }

    #[test]
    fn construction_checks_payload() {
        assert_eq!(
            ActionObject::with_payload(0x7F, vec![1]).unwrap_err(),
            Error::UnexpectedPayload { code: 0x7F }
        );
        assert_eq!(ActionObject::basic(0x80).unwrap_err(), Error::MissingPayload { code: 0x80 });
        assert!(matches!(
            ActionObject::with_payload(0x96, vec![0; 65536]),
            Err(Error::LengthOverflow { length: 65536, .. })
        ));
        assert!(ActionObject::with_payload(0x96, vec![0; 65535]).is_ok());
    }

    #[test]
    fn truncated_payload() {
        assert!(matches!(
            decode::<ActionObject>(&[0x83, 0x05, 0x00, 1, 2], &Context::new()),
            Err(Error::OutOfData { .. })
        ));
    }

    #[test]
    fn do_action_round_trip() {
        let ctx = Context::new();
        let mut tag = DoAction::default();
        tag.add(ActionObject::basic(0x07).unwrap())
            .unwrap()
            .add(ActionObject::with_payload(0x81, vec![0x02, 0x00]).unwrap())
            .unwrap();
        let bytes = encode(&tag, &ctx).unwrap();
        // (12 << 6) | 7 = 0x0307
        assert_eq!(bytes, vec![0x07, 0x03, 0x07, 0x81, 0x02, 0x00, 0x02, 0x00, 0x00]);
        assert_eq!(decode::<DoAction>(&bytes, &ctx).unwrap(), tag);
    }

    #[test]
    fn do_action_keeps_long_header() {
        let ctx = Context::new();
        let bytes = [0x3F, 0x03, 0x02, 0x00, 0x00, 0x00, 0x06, 0x00];
        let tag = decode::<DoAction>(&bytes, &ctx).unwrap();
        assert_eq!(tag.actions().len(), 1);
        assert_eq!(encode(&tag, &ctx).unwrap(), bytes);
        assert_ne!(tag, DoAction::new(tag.actions().to_vec()).unwrap());
    }

    #[test]
    fn do_action_rejects_explicit_end() {
        assert!(DoAction::new(vec![ActionObject::basic(END).unwrap()]).is_err());
        let mut tag = DoAction::default();
        assert!(tag.add(ActionObject::basic(END).unwrap()).is_err());
        assert!(tag.actions().is_empty());
    }

    #[test]
    fn do_action_without_end() {
        // Länge 1, nur Opcode 0x07
        let err = decode::<DoAction>(&[0x01, 0x03, 0x07], &Context::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)), "{err}");
    }

    #[test]
    fn do_action_payload_past_declared_end() {
        // Länge 3, aber die Push-Action (0x96) beansprucht 3 + 5 Byte
        let bytes = [0x03, 0x03, 0x96, 0x05, 0x00, 0, 0, 0, 0, 0, 0, 0];
        let err = tag::decode_tags(&bytes, &Context::new()).unwrap_err();
        assert_eq!(
            err,
            Error::FramingConsistency { structure: "DoAction", offset: 2, expected: 3, delta: -5 }
        );
    }

    #[test]
    fn do_action_end_before_declared_length() {
        // Länge 2, aber End kommt nach einem Byte
        let err = decode::<DoAction>(&[0x02, 0x03, 0x00, 0x07], &Context::new()).unwrap_err();
        assert_eq!(
            err,
            Error::FramingConsistency { structure: "DoAction", offset: 2, expected: 2, delta: 1 }
        );
    }
}
