use crate::error::InternalError;
use crate::types::coil_to_u16;
use crate::util::cursor::{ReadCursor, WriteCursor};

mod sealed {
    pub trait Sealed {}
}

/// A fixed-size value that can travel through a slave request payload.
///
/// The value moves as its raw native byte image; the transport owns wire
/// byte order, this layer only sizes buffers and picks function codes.
/// Implemented for `bool` and for the integer/float types whose byte width
/// is a positive multiple of the 16-bit register width. The trait is sealed
/// because the device operations size their payload buffers from these
/// impls.
pub trait Value: Copy + Default + sealed::Sealed {
    /// width of the raw byte image in bytes
    const WIDTH: usize;

    /// true when the value is a single-bit quantity
    const IS_BIT: bool;

    /// registers the image occupies; a bit value occupies one
    const REGISTERS: u16 = (Self::WIDTH as u16 + 1) / 2;

    /// individually addressable bits in the image
    const BIT_WIDTH: u16 = 8 * Self::WIDTH as u16;

    /// write the raw image into the payload buffer
    fn encode(&self, cursor: &mut WriteCursor) -> Result<(), InternalError>;

    /// read the raw image back out of the payload buffer
    fn decode(cursor: &mut ReadCursor) -> Result<Self, InternalError>;

    /// u16 parameter image for a write single coil request; `None` for
    /// values that are not single-bit quantities
    fn single_coil_image(&self) -> Option<u16> {
        None
    }
}

/// Marker for value types eligible for register transfer.
///
/// Implemented only for types whose byte width is a positive, even number of
/// bytes, so an ineligible type is a compile error on the register
/// operations rather than a runtime check.
pub trait RegisterValue: Value {}

macro_rules! register_value {
    ($t:ty) => {
        const _: () = assert!(
            std::mem::size_of::<$t>() % 2 == 0 && std::mem::size_of::<$t>() != 0
        );

        impl sealed::Sealed for $t {}

        impl Value for $t {
            const WIDTH: usize = std::mem::size_of::<$t>();
            const IS_BIT: bool = false;

            fn encode(&self, cursor: &mut WriteCursor) -> Result<(), InternalError> {
                cursor.write_bytes(&self.to_ne_bytes())
            }

            fn decode(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
                let mut image = [0u8; std::mem::size_of::<$t>()];
                let len = image.len();
                image.copy_from_slice(cursor.read_bytes(len)?);
                Ok(<$t>::from_ne_bytes(image))
            }
        }

        impl RegisterValue for $t {}
    };
}

register_value!(u16);
register_value!(i16);
register_value!(u32);
register_value!(i32);
register_value!(u64);
register_value!(i64);
register_value!(f32);
register_value!(f64);

impl sealed::Sealed for bool {}

impl Value for bool {
    const WIDTH: usize = 1;
    const IS_BIT: bool = true;

    fn encode(&self, cursor: &mut WriteCursor) -> Result<(), InternalError> {
        cursor.write_u8(u8::from(*self))
    }

    fn decode(cursor: &mut ReadCursor) -> Result<Self, InternalError> {
        // a coil/discrete status byte is set when any bit is set
        Ok(cursor.read_u8()? != 0)
    }

    fn single_coil_image(&self) -> Option<u16> {
        Some(coil_to_u16(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_register_counts_from_byte_width() {
        assert_eq!(u16::REGISTERS, 1);
        assert_eq!(i16::REGISTERS, 1);
        assert_eq!(u32::REGISTERS, 2);
        assert_eq!(f32::REGISTERS, 2);
        assert_eq!(u64::REGISTERS, 4);
        assert_eq!(f64::REGISTERS, 4);
        assert_eq!(bool::REGISTERS, 1);
    }

    #[test]
    fn derives_bit_counts_from_byte_width() {
        assert_eq!(u16::BIT_WIDTH, 16);
        assert_eq!(u32::BIT_WIDTH, 32);
        assert_eq!(f64::BIT_WIDTH, 64);
        assert_eq!(bool::BIT_WIDTH, 8);
    }

    #[test]
    fn round_trips_native_images() {
        fn round_trip<V: Value + std::fmt::Debug + PartialEq>(value: V) {
            let mut buffer = [0u8; 8];
            let payload = &mut buffer[..V::WIDTH];
            let mut cursor = WriteCursor::new(payload);
            value.encode(&mut cursor).unwrap();
            let mut cursor = ReadCursor::new(payload);
            assert_eq!(V::decode(&mut cursor).unwrap(), value);
        }

        round_trip(0xCAFEu16);
        round_trip(-123i16);
        round_trip(0xDEAD_BEEFu32);
        round_trip(1.25f32);
        round_trip(u64::MAX);
        round_trip(-2.5e19f64);
        round_trip(true);
        round_trip(false);
    }

    #[test]
    fn bit_values_decode_from_a_single_status_byte() {
        let mut cursor = ReadCursor::new(&[0x01]);
        assert!(bool::decode(&mut cursor).unwrap());
        let mut cursor = ReadCursor::new(&[0x00]);
        assert!(!bool::decode(&mut cursor).unwrap());
        // any set bit counts as energized
        let mut cursor = ReadCursor::new(&[0x80]);
        assert!(bool::decode(&mut cursor).unwrap());
    }

    #[test]
    fn only_bit_values_have_a_single_coil_image() {
        assert_eq!(true.single_coil_image(), Some(0xFF00));
        assert_eq!(false.single_coil_image(), Some(0x0000));
        assert_eq!(7u16.single_coil_image(), None);
        assert_eq!(1.0f32.single_coil_image(), None);
    }
}
