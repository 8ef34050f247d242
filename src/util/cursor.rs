use crate::error::InternalError;

/// custom write cursor over a payload buffer
pub struct WriteCursor<'a> {
    dest: &'a mut [u8],
    pos: usize,
}

impl<'a> WriteCursor<'a> {
    pub fn new(dest: &'a mut [u8]) -> WriteCursor<'a> {
        WriteCursor { dest, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.dest.len() - self.pos
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), InternalError> {
        match self.dest.get_mut(self.pos) {
            Some(x) => {
                *x = value;
                self.pos += 1;
                Ok(())
            }
            None => Err(InternalError::InsufficientWriteSpace(1, 0)),
        }
    }

    /// write the native byte image of a u16, e.g. the ON/OFF image of a coil
    pub fn write_u16(&mut self, value: u16) -> Result<(), InternalError> {
        self.write_bytes(&value.to_ne_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), InternalError> {
        if self.remaining() < bytes.len() {
            // don't write anything if there isn't space for the whole image
            return Err(InternalError::InsufficientWriteSpace(
                bytes.len(),
                self.remaining(),
            ));
        }
        self.dest[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}

/// custom read cursor over a payload buffer
pub struct ReadCursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(src: &'a [u8]) -> ReadCursor<'a> {
        ReadCursor { src, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.src.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8, InternalError> {
        match self.src.get(self.pos) {
            Some(x) => {
                self.pos += 1;
                Ok(*x)
            }
            None => Err(InternalError::InsufficientBytesForRead(1, 0)),
        }
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], InternalError> {
        if self.remaining() < count {
            return Err(InternalError::InsufficientBytesForRead(
                count,
                self.remaining(),
            ));
        }
        let bytes = &self.src[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }
}
