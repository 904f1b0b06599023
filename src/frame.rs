use crate::{colour::Rgba, screen};

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A complete RGBA image, row-major with the origin at the top left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    size: screen::Size,
    bytes: Vec<u8>,
}

impl FrameBuffer {
    /// A transparent black frame.
    pub fn new(size: screen::Size) -> Self {
        FrameBuffer {
            size,
            bytes: vec![0; size.pixel_count() * BYTES_PER_PIXEL],
        }
    }

    /// Wraps tightly packed RGBA rows. `None` if the length doesn't match.
    pub fn from_bytes(size: screen::Size, bytes: Vec<u8>) -> Option<Self> {
        (bytes.len() == size.pixel_count() * BYTES_PER_PIXEL).then_some(FrameBuffer { size, bytes })
    }

    pub fn size(&self) -> screen::Size {
        self.size
    }

    /// Bytes in one row.
    pub fn stride(&self) -> usize {
        self.size.width as usize * BYTES_PER_PIXEL
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let offset = (y as usize * self.size.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut rgba = [0; BYTES_PER_PIXEL];
        rgba.copy_from_slice(&self.bytes[offset..offset + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_are_addressed_row_major() {
        let size = screen::Size::new(3, 2);
        let bytes = (0..24).collect::<Vec<u8>>();
        let frame = FrameBuffer::from_bytes(size, bytes).unwrap();
        assert_eq!(frame.pixel(0, 0), Some([0, 1, 2, 3]));
        assert_eq!(frame.pixel(2, 0), Some([8, 9, 10, 11]));
        assert_eq!(frame.pixel(0, 1), Some([12, 13, 14, 15]));
        assert_eq!(frame.pixel(3, 0), None);
        assert_eq!(frame.pixel(0, 2), None);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(FrameBuffer::from_bytes(screen::Size::new(2, 2), vec![0; 15]).is_none());
    }

    #[test]
    fn new_frame_is_zeroed_and_sized() {
        let frame = FrameBuffer::new(screen::Size::new(5, 4));
        assert_eq!(frame.stride(), 20);
        assert_eq!(frame.as_bytes().len(), 80);
        assert!(frame.as_bytes().iter().all(|&byte| byte == 0));
    }
}
