/// Default upper bound for a single frame, chosen so a corrupt prefix cannot trigger a huge allocation.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    start_offset: usize,
    max_frame_size: Option<usize>,
    max_frames: Option<usize>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        ReaderSettings {
            start_offset: 0,
            max_frame_size: Some(DEFAULT_MAX_FRAME_SIZE),
            max_frames: None,
        }
    }
}

impl ReaderSettings {
    pub fn new() -> Self {
        ReaderSettings::default()
    }

    /// Position of the first size prefix.
    pub fn start_offset(mut self, offset: usize) -> Self {
        self.start_offset = offset;
        self
    }

    /// Frames declaring more bytes than this fail with `FrameTooLarge`. `None` disables the check.
    pub fn max_frame_size(mut self, limit: Option<usize>) -> Self {
        self.max_frame_size = limit;
        self
    }

    /// Stop after this many frames. `None` reads until the end of the input.
    pub fn max_frames(mut self, limit: Option<usize>) -> Self {
        self.max_frames = limit;
        self
    }

    pub fn get_start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn get_max_frame_size(&self) -> Option<usize> {
        self.max_frame_size
    }

    pub fn get_max_frames(&self) -> Option<usize> {
        self.max_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let settings = ReaderSettings::new()
            .start_offset(8)
            .max_frame_size(None)
            .max_frames(Some(3));

        assert_eq!(settings.get_start_offset(), 8);
        assert_eq!(settings.get_max_frame_size(), None);
        assert_eq!(settings.get_max_frames(), Some(3));
        assert_eq!(
            ReaderSettings::new().get_max_frame_size(),
            Some(DEFAULT_MAX_FRAME_SIZE)
        );
    }
}
