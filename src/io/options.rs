/// The number of detector channels the instrument records per spectrum. The
/// gain correction block holds exactly this many values, and anything after
/// it is dark current.
pub const DEFAULT_CHANNEL_COUNT: usize = 1024;

/// Settings shared by the text readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// The number of single value lines routed to the gain correction block
    /// before switching to dark currents
    pub channel_count: usize,
    /// Fail with [`ParserError::LengthMismatch`](crate::io::ParserError::LengthMismatch)
    /// instead of returning misaligned channel arrays
    pub strict: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            channel_count: DEFAULT_CHANNEL_COUNT,
            strict: false,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_count(mut self, channel_count: usize) -> Self {
        self.channel_count = channel_count;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Settings for the headerless binary spectrum dumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSpectraOptions {
    pub channel_count: usize,
    pub byte_order: ByteOrder,
}

impl Default for RawSpectraOptions {
    fn default() -> Self {
        Self {
            channel_count: DEFAULT_CHANNEL_COUNT,
            byte_order: ByteOrder::Little,
        }
    }
}

impl RawSpectraOptions {
    pub fn channel_count(mut self, channel_count: usize) -> Self {
        self.channel_count = channel_count;
        self
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// The size of one spectrum block in bytes
    pub fn block_size(&self) -> usize {
        self.channel_count * std::mem::size_of::<u16>()
    }
}
