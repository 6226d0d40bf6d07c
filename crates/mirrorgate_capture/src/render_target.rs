pub const DEFAULT_TARGET_NAME: &str = "Default texture";
pub const RESIZED_TARGET_NAME: &str = "Portal capture";

pub const CLEAR_BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const CLEAR_BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba16Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Bilinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Clamp,
    Repeat,
}

/// Square colour buffer a capture renders into. The backend owns the GPU allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub name: String,
    pub size: u32,
    pub format: TextureFormat,
    pub filter: TextureFilter,
    pub clear_color: [f32; 4],
    pub target_gamma: Option<f32>,
    pub address_x: AddressMode,
    pub address_y: AddressMode,
    pub auto_generate_mips: bool,
    pub needs_two_copies: bool,
}

impl RenderTarget {
    pub fn default_texture(size: u32) -> Self {
        Self {
            name: DEFAULT_TARGET_NAME.to_owned(),
            size,
            format: TextureFormat::Rgba16Float,
            filter: TextureFilter::Bilinear,
            clear_color: CLEAR_BLUE,
            target_gamma: Some(2.2),
            address_x: AddressMode::Clamp,
            address_y: AddressMode::Clamp,
            // Displayed directly on screen, so mips are never sampled.
            auto_generate_mips: false,
            needs_two_copies: false,
        }
    }

    pub fn resized(size: u32) -> Self {
        Self {
            name: RESIZED_TARGET_NAME.to_owned(),
            size,
            format: TextureFormat::Rgba16Float,
            filter: TextureFilter::Bilinear,
            clear_color: CLEAR_BLACK,
            target_gamma: None,
            address_x: AddressMode::Clamp,
            address_y: AddressMode::Clamp,
            auto_generate_mips: false,
            needs_two_copies: false,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.size, self.size)
    }
}

// Targets are swapped whole, never edited in place.
#[derive(Debug, Default)]
pub struct RenderTargetSlot {
    target: Option<RenderTarget>,
    generation: u64,
}

impl RenderTargetSlot {
    pub fn get(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_none()
    }

    /// Bumped on every replacement; a backend can key its GPU resources on it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use = "the previous target is released when the returned value is dropped"]
    pub fn replace(&mut self, target: RenderTarget) -> Option<RenderTarget> {
        self.generation += 1;
        self.target.replace(target)
    }

    pub fn take(&mut self) -> Option<RenderTarget> {
        self.target.take()
    }

    /// Current target and its generation, installing one from `make` when empty.
    pub fn get_or_insert_with(&mut self, make: impl FnOnce() -> RenderTarget) -> (&RenderTarget, u64) {
        if self.target.is_none() {
            self.generation += 1;
        }
        let generation = self.generation;
        (self.target.get_or_insert_with(make), generation)
    }
}
