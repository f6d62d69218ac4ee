use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpritesetError {
    #[error("spriteset name must not be empty")]
    Empty,
    #[error("spriteset name must not start with '/'")]
    LeadingSlash,
    #[error("spriteset name must not contain '\\\\'")]
    Backslash,
    #[error("spriteset name must not contain '..'")]
    ParentTraversal,
    #[error("spriteset name contains invalid character '{character}'")]
    InvalidCharacter { character: char },
    #[error("spriteset '{name}' is already registered")]
    Duplicate { name: String },
    #[error("spriteset '{name}' must have a non-zero picture size and count")]
    EmptyPictures { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpritesetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpritesetInfo {
    pub name: String,
    pub picture_width: i32,
    pub picture_height: i32,
    pub picture_count: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteFlags {
    pub flip_x: bool,
    pub flip_y: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteState {
    pub spriteset: Option<SpritesetId>,
    pub picture: u16,
    pub x: i32,
    pub y: i32,
    pub flags: SpriteFlags,
}

#[derive(Debug, Clone)]
pub struct SpritePool {
    spritesets: Vec<SpritesetInfo>,
    slots: Vec<Option<SpriteState>>,
}

impl SpritePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            spritesets: Vec::new(),
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn register_spriteset(
        &mut self,
        name: &str,
        picture_width: i32,
        picture_height: i32,
        picture_count: u16,
    ) -> Result<SpritesetId, SpritesetError> {
        validate_spriteset_name(name)?;
        if self.spritesets.iter().any(|info| info.name == name) {
            return Err(SpritesetError::Duplicate {
                name: name.to_string(),
            });
        }
        if picture_width <= 0 || picture_height <= 0 || picture_count == 0 {
            return Err(SpritesetError::EmptyPictures {
                name: name.to_string(),
            });
        }
        let id = SpritesetId(self.spritesets.len() as u32);
        self.spritesets.push(SpritesetInfo {
            name: name.to_string(),
            picture_width,
            picture_height,
            picture_count,
        });
        Ok(id)
    }

    pub fn spriteset(&self, id: SpritesetId) -> Option<&SpritesetInfo> {
        self.spritesets.get(id.0 as usize)
    }

    pub fn spriteset_by_name(&self, name: &str) -> Option<SpritesetId> {
        self.spritesets
            .iter()
            .position(|info| info.name == name)
            .map(|index| SpritesetId(index as u32))
    }

    pub fn acquire(&mut self) -> Option<SpriteId> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(SpriteState::default());
        Some(SpriteId(index as u32))
    }

    pub fn setup(&mut self, id: SpriteId, spriteset: SpritesetId, flags: SpriteFlags) {
        if let Some(sprite) = self.sprite_mut(id) {
            sprite.spriteset = Some(spriteset);
            sprite.flags = flags;
            sprite.picture = 0;
        }
    }

    pub fn set_picture(&mut self, id: SpriteId, picture: u16) {
        if let Some(sprite) = self.sprite_mut(id) {
            sprite.picture = picture;
        }
    }

    pub fn set_position(&mut self, id: SpriteId, x: i32, y: i32) {
        if let Some(sprite) = self.sprite_mut(id) {
            sprite.x = x;
            sprite.y = y;
        }
    }

    pub fn set_flags(&mut self, id: SpriteId, flags: SpriteFlags) {
        if let Some(sprite) = self.sprite_mut(id) {
            sprite.flags = flags;
        }
    }

    pub fn disable(&mut self, id: SpriteId) {
        if let Some(slot) = self.slots.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&SpriteState> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn is_enabled(&self, id: SpriteId) -> bool {
        self.sprite(id).is_some()
    }

    fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut SpriteState> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }
}

fn validate_spriteset_name(name: &str) -> Result<(), SpritesetError> {
    if name.is_empty() {
        return Err(SpritesetError::Empty);
    }
    if name.starts_with('/') {
        return Err(SpritesetError::LeadingSlash);
    }
    if name.contains('\\') {
        return Err(SpritesetError::Backslash);
    }
    if name.contains("..") {
        return Err(SpritesetError::ParentTraversal);
    }
    for ch in name.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(SpritesetError::InvalidCharacter { character: ch });
    }
    Ok(())
}
