use std::rc::Rc;

/// How a texture's pixels are sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureKind {
    /// Decoded image, bound at a fixed texture-stage priority.
    #[default]
    Static,
    /// Movie/video texture, stored and bound directly.
    Movie,
}

#[derive(Debug, PartialEq)]
struct TextureData {
    name: String,
    kind: TextureKind,
    width: u32,
    height: u32,
}

/// Shared texture handle. Many nodes may hold the same texture; it is
/// released when the last handle drops.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture(Rc<TextureData>);

impl Texture {
    pub fn new(name: impl Into<String>, kind: TextureKind, width: u32, height: u32) -> Self {
        Texture(Rc::new(TextureData {
            name: name.into(),
            kind,
            width,
            height,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> TextureKind {
        self.0.kind
    }

    pub fn size(&self) -> (u32, u32) {
        (self.0.width, self.0.height)
    }

    pub fn is_movie(&self) -> bool {
        self.0.kind == TextureKind::Movie
    }

    /// Whether two handles refer to the same texture instance.
    pub fn same_as(&self, other: &Texture) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Live handles to this texture (including this one).
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_texture() {
        let a = Texture::new("brick", TextureKind::Static, 64, 64);
        let b = a.clone();
        assert!(a.same_as(&b));
        assert_eq!(a.handle_count(), 2);
        drop(b);
        assert_eq!(a.handle_count(), 1);
    }

    #[test]
    fn movie_kind() {
        let t = Texture::new("intro", TextureKind::Movie, 320, 240);
        assert!(t.is_movie());
        assert_eq!(t.size(), (320, 240));
    }
}
