use crate::content::ImageHandle;

use super::geometry::{Rect, Size2, Vec2};

pub const DEFAULT_GRAVITY_MULTIPLIER: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Collision classification. Solids block other solids; ethereals never
/// block and are never blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PhysicsKind {
    Solid,
    #[default]
    Ethereal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySettings {
    pub enabled: bool,
    /// Scales the world gravity strength for this entity. Negative values
    /// pull the opposite way.
    pub multiplier: f32,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            multiplier: DEFAULT_GRAVITY_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    position: Vec2,
    size: Size2,
    physics: PhysicsKind,
    gravity: GravitySettings,
    visual: Option<ImageHandle>,
}

impl Entity {
    pub fn new(rect: Rect) -> Self {
        Self {
            id: EntityId(0),
            position: rect.position(),
            size: clamp_size(rect.size()),
            physics: PhysicsKind::Ethereal,
            gravity: GravitySettings::default(),
            visual: None,
        }
    }

    pub fn solid(rect: Rect) -> Self {
        Self::new(rect).with_physics(PhysicsKind::Solid)
    }

    pub fn with_visual(position: Vec2, image: ImageHandle) -> Self {
        let rect = Rect::from_parts(position, image.size());
        Self::with_visual_sized(rect, image)
    }

    pub fn with_visual_sized(rect: Rect, image: ImageHandle) -> Self {
        let mut entity = Self::new(rect);
        entity.visual = Some(image);
        entity
    }

    pub fn with_physics(mut self, physics: PhysicsKind) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_gravity(mut self, multiplier: f32) -> Self {
        self.gravity = GravitySettings {
            enabled: true,
            multiplier,
        };
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn size(&self) -> Size2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_size(&mut self, size: Size2) {
        self.size = clamp_size(size);
    }

    pub fn physics(&self) -> PhysicsKind {
        self.physics
    }

    pub fn set_physics(&mut self, physics: PhysicsKind) {
        self.physics = physics;
    }

    pub fn is_solid(&self) -> bool {
        match self.physics {
            PhysicsKind::Solid => true,
            PhysicsKind::Ethereal => false,
        }
    }

    pub fn gravity(&self) -> GravitySettings {
        self.gravity
    }

    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.gravity.enabled = enabled;
    }

    pub fn set_gravity_multiplier(&mut self, multiplier: f32) {
        self.gravity.multiplier = multiplier;
    }

    pub fn visual(&self) -> Option<&ImageHandle> {
        self.visual.as_ref()
    }

    pub fn set_visual(&mut self, visual: Option<ImageHandle>) {
        self.visual = visual;
    }

    pub fn move_unchecked(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }
}

fn clamp_size(size: Size2) -> Size2 {
    Size2::new(size.width.max(0.0), size.height.max(0.0))
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    #[test]
    fn bounds_follow_every_mutation() {
        let mut entity = Entity::new(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(entity.bounds(), Rect::new(1.0, 2.0, 3.0, 4.0));

        entity.move_unchecked(10.0, -2.0);
        assert_eq!(entity.bounds(), Rect::new(11.0, 0.0, 3.0, 4.0));

        entity.set_size(Size2::new(8.0, 9.0));
        assert_eq!(entity.bounds(), Rect::new(11.0, 0.0, 8.0, 9.0));

        entity.set_position(Vec2::new(-5.0, 6.0));
        assert_eq!(entity.bounds(), Rect::new(-5.0, 6.0, 8.0, 9.0));
    }

    #[test]
    fn negative_size_is_clamped_to_zero() {
        let mut entity = Entity::new(Rect::new(0.0, 0.0, -3.0, 4.0));
        assert_eq!(entity.size(), Size2::new(0.0, 4.0));
        entity.set_size(Size2::new(2.0, -1.0));
        assert_eq!(entity.size(), Size2::new(2.0, 0.0));
    }

    #[test]
    fn solid_constructor_is_invisible_and_solid() {
        let entity = Entity::solid(Rect::new(64.0, 96.0, 32.0, 32.0));
        assert_eq!(entity.physics(), PhysicsKind::Solid);
        assert!(entity.visual().is_none());
        assert!(!entity.gravity().enabled);
        assert_eq!(entity.gravity().multiplier, DEFAULT_GRAVITY_MULTIPLIER);
    }

    #[test]
    fn visual_constructor_takes_image_size() {
        let image = ImageHandle::new(RgbaImage::from_pixel(50, 40, Rgba([1, 2, 3, 255])));
        let entity = Entity::with_visual(Vec2::new(10.0, 100.0), image);
        assert_eq!(entity.bounds(), Rect::new(10.0, 100.0, 50.0, 40.0));
        assert!(entity.visual().is_some());
        assert_eq!(entity.physics(), PhysicsKind::Ethereal);
    }

    #[test]
    fn with_gravity_enables_and_sets_multiplier() {
        let entity = Entity::new(Rect::new(0.0, 0.0, 1.0, 1.0)).with_gravity(-1.0);
        assert!(entity.gravity().enabled);
        assert_eq!(entity.gravity().multiplier, -1.0);
    }
}
