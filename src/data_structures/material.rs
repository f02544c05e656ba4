//! Surface materials.
//!
//! Three shading models cover the studio: a shadow catcher that is invisible
//! except where shadows fall, a standard metal/rough surface, and a physical
//! surface that adds a clearcoat layer and a specular reflectivity control.

use crate::data_structures::{color::Color, texture::TextureId};

/// Handle into a scene's material table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shading {
    /// Renders black with `opacity` scaled by how much light is blocked.
    ShadowCatcher { opacity: f32 },
    /// Metal/rough surface.
    Standard,
    /// Metal/rough surface with clearcoat and reflectivity.
    Physical {
        clearcoat: f32,
        clearcoat_roughness: f32,
        reflectivity: f32,
    },
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub env_map_intensity: f32,
    pub bump_map: Option<TextureId>,
    pub bump_scale: f32,
    disposed: bool,
}

impl Material {
    fn base(name: &str, shading: Shading) -> Self {
        Self {
            name: name.to_string(),
            shading,
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            env_map_intensity: 1.0,
            bump_map: None,
            bump_scale: 1.0,
            disposed: false,
        }
    }

    pub fn shadow_catcher(name: &str, opacity: f32) -> Self {
        Self {
            color: Color::BLACK,
            ..Self::base(name, Shading::ShadowCatcher { opacity })
        }
    }

    pub fn standard(name: &str, color: Color, roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            roughness,
            metalness,
            ..Self::base(name, Shading::Standard)
        }
    }

    pub fn physical(name: &str, color: Color, roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            roughness,
            metalness,
            ..Self::base(
                name,
                Shading::Physical {
                    clearcoat: 0.0,
                    clearcoat_roughness: 0.0,
                    reflectivity: 0.5,
                },
            )
        }
    }

    /// Set clearcoat parameters. Has no effect on non-physical materials.
    pub fn with_clearcoat(mut self, amount: f32, roughness: f32) -> Self {
        if let Shading::Physical {
            clearcoat,
            clearcoat_roughness,
            ..
        } = &mut self.shading
        {
            *clearcoat = amount;
            *clearcoat_roughness = roughness;
        }
        self
    }

    /// Set specular reflectivity. Has no effect on non-physical materials.
    pub fn with_reflectivity(mut self, value: f32) -> Self {
        if let Shading::Physical { reflectivity, .. } = &mut self.shading {
            *reflectivity = value;
        }
        self
    }

    pub fn with_bump_map(mut self, texture: TextureId, scale: f32) -> Self {
        self.bump_map = Some(texture);
        self.bump_scale = scale;
        self
    }

    pub fn with_env_map_intensity(mut self, intensity: f32) -> Self {
        self.env_map_intensity = intensity;
        self
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self.shading, Shading::ShadowCatcher { .. })
    }

    /// Every texture slot this material samples from.
    pub fn textures(&self) -> impl Iterator<Item = TextureId> + '_ {
        self.bump_map.iter().copied()
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
