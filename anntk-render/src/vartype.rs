//! Reflected uniform types
//!
//! [`ScalarVariableType`] is the closed set of element kinds a reflected uniform can have.
//! It is derived from the native type code the driver reports after linking.

use std::fmt;

/// The element kind of a reflected uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarVariableType {
    /// Unknown or unsupported native type.
    #[default]
    Invalid,
    Float,
    Vec2,
    Vec3,
    Vec4,
    /// Host-side quaternion, submitted as four floats. Never reported by reflection.
    Quaternion,
    Int,
    IVec2,
    IVec3,
    IVec4,
    UInt,
    UVec2,
    UVec3,
    UVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Sampler2DShadow,
    Sampler2DArray,
    SamplerCubeShadow,
    Sampler2DArrayShadow,
    SamplerBuffer,
    ISampler2D,
    ISampler3D,
    USampler2D,
    USampler3D,
}

impl ScalarVariableType {
    /// Every tag that has a native counterpart.
    pub const NATIVE: [ScalarVariableType; 28] = [
        Self::Float,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::Int,
        Self::IVec2,
        Self::IVec3,
        Self::IVec4,
        Self::UInt,
        Self::UVec2,
        Self::UVec3,
        Self::UVec4,
        Self::Mat2,
        Self::Mat3,
        Self::Mat4,
        Self::Sampler1D,
        Self::Sampler2D,
        Self::Sampler3D,
        Self::SamplerCube,
        Self::Sampler2DShadow,
        Self::Sampler2DArray,
        Self::SamplerCubeShadow,
        Self::Sampler2DArrayShadow,
        Self::SamplerBuffer,
        Self::ISampler2D,
        Self::ISampler3D,
        Self::USampler2D,
        Self::USampler3D,
    ];

    /// Resolves a native GL type code. Codes outside the table map to [`Self::Invalid`].
    pub fn from_gl(code: u32) -> Self {
        match code {
            glow::FLOAT => Self::Float,
            glow::FLOAT_VEC2 => Self::Vec2,
            glow::FLOAT_VEC3 => Self::Vec3,
            glow::FLOAT_VEC4 => Self::Vec4,
            glow::INT => Self::Int,
            glow::INT_VEC2 => Self::IVec2,
            glow::INT_VEC3 => Self::IVec3,
            glow::INT_VEC4 => Self::IVec4,
            glow::UNSIGNED_INT => Self::UInt,
            glow::UNSIGNED_INT_VEC2 => Self::UVec2,
            glow::UNSIGNED_INT_VEC3 => Self::UVec3,
            glow::UNSIGNED_INT_VEC4 => Self::UVec4,
            glow::FLOAT_MAT2 => Self::Mat2,
            glow::FLOAT_MAT3 => Self::Mat3,
            glow::FLOAT_MAT4 => Self::Mat4,
            glow::SAMPLER_1D => Self::Sampler1D,
            glow::SAMPLER_2D => Self::Sampler2D,
            glow::SAMPLER_3D => Self::Sampler3D,
            glow::SAMPLER_CUBE => Self::SamplerCube,
            glow::SAMPLER_2D_SHADOW => Self::Sampler2DShadow,
            glow::SAMPLER_2D_ARRAY => Self::Sampler2DArray,
            glow::SAMPLER_CUBE_SHADOW => Self::SamplerCubeShadow,
            glow::SAMPLER_2D_ARRAY_SHADOW => Self::Sampler2DArrayShadow,
            glow::SAMPLER_BUFFER => Self::SamplerBuffer,
            glow::INT_SAMPLER_2D => Self::ISampler2D,
            glow::INT_SAMPLER_3D => Self::ISampler3D,
            glow::UNSIGNED_INT_SAMPLER_2D => Self::USampler2D,
            glow::UNSIGNED_INT_SAMPLER_3D => Self::USampler3D,
            _ => Self::Invalid,
        }
    }

    /// The native GL type code, if this tag has one.
    pub fn to_gl(self) -> Option<u32> {
        let code = match self {
            Self::Invalid | Self::Quaternion => return None,
            Self::Float => glow::FLOAT,
            Self::Vec2 => glow::FLOAT_VEC2,
            Self::Vec3 => glow::FLOAT_VEC3,
            Self::Vec4 => glow::FLOAT_VEC4,
            Self::Int => glow::INT,
            Self::IVec2 => glow::INT_VEC2,
            Self::IVec3 => glow::INT_VEC3,
            Self::IVec4 => glow::INT_VEC4,
            Self::UInt => glow::UNSIGNED_INT,
            Self::UVec2 => glow::UNSIGNED_INT_VEC2,
            Self::UVec3 => glow::UNSIGNED_INT_VEC3,
            Self::UVec4 => glow::UNSIGNED_INT_VEC4,
            Self::Mat2 => glow::FLOAT_MAT2,
            Self::Mat3 => glow::FLOAT_MAT3,
            Self::Mat4 => glow::FLOAT_MAT4,
            Self::Sampler1D => glow::SAMPLER_1D,
            Self::Sampler2D => glow::SAMPLER_2D,
            Self::Sampler3D => glow::SAMPLER_3D,
            Self::SamplerCube => glow::SAMPLER_CUBE,
            Self::Sampler2DShadow => glow::SAMPLER_2D_SHADOW,
            Self::Sampler2DArray => glow::SAMPLER_2D_ARRAY,
            Self::SamplerCubeShadow => glow::SAMPLER_CUBE_SHADOW,
            Self::Sampler2DArrayShadow => glow::SAMPLER_2D_ARRAY_SHADOW,
            Self::SamplerBuffer => glow::SAMPLER_BUFFER,
            Self::ISampler2D => glow::INT_SAMPLER_2D,
            Self::ISampler3D => glow::INT_SAMPLER_3D,
            Self::USampler2D => glow::UNSIGNED_INT_SAMPLER_2D,
            Self::USampler3D => glow::UNSIGNED_INT_SAMPLER_3D,
        };
        Some(code)
    }

    /// The GLSL spelling of this type.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Invalid => "<invalid>",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Quaternion => "quat",
            Self::Int => "int",
            Self::IVec2 => "ivec2",
            Self::IVec3 => "ivec3",
            Self::IVec4 => "ivec4",
            Self::UInt => "uint",
            Self::UVec2 => "uvec2",
            Self::UVec3 => "uvec3",
            Self::UVec4 => "uvec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Sampler1D => "sampler1D",
            Self::Sampler2D => "sampler2D",
            Self::Sampler3D => "sampler3D",
            Self::SamplerCube => "samplerCube",
            Self::Sampler2DShadow => "sampler2DShadow",
            Self::Sampler2DArray => "sampler2DArray",
            Self::SamplerCubeShadow => "samplerCubeShadow",
            Self::Sampler2DArrayShadow => "sampler2DArrayShadow",
            Self::SamplerBuffer => "samplerBuffer",
            Self::ISampler2D => "isampler2D",
            Self::ISampler3D => "isampler3D",
            Self::USampler2D => "usampler2D",
            Self::USampler3D => "usampler3D",
        }
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(self, Self::Int | Self::IVec2 | Self::IVec3 | Self::IVec4)
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(self, Self::UInt | Self::UVec2 | Self::UVec3 | Self::UVec4)
    }

    /// Samplers are set with the index of a texture unit.
    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            Self::Sampler1D
                | Self::Sampler2D
                | Self::Sampler3D
                | Self::SamplerCube
                | Self::Sampler2DShadow
                | Self::Sampler2DArray
                | Self::SamplerCubeShadow
                | Self::Sampler2DArrayShadow
                | Self::SamplerBuffer
                | Self::ISampler2D
                | Self::ISampler3D
                | Self::USampler2D
                | Self::USampler3D
        )
    }

    /// Number of scalar components in one element, 0 for [`Self::Invalid`].
    pub fn components(self) -> usize {
        match self {
            Self::Invalid => 0,
            Self::Vec2 | Self::IVec2 | Self::UVec2 => 2,
            Self::Vec3 | Self::IVec3 | Self::UVec3 => 3,
            Self::Vec4 | Self::IVec4 | Self::UVec4 | Self::Quaternion | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
            _ => 1,
        }
    }
}

impl fmt::Display for ScalarVariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}
