//! Uniform slots and typed value application
//!
//! A [`UniformHandle`] is a small copy of one reflected uniform slot. Values are applied to it
//! through [`UniformValue`], which is implemented for the closed set of host types that have a
//! GLSL counterpart. The only runtime decision made per call is whether the value's type fits
//! the reflected slot type.

use std::fmt;

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Quat, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use crate::{
    backend::{Components, GlBackend, MatrixSize},
    error::UniformError,
    vartype::ScalarVariableType,
};

/// One reflected uniform: where it lives, what it holds and how many elements it has.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescriptor<L> {
    /// `None` when the uniform has no location of its own (e.g. a uniform block member).
    pub location: Option<L>,
    pub ty: ScalarVariableType,
    /// 1 for plain uniforms, the declared length for arrays.
    pub array_count: u32,
}

/// A typed accessor for one uniform of a linked program.
///
/// Handles hold no GPU resources. They reflect the program as it was when the handle was
/// fetched; after the program is linked again they must be fetched again, which
/// [`ProgramObject::set_uniform`](crate::ProgramObject::set_uniform) enforces.
pub struct UniformHandle<B: GlBackend> {
    location: Option<B::UniformLocation>,
    ty: ScalarVariableType,
    array_count: u32,
    generation: u64,
}

impl<B: GlBackend> UniformHandle<B> {
    pub(crate) fn new(descriptor: &UniformDescriptor<B::UniformLocation>, generation: u64) -> Self {
        Self {
            location: descriptor.location.clone(),
            ty: descriptor.ty,
            array_count: descriptor.array_count,
            generation,
        }
    }

    /// The inert handle returned for names the program does not have.
    pub(crate) fn unresolved(generation: u64) -> Self {
        Self {
            location: None,
            ty: ScalarVariableType::Invalid,
            array_count: 0,
            generation,
        }
    }

    /// The resolved location, `None` for the sentinel and for uniforms without one.
    pub fn location(&self) -> Option<&B::UniformLocation> {
        self.location.as_ref()
    }

    /// The reflected slot type, [`ScalarVariableType::Invalid`] for the sentinel.
    pub fn ty(&self) -> ScalarVariableType {
        self.ty
    }

    /// Declared array length, 1 for plain uniforms and 0 for the sentinel.
    pub fn array_count(&self) -> u32 {
        self.array_count
    }

    /// Whether applying values to this handle reaches the GPU at all.
    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Applies a single value. See [`Self::apply_slice`].
    pub fn apply<T: UniformValue>(&self, gl: &B, value: T) -> Result<(), UniformError> {
        self.apply_slice(gl, std::slice::from_ref(&value))
    }

    /// Applies `values` to consecutive elements of the uniform in one call.
    ///
    /// The values land in whichever program is currently in use. Unresolved handles accept
    /// anything and do nothing.
    pub fn apply_slice<T: UniformValue>(&self, gl: &B, values: &[T]) -> Result<(), UniformError> {
        let Some(location) = &self.location else {
            return Ok(());
        };
        if values.is_empty() {
            return Ok(());
        }

        if !T::accepts(self.ty) {
            let signedness = (T::TYPE.is_signed_integer() && self.ty.is_unsigned_integer())
                || (T::TYPE.is_unsigned_integer() && self.ty.is_signed_integer());
            log::error!(
                "Cannot apply a {} value to a uniform of type {}{}",
                T::TYPE,
                self.ty,
                if signedness { " (signedness differs)" } else { "" }
            );
            return Err(UniformError::TypeMismatch {
                slot: self.ty,
                value: T::TYPE,
            });
        }

        if values.len() > self.array_count as usize {
            return Err(UniformError::ArrayOverflow {
                len: values.len(),
                capacity: self.array_count,
            });
        }

        T::submit(gl, location, self.ty, values)
    }
}

impl<B: GlBackend> Clone for UniformHandle<B> {
    fn clone(&self) -> Self {
        Self {
            location: self.location.clone(),
            ty: self.ty,
            array_count: self.array_count,
            generation: self.generation,
        }
    }
}

impl<B: GlBackend> fmt::Debug for UniformHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformHandle")
            .field("location", &self.location)
            .field("ty", &self.ty)
            .field("array_count", &self.array_count)
            .finish()
    }
}

mod private {
    pub trait Sealed {}
}

/// A host value that can be written into a uniform slot.
pub trait UniformValue: private::Sealed + Sized {
    /// The type tag of the value.
    const TYPE: ScalarVariableType;

    /// Whether a slot of reflected type `slot` takes this value.
    fn accepts(slot: ScalarVariableType) -> bool;

    /// Issues the native call. `slot` has already been checked with [`Self::accepts`].
    fn submit<B: GlBackend>(
        gl: &B,
        location: &B::UniformLocation,
        slot: ScalarVariableType,
        values: &[Self],
    ) -> Result<(), UniformError>;
}

/// Table of value types: type tag (plus extra accepted slot types), native call, arity and
/// the scalar the value is made of.
macro_rules! uniform_values {
    ($($ty:ty => $tag:ident $(| $alt:ident)*, $call:ident($arity:expr) as $scalar:ty;)*) => {$(
        impl private::Sealed for $ty {}

        impl UniformValue for $ty {
            const TYPE: ScalarVariableType = ScalarVariableType::$tag;

            fn accepts(slot: ScalarVariableType) -> bool {
                matches!(slot, ScalarVariableType::$tag $(| ScalarVariableType::$alt)*)
            }

            fn submit<B: GlBackend>(
                gl: &B,
                location: &B::UniformLocation,
                _slot: ScalarVariableType,
                values: &[Self],
            ) -> Result<(), UniformError> {
                gl.$call(location, $arity, bytemuck::cast_slice::<$ty, $scalar>(values));
                Ok(())
            }
        }
    )*};
}

uniform_values! {
    f32 => Float, uniform_f32(Components::One) as f32;
    Vec2 => Vec2, uniform_f32(Components::Two) as f32;
    Vec3 => Vec3, uniform_f32(Components::Three) as f32;
    Vec4 => Vec4, uniform_f32(Components::Four) as f32;
    Quat => Quaternion | Vec4, uniform_f32(Components::Four) as f32;
    IVec2 => IVec2, uniform_i32(Components::Two) as i32;
    IVec3 => IVec3, uniform_i32(Components::Three) as i32;
    IVec4 => IVec4, uniform_i32(Components::Four) as i32;
    UVec2 => UVec2, uniform_u32(Components::Two) as u32;
    UVec3 => UVec3, uniform_u32(Components::Three) as u32;
    UVec4 => UVec4, uniform_u32(Components::Four) as u32;
    Mat2 => Mat2, uniform_matrix_f32(MatrixSize::Two) as f32;
    Mat3 => Mat3, uniform_matrix_f32(MatrixSize::Three) as f32;
    Mat4 => Mat4, uniform_matrix_f32(MatrixSize::Four) as f32;
}

impl private::Sealed for i32 {}

/// Also sets samplers, which take the index of a texture unit.
impl UniformValue for i32 {
    const TYPE: ScalarVariableType = ScalarVariableType::Int;

    fn accepts(slot: ScalarVariableType) -> bool {
        slot == ScalarVariableType::Int || slot.is_sampler()
    }

    fn submit<B: GlBackend>(
        gl: &B,
        location: &B::UniformLocation,
        _slot: ScalarVariableType,
        values: &[Self],
    ) -> Result<(), UniformError> {
        gl.uniform_i32(location, Components::One, values);
        Ok(())
    }
}

impl private::Sealed for u32 {}

/// Also sets samplers. GL only takes signed texture unit indices for them.
impl UniformValue for u32 {
    const TYPE: ScalarVariableType = ScalarVariableType::UInt;

    fn accepts(slot: ScalarVariableType) -> bool {
        slot == ScalarVariableType::UInt || slot.is_sampler()
    }

    fn submit<B: GlBackend>(
        gl: &B,
        location: &B::UniformLocation,
        slot: ScalarVariableType,
        values: &[Self],
    ) -> Result<(), UniformError> {
        if slot.is_sampler() {
            let units = values
                .iter()
                .map(|&unit| {
                    i32::try_from(unit).map_err(|_| UniformError::TextureUnitOutOfRange(unit))
                })
                .collect::<Result<Vec<_>, _>>()?;
            gl.uniform_i32(location, Components::One, &units);
        } else {
            gl.uniform_u32(location, Components::One, values);
        }
        Ok(())
    }
}
