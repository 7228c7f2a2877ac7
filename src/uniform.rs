// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glow-program`.
//
// `glow-program` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glow-program` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glow-program`. If not, see <https://www.gnu.org/licenses/>.

//! Values that can be pushed to a uniform.

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// A value for a uniform variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A `bool`, pushed as an integer.
    Bool(bool),

    /// An `int`.
    Int(i32),

    /// A `float`.
    Float(f32),

    /// A `vec2`.
    Vec2(Vec2),

    /// A `vec3`.
    Vec3(Vec3),

    /// A `vec4`.
    Vec4(Vec4),

    /// A `mat2`, column-major.
    Mat2(Mat2),

    /// A `mat3`, column-major.
    Mat3(Mat3),

    /// A `mat4`, column-major.
    Mat4(Mat4),
}

impl UniformValue {
    /// The name of the matching GLSL type.
    pub fn glsl_type(&self) -> &'static str {
        match self {
            UniformValue::Bool(_) => "bool",
            UniformValue::Int(_) => "int",
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

impl From<[f32; 2]> for UniformValue {
    fn from(value: [f32; 2]) -> Self {
        UniformValue::Vec2(value.into())
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(value: [f32; 3]) -> Self {
        UniformValue::Vec3(value.into())
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(value: [f32; 4]) -> Self {
        UniformValue::Vec4(value.into())
    }
}
