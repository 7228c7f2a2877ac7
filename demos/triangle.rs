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

//! Draws a triangle that a geometry shader scales back and forth.

use glow::HasContext;
use glow_program::{ProgramBuilder, VersionHeader};

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin_winit::{DisplayBuilder, GlWindow};

use raw_window_handle::HasRawWindowHandle;

use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use std::num::NonZeroU32;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

#[derive(Debug, Default, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct Vertex {
    pos: [f32; 2],
    color: [f32; 3],
}

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        pos: [-0.5, -0.5],
        color: [1.0, 0.2, 0.2],
    },
    Vertex {
        pos: [0.5, -0.5],
        color: [0.2, 1.0, 0.2],
    },
    Vertex {
        pos: [0.0, 0.5],
        color: [0.2, 0.2, 1.0],
    },
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let event_loop = EventLoop::new();
    let window_builder = WindowBuilder::new().with_title("glow-program triangle");

    // Pick the config with the most samples.
    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(window_builder))
        .build(&event_loop, ConfigTemplateBuilder::new(), |configs| {
            configs
                .max_by_key(|config| config.num_samples())
                .expect("no GL configs available")
        })?;
    let window = window.ok_or("could not create a window")?;

    // Geometry shaders need at least OpenGL 3.2.
    let gl_display = gl_config.display();
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .build(Some(window.raw_window_handle()));
    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes)? };

    let attrs = window.build_surface_attributes(<_>::default());
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs)? };
    let gl_context = not_current.make_current(&gl_surface)?;

    let gl = Rc::new(unsafe {
        glow::Context::from_loader_function_cstr(|s| gl_display.get_proc_address(s) as *const _)
    });

    let shaders = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/shaders");

    // SAFETY: the context was made current above and stays current.
    let program = unsafe {
        ProgramBuilder::new(shaders.join("triangle.vs"), shaders.join("triangle.fs"))
            .geometry(shaders.join("triangle.gs"))
            .version_header(VersionHeader::Auto)
            .label("triangle")
            .build(gl.clone())?
    };

    let (vao, vbo) = unsafe {
        let vao = gl.create_vertex_array()?;
        let vbo = gl.create_buffer()?;

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&TRIANGLE),
            glow::STATIC_DRAW,
        );

        let stride = std::mem::size_of::<Vertex>() as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(
            0,
            2,
            glow::FLOAT,
            false,
            stride,
            bytemuck::offset_of!(Vertex, pos) as i32,
        );
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(
            1,
            3,
            glow::FLOAT,
            false,
            stride,
            bytemuck::offset_of!(Vertex, color) as i32,
        );

        gl.bind_vertex_array(None);
        (vao, vbo)
    };

    let start = Instant::now();

    // `run` never returns, so the program is dropped by hand when the loop ends.
    let mut program = Some(program);

    event_loop.run(move |event, _, control_flow| {
        control_flow.set_poll();

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) if size.width != 0 && size.height != 0 => {
                    gl_surface.resize(
                        &gl_context,
                        NonZeroU32::new(size.width).unwrap(),
                        NonZeroU32::new(size.height).unwrap(),
                    );
                    unsafe {
                        gl.viewport(0, 0, size.width as i32, size.height as i32);
                    }
                }
                WindowEvent::CloseRequested => control_flow.set_exit(),
                _ => (),
            },
            Event::RedrawEventsCleared => {
                unsafe {
                    gl.clear_color(0.1, 0.1, 0.12, 1.0);
                    gl.clear(glow::COLOR_BUFFER_BIT);
                }

                if let Some(program) = &program {
                    let bound = program.use_program();
                    bound.set_float("uTime", start.elapsed().as_secs_f32());
                    bound.set_float("uMagnitude", 0.25);
                    bound.set_float("uAlpha", 1.0);

                    unsafe {
                        gl.bind_vertex_array(Some(vao));
                        gl.draw_arrays(glow::TRIANGLES, 0, 3);
                        gl.bind_vertex_array(None);
                    }
                }

                window.request_redraw();
                if let Err(err) = gl_surface.swap_buffers(&gl_context) {
                    tracing::error!("failed to swap buffers: {}", err);
                    control_flow.set_exit();
                }
            }
            Event::LoopDestroyed => {
                drop(program.take());
                unsafe {
                    gl.delete_vertex_array(vao);
                    gl.delete_buffer(vbo);
                }
            }
            _ => (),
        }
    })
}
