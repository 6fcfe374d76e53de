use std::io::{self, Write};

use glam::{Mat3, Mat4};
use thicket_core::{Mesh, SceneSink};

/// Scene sink writing Wavefront OBJ, one object per submitted mesh.
///
/// `submit` cannot fail, so the first write error is kept and returned
/// by [`ObjWriter::finish`].
pub struct ObjWriter<W: Write> {
    out: W,
    /// Vertices and texture coordinates written so far; OBJ indices are
    /// global and 1-based
    written: usize,
    written_uvs: usize,
    objects: usize,
    error: Option<io::Error>,
}

impl<W: Write> ObjWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            written: 0,
            written_uvs: 0,
            objects: 0,
            error: None,
        }
    }

    pub fn objects(&self) -> usize {
        self.objects
    }

    fn write_mesh(&mut self, name: &str, world: Mat4, mesh: &Mesh, color: [f32; 3]) -> io::Result<()> {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        let has_uvs = mesh.uvs.is_some();

        writeln!(self.out, "o {}_{}", name, self.objects)?;
        writeln!(self.out, "# color {} {} {}", color[0], color[1], color[2])?;
        for v in &mesh.vertices {
            let p = world.transform_point3(*v);
            writeln!(self.out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for n in &mesh.normals {
            let n = (normal_matrix * *n).normalize_or_zero();
            writeln!(self.out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        if let Some(uvs) = &mesh.uvs {
            for uv in uvs {
                writeln!(self.out, "vt {} {}", uv.x, uv.y)?;
            }
        }

        let base = self.written + 1;
        let uv_base = self.written_uvs + 1;
        for tri in &mesh.triangles {
            let [a, b, c] = tri.map(|i| base + i as usize);
            if has_uvs {
                let [ta, tb, tc] = tri.map(|i| uv_base + i as usize);
                writeln!(self.out, "f {a}/{ta}/{a} {b}/{tb}/{b} {c}/{tc}/{c}")?;
            } else {
                writeln!(self.out, "f {a}//{a} {b}//{b} {c}//{c}")?;
            }
        }
        Ok(())
    }

    /// Flush and hand back the writer, or the first error hit
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> SceneSink for ObjWriter<W> {
    fn submit(&mut self, name: &str, world: Mat4, mesh: &Mesh, color: [f32; 3]) {
        if self.error.is_some() {
            return;
        }
        // Meshes without normals or uvs for every vertex would desync the
        // shared OBJ index space
        if mesh.normals.len() != mesh.vertices.len() {
            log::warn!("Skipping {name}: normals out of date");
            return;
        }
        if mesh.uvs.as_ref().is_some_and(|uvs| uvs.len() != mesh.vertices.len()) {
            log::warn!("Skipping {name}: uv count does not match vertex count");
            return;
        }
        if let Err(err) = self.write_mesh(name, world, mesh, color) {
            self.error = Some(err);
            return;
        }
        self.written += mesh.vertices.len();
        self.written_uvs += mesh.uvs.as_ref().map_or(0, Vec::len);
        self.objects += 1;
    }
}
