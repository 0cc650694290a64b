//! Host-side reference implementation of the simulation kernels.
//!
//! Mirrors `fluid.wgsl` pass for pass (same stencils, same clamp-to-edge
//! bilinear sampling, same decay) so the GPU behaviour can be checked with
//! ordinary unit tests.

use crate::constants::VORTICITY_EPSILON;
use crate::field::{Field, PingPong};
use crate::passes::{FramePlan, Pass, SimUniforms};
use glam::Vec2;
use std::ops::{Add, Mul};

/// Values that can be bilinearly interpolated.
pub trait Sample: Copy + Default + Add<Output = Self> + Mul<f32, Output = Self> {}
impl<T> Sample for T where T: Copy + Default + Add<Output = T> + Mul<f32, Output = T> {}

/// Square grid of cell-centred values.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Sample> Grid<T> {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            cells: vec![T::default(); size * size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn clear(&mut self) {
        self.cells.fill(T::default());
    }

    /// Cell value with indices clamped to the grid.
    #[inline]
    pub fn get(&self, i: isize, j: isize) -> T {
        let max = self.size as isize - 1;
        let i = i.clamp(0, max) as usize;
        let j = j.clamp(0, max) as usize;
        self.cells[j * self.size + i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = j * self.size + i;
        self.cells[idx] = value;
    }

    #[inline]
    pub fn cell_uv(&self, i: usize, j: usize) -> Vec2 {
        let n = self.size as f32;
        Vec2::new((i as f32 + 0.5) / n, (j as f32 + 0.5) / n)
    }

    /// Bilinear sample at `uv`, clamped to [0, 1] (no wraparound).
    pub fn sample(&self, uv: Vec2) -> T {
        let n = self.size as f32;
        let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
        let x = uv.x * n - 0.5;
        let y = uv.y * n - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (i0, j0) = (x0 as isize, y0 as isize);
        let top = self.get(i0, j0) * (1.0 - fx) + self.get(i0 + 1, j0) * fx;
        let bottom = self.get(i0, j0 + 1) * (1.0 - fx) + self.get(i0 + 1, j0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

#[inline]
fn gaussian(uv: Vec2, point: Vec2, radius: f32) -> f32 {
    let d = uv - point;
    (-d.dot(d) / radius).exp()
}

#[inline]
fn border(uv: Vec2, fade: f32) -> f32 {
    if fade <= 0.0 {
        return 1.0;
    }
    let d = uv.x.min(1.0 - uv.x).min(uv.y.min(1.0 - uv.y));
    let t = (d / fade).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// CPU field store and pass executor.
#[derive(Clone, Debug)]
pub struct CpuFluid {
    velocity: PingPong<Grid<Vec2>>,
    density: PingPong<Grid<f32>>,
    curl: Grid<f32>,
}

impl CpuFluid {
    pub fn new(size: usize) -> Self {
        Self {
            velocity: PingPong::from_fn(|_| Grid::new(size)),
            density: PingPong::from_fn(|_| Grid::new(size)),
            curl: Grid::new(size),
        }
    }

    pub fn size(&self) -> usize {
        self.curl.size()
    }

    /// Zero every field and rewind both swap indices, as a remount does.
    pub fn reset(&mut self) {
        self.velocity.reset_with(|g| g.clear());
        self.density.reset_with(|g| g.clear());
        self.curl.clear();
    }

    pub fn velocity(&self) -> &Grid<Vec2> {
        self.velocity.read()
    }

    pub fn density(&self) -> &Grid<f32> {
        self.density.read()
    }

    pub fn curl(&self) -> &Grid<f32> {
        &self.curl
    }

    pub fn current_index(&self, field: Field) -> usize {
        match field {
            Field::Velocity => self.velocity.current_index(),
            Field::Density => self.density.current_index(),
            Field::Curl => 0,
        }
    }

    pub fn run_frame(&mut self, plan: &FramePlan) {
        for (pass, u) in &plan.passes {
            self.run_pass(*pass, u);
        }
    }

    pub fn run_pass(&mut self, pass: Pass, u: &SimUniforms) {
        match pass {
            Pass::SplatVelocity => self.splat_velocity(u),
            Pass::SplatDensity => self.splat_density(u),
            Pass::Curl => self.compute_curl(u),
            Pass::Vorticity => self.confine_vorticity(u),
            Pass::AdvectVelocity => self.advect_velocity(u),
            Pass::AdvectDensity => self.advect_density(u),
        }
        match pass.output() {
            Field::Velocity => self.velocity.swap(),
            Field::Density => self.density.swap(),
            Field::Curl => {}
        }
    }

    fn splat_velocity(&mut self, u: &SimUniforms) {
        let point = Vec2::from(u.point);
        let amount = Vec2::new(u.splat[0], u.splat[1]);
        let (src, dst) = self.velocity.split();
        let n = src.size();
        for j in 0..n {
            for i in 0..n {
                let uv = src.cell_uv(i, j);
                let g = gaussian(uv, point, u.radius);
                dst.set(i, j, src.get(i as isize, j as isize) + amount * g);
            }
        }
    }

    fn splat_density(&mut self, u: &SimUniforms) {
        let point = Vec2::from(u.point);
        let (src, dst) = self.density.split();
        let n = src.size();
        for j in 0..n {
            for i in 0..n {
                let uv = src.cell_uv(i, j);
                let g = gaussian(uv, point, u.radius);
                dst.set(i, j, src.get(i as isize, j as isize) + u.splat[0] * g);
            }
        }
    }

    fn compute_curl(&mut self, _u: &SimUniforms) {
        let vel = self.velocity.read();
        let n = vel.size();
        for j in 0..n {
            for i in 0..n {
                let (i, j) = (i as isize, j as isize);
                let l = vel.get(i - 1, j).y;
                let r = vel.get(i + 1, j).y;
                let up = vel.get(i, j - 1).x;
                let down = vel.get(i, j + 1).x;
                self.curl
                    .set(i as usize, j as usize, 0.5 * ((r - l) - (down - up)));
            }
        }
    }

    fn confine_vorticity(&mut self, u: &SimUniforms) {
        let curl = &self.curl;
        let (src, dst) = self.velocity.split();
        let n = src.size();
        for j in 0..n {
            for i in 0..n {
                let (ii, jj) = (i as isize, j as isize);
                let l = curl.get(ii - 1, jj).abs();
                let r = curl.get(ii + 1, jj).abs();
                let up = curl.get(ii, jj - 1).abs();
                let down = curl.get(ii, jj + 1).abs();
                let c = curl.get(ii, jj);
                let grad = 0.5 * Vec2::new(r - l, down - up);
                let norm = grad / (grad.length() + VORTICITY_EPSILON);
                let force = u.curl_strength * c * Vec2::new(norm.y, -norm.x);
                dst.set(i, j, src.get(ii, jj) + force * u.dt);
            }
        }
    }

    fn advect_velocity(&mut self, u: &SimUniforms) {
        let texel = Vec2::from(u.texel);
        let decay = crate::passes::decay_factor(u.dissipation, u.dt);
        let (src, dst) = self.velocity.split();
        let n = src.size();
        for j in 0..n {
            for i in 0..n {
                let uv = src.cell_uv(i, j);
                let vel = src.get(i as isize, j as isize);
                let coord = uv - u.dt * vel * texel;
                dst.set(i, j, src.sample(coord) * (decay * border(uv, u.border_fade)));
            }
        }
    }

    fn advect_density(&mut self, u: &SimUniforms) {
        let texel = Vec2::from(u.texel);
        let decay = crate::passes::decay_factor(u.dissipation, u.dt);
        let vel = self.velocity.read();
        let (src, dst) = self.density.split();
        let n = src.size();
        for j in 0..n {
            for i in 0..n {
                let uv = src.cell_uv(i, j);
                let v = vel.get(i as isize, j as isize);
                let coord = uv - u.dt * v * texel;
                dst.set(i, j, src.sample(coord) * (decay * border(uv, u.border_fade)));
            }
        }
    }

    pub fn max_density(&self) -> f32 {
        self.density()
            .cells()
            .iter()
            .fold(0.0_f32, |m, d| m.max(d.abs()))
    }

    pub fn mean_density(&self) -> f32 {
        let cells = self.density().cells();
        cells.iter().sum::<f32>() / cells.len().max(1) as f32
    }

    pub fn max_speed(&self) -> f32 {
        self.velocity()
            .cells()
            .iter()
            .fold(0.0_f32, |m, v| m.max(v.length()))
    }

    pub fn is_finite(&self) -> bool {
        self.velocity().cells().iter().all(|v| v.is_finite())
            && self.density().cells().iter().all(|d| d.is_finite())
            && self.curl.cells().iter().all(|c| c.is_finite())
    }
}
