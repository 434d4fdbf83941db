//! Frame and pixel containers
//!
//! [`FrameCube`] stores a stack of images frame-major, the way frames come off
//! the camera. [`PixelSeries`] stores one sequence per pixel, pixel-major, so
//! each pixel's samples are contiguous and can be handed to an independent
//! worker. Pixels are addressed by a flat index `y * cols + x`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ftir_pipeline::common::error::{PipelineError, Result};

/// Rectangular window `[y0, y1) x [x0, x1)` in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub y0: usize,
    pub y1: usize,
    pub x0: usize,
    pub x1: usize,
}

impl Roi {
    pub fn new(y0: usize, y1: usize, x0: usize, x1: usize) -> Self {
        Self { y0, y1, x0, x1 }
    }

    pub fn rows(&self) -> usize {
        self.y1.saturating_sub(self.y0)
    }

    pub fn cols(&self) -> usize {
        self.x1.saturating_sub(self.x0)
    }
}

/// A stack of equally sized images, `[frame][row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCube {
    frames: usize,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FrameCube {
    pub fn new(frames: usize, rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != frames * rows * cols {
            return Err(PipelineError::InvalidParameter(format!(
                "cube of {}x{}x{} needs {} samples, got {}",
                frames,
                rows,
                cols,
                frames * rows * cols,
                data.len()
            )));
        }
        Ok(Self { frames, rows, cols, data })
    }

    pub fn empty(rows: usize, cols: usize) -> Self {
        Self { frames: 0, rows, cols, data: Vec::new() }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn pixels(&self) -> usize {
        self.rows * self.cols
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn frame(&self, index: usize) -> &[f64] {
        let n = self.pixels();
        &self.data[index * n..(index + 1) * n]
    }

    pub fn frame_mut(&mut self, index: usize) -> &mut [f64] {
        let n = self.pixels();
        &mut self.data[index * n..(index + 1) * n]
    }

    pub fn get(&self, frame: usize, y: usize, x: usize) -> f64 {
        self.data[frame * self.pixels() + y * self.cols + x]
    }

    /// Appends a frame given as a row-major image.
    pub fn push_frame<T: Copy + Into<f64>>(&mut self, image: &[T]) -> Result<()> {
        if image.len() != self.pixels() {
            return Err(PipelineError::InvalidParameter(format!(
                "frame has {} samples, cube expects {}x{}",
                image.len(),
                self.rows,
                self.cols
            )));
        }
        self.data.extend(image.iter().map(|&v| v.into()));
        self.frames += 1;
        Ok(())
    }

    /// Copies out frames `start..end`.
    pub fn slice_frames(&self, start: usize, end: usize) -> Result<FrameCube> {
        if start > end || end > self.frames {
            return Err(PipelineError::InvalidParameter(format!(
                "frame range {}..{} outside cube of {} frames",
                start, end, self.frames
            )));
        }
        let n = self.pixels();
        Ok(FrameCube {
            frames: end - start,
            rows: self.rows,
            cols: self.cols,
            data: self.data[start * n..end * n].to_vec(),
        })
    }

    /// Crops every frame to `roi`.
    pub fn subset(&self, roi: Roi) -> Result<FrameCube> {
        if roi.y0 >= roi.y1 || roi.x0 >= roi.x1 || roi.y1 > self.rows || roi.x1 > self.cols {
            return Err(PipelineError::InvalidParameter(format!(
                "region {:?} outside {}x{} frames",
                roi, self.rows, self.cols
            )));
        }

        let mut data = Vec::with_capacity(self.frames * roi.rows() * roi.cols());
        for f in 0..self.frames {
            let frame = self.frame(f);
            for y in roi.y0..roi.y1 {
                let row = &frame[y * self.cols..(y + 1) * self.cols];
                data.extend_from_slice(&row[roi.x0..roi.x1]);
            }
        }
        FrameCube::new(self.frames, roi.rows(), roi.cols(), data)
    }

    /// Averages non-overlapping `y_bin x x_bin` blocks. Partial blocks at the
    /// bottom and right edges are dropped.
    pub fn bin(&self, y_bin: usize, x_bin: usize) -> Result<FrameCube> {
        if y_bin == 0 || x_bin == 0 || y_bin > self.rows || x_bin > self.cols {
            return Err(PipelineError::InvalidParameter(format!(
                "bin {}x{} does not fit {}x{} frames",
                y_bin, x_bin, self.rows, self.cols
            )));
        }

        let out_rows = self.rows / y_bin;
        let out_cols = self.cols / x_bin;
        let norm = (y_bin * x_bin) as f64;
        let mut data = vec![0.0; self.frames * out_rows * out_cols];

        data.par_chunks_mut(out_rows * out_cols)
            .enumerate()
            .for_each(|(f, out)| {
                let frame = self.frame(f);
                for by in 0..out_rows {
                    for bx in 0..out_cols {
                        let mut sum = 0.0;
                        for y in by * y_bin..(by + 1) * y_bin {
                            let row = &frame[y * self.cols..(y + 1) * self.cols];
                            sum += row[bx * x_bin..(bx + 1) * x_bin].iter().sum::<f64>();
                        }
                        out[by * out_cols + bx] = sum / norm;
                    }
                }
            });

        FrameCube::new(self.frames, out_rows, out_cols, data)
    }

    /// Collapses every frame to its mean, a 1x1 cube.
    pub fn bin_full_frame(&self) -> Result<FrameCube> {
        self.bin(self.rows, self.cols)
    }

    /// Re-lays the cube pixel-major: one contiguous series per pixel.
    pub fn to_pixel_series(&self) -> Result<PixelSeries> {
        let n = self.pixels();
        let frames = self.frames;
        let mut data = vec![0.0; n * frames];
        if frames > 0 {
            data.par_chunks_mut(frames)
                .enumerate()
                .for_each(|(p, series)| {
                    for (f, v) in series.iter_mut().enumerate() {
                        *v = self.data[f * n + p];
                    }
                });
        }
        PixelSeries::new(frames, self.rows, self.cols, data)
    }
}

/// One sequence of `len` samples per pixel, stored pixel-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSeries<T = f64> {
    len: usize,
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> PixelSeries<T> {
    pub fn new(len: usize, rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if len == 0 {
            return Err(PipelineError::InvalidParameter(
                "pixel series must hold at least one sample".to_string(),
            ));
        }
        if data.len() != len * rows * cols {
            return Err(PipelineError::InvalidParameter(format!(
                "{} pixels of {} samples need {} values, got {}",
                rows * cols,
                len,
                len * rows * cols,
                data.len()
            )));
        }
        Ok(Self { len, rows, cols, data })
    }

    /// Samples per pixel.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn pixels(&self) -> usize {
        self.rows * self.cols
    }

    pub fn pixel(&self, index: usize) -> &[T] {
        &self.data[index * self.len..(index + 1) * self.len]
    }

    pub fn at(&self, y: usize, x: usize) -> &[T] {
        self.pixel(y * self.cols + x)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.len)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}
