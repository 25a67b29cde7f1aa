//! Dense row-major 2D grid shared by every stage of the pipeline.

use std::ops::{Index, IndexMut};

use rayon::prelude::*;

use crate::core::{Cell, Error, Result};

/// Dense `width × height` grid stored row-major (`y * width + x`).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Create a grid filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, T::default())
    }
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self { width, height, data: vec![value; width * height] })
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer. The length must be `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        check_dimensions(width, height)?;
        if data.len() != width * height {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Whether a signed coordinate lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Clamp a signed coordinate into the grid.
    #[inline]
    pub fn clamp_cell(&self, x: i64, y: i64) -> Cell {
        (
            x.clamp(0, self.width as i64 - 1) as usize,
            y.clamp(0, self.height as i64 - 1) as usize,
        )
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[self.idx(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            let i = self.idx(x, y);
            Some(&mut self.data[i])
        } else {
            None
        }
    }

    /// Read with the coordinate clamped to the nearest edge cell.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> &T {
        let (cx, cy) = self.clamp_cell(x, y);
        &self.data[self.idx(cx, cy)]
    }

    /// Checked write; out-of-range cells report [`Error::IndexOutOfRange`].
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<()> {
        let (width, height) = (self.width, self.height);
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfRange { x: x as i64, y: y as i64, width, height }),
        }
    }

    /// Whether `other` has the same dimensions.
    pub fn same_size<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.width)
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [T]> {
        self.data.chunks_exact_mut(self.width)
    }

    /// Iterate every cell with its coordinate, row-major.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Cell, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(i, v)| ((i % width, i / width), v))
    }

    /// Build a new grid of the same size by mapping every cell.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Send> Grid<T> {
    /// Parallel mutable rows as `(y, row)` pairs.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = (usize, &mut [T])> {
        self.data.par_chunks_mut(self.width).enumerate()
    }
}

impl Grid<f32> {
    /// Smallest and largest cell values.
    pub fn min_max(&self) -> (f32, f32) {
        self.data.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): Cell) -> &T {
        debug_assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of range");
        &self.data[self.idx(x, y)]
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): Cell) -> &mut T {
        debug_assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of range");
        let i = self.idx(x, y);
        &mut self.data[i]
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}
