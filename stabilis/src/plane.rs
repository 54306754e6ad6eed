use std::ops::{Index, IndexMut};

/// Single channel of working-precision samples, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    values: Vec<f64>,
    width: usize,
    height: usize,
}

impl Plane {
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "values length must equal width * height"
        );
        Self {
            values,
            width,
            height,
        }
    }

    pub fn zeroed(width: usize, height: usize) -> Self {
        Self::new(width, height, vec![0.0; width * height])
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
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    #[inline]
    fn get_or_zero(&self, x: isize, y: isize) -> f64 {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            0.0
        } else {
            self.values[y as usize * self.width + x as usize]
        }
    }

    /// Bilinear interpolation at index-space coordinates. Each neighbour
    /// outside the plane contributes 0, so values fade out across the border.
    pub fn bilinear(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let x0 = x0 as isize;
        let y0 = y0 as isize;

        let p00 = self.get_or_zero(x0, y0);
        let p10 = self.get_or_zero(x0 + 1, y0);
        let p01 = self.get_or_zero(x0, y0 + 1);
        let p11 = self.get_or_zero(x0 + 1, y0 + 1);

        let top = p00 + fx * (p10 - p00);
        let bottom = p01 + fx * (p11 - p01);
        top + fy * (bottom - top)
    }

    /// Bilinear interpolation at pixel-centre coordinates (pixel `i` covers
    /// `[i, i + 1)`). Returns 0 as soon as any of the 2x2 neighbours lies on or
    /// beyond the outermost row or column.
    pub fn bilinear_interior(&self, x: f64, y: f64) -> f64 {
        let x = x - 0.5;
        let y = y - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let i = x0 as isize;
        let j = y0 as isize;

        if i <= 0 || j <= 0 || i + 1 >= self.width as isize - 1 || j + 1 >= self.height as isize - 1
        {
            return 0.0;
        }

        let fx = x - x0;
        let fy = y - y0;
        let (i, j) = (i as usize, j as usize);
        let w = self.width;

        let p00 = self.values[j * w + i];
        let p10 = self.values[j * w + i + 1];
        let p01 = self.values[(j + 1) * w + i];
        let p11 = self.values[(j + 1) * w + i + 1];

        let top = p00 + fx * (p10 - p00);
        let bottom = p01 + fx * (p11 - p01);
        top + fy * (bottom - top)
    }
}

impl Index<(usize, usize)> for Plane {
    type Output = f64;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.values[y * self.width + x]
    }
}

impl IndexMut<(usize, usize)> for Plane {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.values[y * self.width + x]
    }
}
