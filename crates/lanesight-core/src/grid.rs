//! Dense buffers produced by scene collaborators: time-to-collision
//! grids and rendered RGB frames.

use crate::error::SceneError;

/// Collision-likelihood estimates indexed by
/// `(speed_bucket, lane, time_bucket)`, each in `[0, 1]`.
///
/// Produced by the scene's TTC routine; encoders treat it as read-only.
///
/// # Examples
///
/// ```
/// use lanesight_core::TtcGrid;
///
/// let mut grid = TtcGrid::zeros(3, 4, 10);
/// grid.set(1, 2, 5, 0.5);
/// assert_eq!(grid.get(1, 2, 5), 0.5);
/// assert_eq!(grid.dims(), (3, 4, 10));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TtcGrid {
    speeds: usize,
    lanes: usize,
    times: usize,
    data: Vec<f32>,
}

/// Relative slack under which `horizon / time_quantization` snaps to the
/// nearest integer instead of flooring.
const BUCKET_SNAP: f64 = 1e-9;

impl TtcGrid {
    /// Number of time buckets covering `horizon` at `time_quantization`:
    /// `floor(horizon / time_quantization)`, except that a ratio within
    /// floating-point noise of an integer counts as that integer
    /// (`1.2 / 0.2` is 6, not 5).
    ///
    /// Both the TTC routine and the encoder consuming its grid must size
    /// the time axis with this.
    ///
    /// ```
    /// use lanesight_core::TtcGrid;
    ///
    /// assert_eq!(TtcGrid::time_buckets(1.2, 1.0 / 5.0), 6);
    /// assert_eq!(TtcGrid::time_buckets(1.3, 1.0 / 5.0), 6);
    /// assert_eq!(TtcGrid::time_buckets(0.1, 1.0 / 5.0), 0);
    /// ```
    pub fn time_buckets(horizon: f64, time_quantization: f64) -> usize {
        let ratio = horizon / time_quantization;
        if !ratio.is_finite() || ratio <= 0.0 {
            return 0;
        }
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= BUCKET_SNAP * nearest.max(1.0) {
            nearest as usize
        } else {
            ratio.floor() as usize
        }
    }

    /// An all-clear grid (every cell 0.0).
    pub fn zeros(speeds: usize, lanes: usize, times: usize) -> Self {
        Self {
            speeds,
            lanes,
            times,
            data: vec![0.0; speeds * lanes * times],
        }
    }

    /// Wrap a row-major `(speeds, lanes, times)` buffer.
    ///
    /// # Errors
    ///
    /// [`SceneError::Malformed`] if the buffer length does not match the
    /// dimensions or any axis is empty.
    pub fn from_vec(
        speeds: usize,
        lanes: usize,
        times: usize,
        data: Vec<f32>,
    ) -> Result<Self, SceneError> {
        if speeds == 0 || lanes == 0 || times == 0 {
            return Err(SceneError::Malformed {
                reason: format!("TTC grid has an empty axis: ({speeds}, {lanes}, {times})"),
            });
        }
        if data.len() != speeds * lanes * times {
            return Err(SceneError::Malformed {
                reason: format!(
                    "TTC grid has {} cells, ({speeds}, {lanes}, {times}) requires {}",
                    data.len(),
                    speeds * lanes * times
                ),
            });
        }
        Ok(Self {
            speeds,
            lanes,
            times,
            data,
        })
    }

    /// `(speeds, lanes, times)`.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.speeds, self.lanes, self.times)
    }

    fn offset(&self, speed: usize, lane: usize, time: usize) -> usize {
        (speed * self.lanes + lane) * self.times + time
    }

    /// Cell value.
    ///
    /// # Panics
    ///
    /// If any index is out of range.
    pub fn get(&self, speed: usize, lane: usize, time: usize) -> f32 {
        assert!(speed < self.speeds && lane < self.lanes && time < self.times);
        self.data[self.offset(speed, lane, time)]
    }

    /// Overwrite a cell.
    ///
    /// # Panics
    ///
    /// If any index is out of range.
    pub fn set(&mut self, speed: usize, lane: usize, time: usize, value: f32) {
        assert!(speed < self.speeds && lane < self.lanes && time < self.times);
        let o = self.offset(speed, lane, time);
        self.data[o] = value;
    }
}

/// A rendered RGB frame with channel intensities in `[0, 1]`,
/// stored row-major as `(height, width, 3)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbFrame {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl RgbFrame {
    /// Wrap a `(height, width, 3)` buffer.
    ///
    /// # Errors
    ///
    /// [`SceneError::Malformed`] if the buffer length does not match.
    pub fn from_vec(height: usize, width: usize, data: Vec<f32>) -> Result<Self, SceneError> {
        if data.len() != height * width * 3 {
            return Err(SceneError::Malformed {
                reason: format!(
                    "frame has {} values, {height}x{width} RGB requires {}",
                    data.len(),
                    height * width * 3
                ),
            });
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// A frame filled with a single colour.
    pub fn solid(height: usize, width: usize, rgb: [f32; 3]) -> Self {
        let data = rgb.iter().copied().cycle().take(height * width * 3).collect();
        Self {
            height,
            width,
            data,
        }
    }

    /// Frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Weighted channel sum per pixel, row-major `(height, width)`.
    pub fn grayscale(&self, weights: [f32; 3]) -> Vec<f32> {
        self.data
            .chunks_exact(3)
            .map(|px| px[0] * weights[0] + px[1] * weights[1] + px[2] * weights[2])
            .collect()
    }
}
